//! Shared secret authentication middleware
//!
//! Validates the `x-bot-secret` header against the configured secret using
//! constant-time comparison. Probe endpoints are exempt.

use std::{
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::{ConnectInfo, Request},
    response::{IntoResponse, Response},
};
use infrastructure::SecurityConfig;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::ApiError;

/// Header carrying the shared secret
pub const BOT_SECRET_HEADER: &str = "x-bot-secret";

/// Layer that applies shared secret authentication
#[derive(Clone)]
pub struct SharedSecretAuthLayer {
    /// Expected secret, already trimmed
    secret: Arc<SecretString>,
    /// Whether the gate is active
    enabled: bool,
    /// Paths that should be excluded from authentication
    excluded_paths: Arc<Vec<String>>,
}

impl std::fmt::Debug for SharedSecretAuthLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuthLayer")
            .field("enabled", &self.enabled)
            .field("secret_len", &self.secret.expose_secret().len())
            .field("excluded_paths", &self.excluded_paths)
            .finish()
    }
}

fn default_excluded_paths() -> Vec<String> {
    vec!["/health".to_string(), "/ready".to_string()]
}

impl SharedSecretAuthLayer {
    /// Gate requests with the given secret
    ///
    /// An empty secret rejects every gated request.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::new(SecretString::from(secret.trim().to_owned())),
            enabled: true,
            excluded_paths: Arc::new(default_excluded_paths()),
        }
    }

    /// Let every request through
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new("")
        }
    }

    /// Build from the security configuration
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        if config.require_auth {
            Self::new(config.secret())
        } else {
            Self::disabled()
        }
    }
}

impl<S> Layer<S> for SharedSecretAuthLayer {
    type Service = SharedSecretAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SharedSecretAuth {
            inner,
            config: self.clone(),
        }
    }
}

/// Middleware service for shared secret authentication
#[derive(Clone, Debug)]
pub struct SharedSecretAuth<S> {
    inner: S,
    config: SharedSecretAuthLayer,
}

/// Outcome of checking a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Allow,
    Reject { provided_len: usize },
}

fn verify(expected: &str, provided: Option<&str>) -> Verdict {
    let provided = provided.map_or("", str::trim);
    let matches = !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(provided.as_bytes()));
    if matches {
        Verdict::Allow
    } else {
        Verdict::Reject {
            provided_len: provided.len(),
        }
    }
}

impl<S> Service<Request> for SharedSecretAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let config = self.config.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if !config.enabled {
                return inner.call(req).await;
            }

            let path = req.uri().path();
            if config.excluded_paths.iter().any(|p| p == path) {
                return inner.call(req).await;
            }

            let expected = config.secret.expose_secret();
            let provided = req
                .headers()
                .get(BOT_SECRET_HEADER)
                .and_then(|v| v.to_str().ok());

            match verify(expected, provided) {
                Verdict::Allow => inner.call(req).await,
                Verdict::Reject { provided_len } => {
                    let ip = req
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map_or_else(|| "unknown".to_string(), |ci| ci.0.ip().to_string());
                    warn!(
                        path = %path,
                        ip = %ip,
                        provided_len,
                        expected_len = expected.len(),
                        "Unauthorized request"
                    );
                    Ok(ApiError::Unauthorized.into_response())
                },
            }
        })
    }
}
