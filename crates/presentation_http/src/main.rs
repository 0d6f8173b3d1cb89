//! WhatsApp relay HTTP server
//!
//! Main entry point for the relay API.

use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use application::{RelayService, SessionConfig, SessionManager};
use infrastructure::{AppConfig, PdfStagingAdapter, WhatsAppGatewayAdapter, init_telemetry};
use presentation_http::{
    create_app, spawn_session_event_logger, spawn_session_monitor_task, state::AppState,
};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_telemetry(&config.telemetry).context("Failed to initialize logging")?;

    info!("WhatsApp relay v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        phone_mode = ?config.relay.phone_mode,
        require_auth = config.security.require_auth,
        gateway = %config.gateway.base_url,
        instance = %config.gateway.instance,
        "Configuration loaded"
    );
    info!(
        bot_secret_set = config.security.has_secret(),
        bot_secret_len = config.security.secret_len(),
        "Shared secret"
    );
    if config.security.require_auth && !config.security.has_secret() {
        warn!("BOT_SECRET is not set; every /send request will be rejected");
    }

    // Gateway client and session
    let gateway = WhatsAppGatewayAdapter::new(config.gateway.client_config())
        .context("Failed to initialize WhatsApp gateway client")?;
    let gateway: Arc<dyn application::MessagingClientPort> = Arc::new(gateway);

    let session = SessionManager::new(
        Arc::clone(&gateway),
        SessionConfig {
            auto_reconnect: config.relay.auto_reconnect,
            reconnect: config.gateway.reconnect_policy(),
        },
    );

    // PDF staging
    let documents = PdfStagingAdapter::new(
        config.relay.temp_dir.clone(),
        config.relay.file_prefix.clone(),
        config.relay.pdf_fetch_timeout_secs.map(Duration::from_secs),
    )
    .context("Failed to initialize PDF staging")?;
    info!(temp_dir = %documents.temp_dir().display(), "PDF staging directory");

    let relay_service = RelayService::new(session.clone(), gateway, Arc::new(documents))
        .with_phone_mode(config.relay.phone_mode);

    // Background tasks
    let event_logger = spawn_session_event_logger(&session);
    let monitor = spawn_session_monitor_task(
        session.clone(),
        Duration::from_secs(config.gateway.poll_interval_secs),
    );
    let starter = {
        let session = session.clone();
        tokio::spawn(async move {
            if let Err(e) = session.start().await {
                warn!(error = %e, "WhatsApp session did not start");
            }
        })
    };

    let config = Arc::new(config);
    let state = AppState::new(Arc::new(relay_service), Arc::clone(&config));

    let app = create_app(state);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    })
    .into_future();
    tokio::pin!(server);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    tokio::select! {
        result = &mut server => result?,
        Ok(()) = signalled_rx => {
            info!("Waiting up to {:?} for connections to close", shutdown_timeout);
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!("Shutdown timeout elapsed, closing remaining connections"),
            }
        }
    }

    starter.abort();
    monitor.abort();
    event_logger.abort();

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
