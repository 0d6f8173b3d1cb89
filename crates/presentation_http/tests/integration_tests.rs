//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use application::{
    ApplicationError, MessagingClientPort, RelayService, SessionConfig, SessionManager,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode, header},
};
use axum_test::TestServer;
use domain::{AccountId, ConnectionStatus, MediaAttachment, PhoneNumber, SessionEvent};
use infrastructure::{AppConfig, PdfStagingAdapter};
use presentation_http::{create_app, state::AppState};
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const SECRET: &str = "s3cret";
const KNOWN_PHONE: &str = "905397324662";

/// What the fake gateway was asked to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivery {
    Text { to: String, text: String },
    Media { to: String, caption: String, bytes: usize },
}

/// In-memory gateway that knows a single account
#[derive(Default)]
struct FakeGateway {
    deliveries: Mutex<Vec<Delivery>>,
    fail_sends: bool,
}

impl FakeGateway {
    fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().expect("lock").clone()
    }

    fn record(&self, delivery: Delivery) -> Result<String, ApplicationError> {
        if self.fail_sends {
            return Err(ApplicationError::ExternalService(
                "gateway rejected the message".to_string(),
            ));
        }
        self.deliveries.lock().expect("lock").push(delivery);
        Ok("MSG".to_string())
    }
}

#[async_trait]
impl MessagingClientPort for FakeGateway {
    async fn connection_status(&self) -> Result<ConnectionStatus, ApplicationError> {
        Ok(ConnectionStatus::Open)
    }

    async fn initialize(&self) -> Result<Option<String>, ApplicationError> {
        Ok(None)
    }

    async fn resolve_account(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<AccountId>, ApplicationError> {
        if phone.as_str() == KNOWN_PHONE {
            Ok(Some(AccountId::new(format!("{KNOWN_PHONE}@s.whatsapp.net"))?))
        } else {
            Ok(None)
        }
    }

    async fn send_text(&self, to: &AccountId, text: &str) -> Result<String, ApplicationError> {
        self.record(Delivery::Text {
            to: to.to_string(),
            text: text.to_string(),
        })
    }

    async fn send_media(
        &self,
        to: &AccountId,
        media: &MediaAttachment,
        caption: &str,
    ) -> Result<String, ApplicationError> {
        self.record(Delivery::Media {
            to: to.to_string(),
            caption: caption.to_string(),
            bytes: media.len(),
        })
    }
}

struct Harness {
    server: TestServer,
    gateway: Arc<FakeGateway>,
    session: SessionManager,
}

fn config_with_secret(secret: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.security.bot_secret = secret.map(|s| SecretString::from(s.to_owned()));
    config
}

fn app_with(
    gateway: &Arc<FakeGateway>,
    temp_dir: &Path,
    config: AppConfig,
) -> (Router, SessionManager) {
    let session = SessionManager::new(
        Arc::clone(gateway) as Arc<dyn MessagingClientPort>,
        SessionConfig {
            auto_reconnect: false,
            ..SessionConfig::default()
        },
    );
    let documents =
        PdfStagingAdapter::new(temp_dir, "receipt", None).expect("staging adapter");
    let relay = RelayService::new(
        session.clone(),
        Arc::clone(gateway) as Arc<dyn MessagingClientPort>,
        Arc::new(documents),
    );

    let state = AppState::new(Arc::new(relay), Arc::new(config));
    (create_app(state), session)
}

fn harness_with(gateway: FakeGateway, temp_dir: &Path, secret: Option<&str>) -> Harness {
    let gateway = Arc::new(gateway);
    let (app, session) = app_with(&gateway, temp_dir, config_with_secret(secret));
    let server = TestServer::new(app).expect("Failed to create test server");

    Harness {
        server,
        gateway,
        session,
    }
}

fn ready_harness(temp_dir: &Path) -> Harness {
    let harness = harness_with(FakeGateway::default(), temp_dir, Some(SECRET));
    harness.session.apply(SessionEvent::Ready);
    harness
}

fn secret_header(value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-bot-secret"),
        HeaderValue::from_static(value),
    )
}

fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_reports_not_ready_before_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::default(), dir.path(), Some(SECRET));

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ok": true, "isReady": false }));
}

#[tokio::test]
async fn health_reports_ready_without_secret() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ok": true, "isReady": true }));
}

#[tokio::test]
async fn readiness_reflects_session_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::default(), dir.path(), Some(SECRET));

    let response = harness.server.get("/ready").await;
    response.assert_status_service_unavailable();
    response.assert_json(&json!({ "ready": false, "state": "initializing" }));

    harness.session.apply(SessionEvent::Ready);
    let response = harness.server.get("/ready").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "ready": true, "state": "ready" }));

    harness
        .session
        .apply(SessionEvent::Disconnected("NAVIGATION".into()));
    let response = harness.server.get("/ready").await;
    response.assert_status_service_unavailable();
    response.assert_json(&json!({ "ready": false, "state": "disconnected" }));
}

// ============ Auth Tests ============

#[tokio::test]
async fn send_without_secret_is_unauthorized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());

    let response = harness
        .server
        .post("/send")
        .json(&json!({ "phone": KNOWN_PHONE, "message": "Hi" }))
        .await;

    response.assert_status_unauthorized();
    response.assert_json(&json!({ "ok": false, "error": "unauthorized" }));
    assert!(harness.gateway.deliveries().is_empty());
}

#[tokio::test]
async fn send_with_wrong_secret_is_unauthorized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header("wrong");

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": KNOWN_PHONE, "message": "Hi" }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn unconfigured_secret_rejects_every_send() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::default(), dir.path(), None);
    harness.session.apply(SessionEvent::Ready);
    let (name, value) = secret_header("");

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": KNOWN_PHONE, "message": "Hi" }))
        .await;

    response.assert_status_unauthorized();
}

// ============ Send Endpoint Tests ============

#[tokio::test]
async fn send_text_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": "0539 732 46 62", "message": "Your order shipped" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ok": true, "sent": "text" }));
    assert_eq!(
        harness.gateway.deliveries(),
        vec![Delivery::Text {
            to: format!("{KNOWN_PHONE}@s.whatsapp.net"),
            text: "Your order shipped".to_string(),
        }]
    );
}

#[tokio::test]
async fn send_accepts_numeric_phone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": 5_397_324_662_u64, "message": "Hi" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ok": true, "sent": "text" }));
}

#[tokio::test]
async fn send_not_ready_is_service_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::default(), dir.path(), Some(SECRET));
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": KNOWN_PHONE, "message": "Hi" }))
        .await;

    response.assert_status_service_unavailable();
    response.assert_json(&json!({ "ok": false, "error": "whatsapp_not_ready" }));
}

#[tokio::test]
async fn send_missing_message_is_bad_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": KNOWN_PHONE, "message": "" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "ok": false, "error": "missing_phone_or_message" }));
}

#[tokio::test]
async fn send_with_invalid_json_is_treated_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .text("{not json")
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({ "ok": false, "error": "missing_phone_or_message" }));
}

#[tokio::test]
async fn send_to_unknown_account_is_bad_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": "+90 555 000 00 00", "message": "Hi" }))
        .await;

    response.assert_status_bad_request();
    response.assert_json(&json!({
        "ok": false,
        "error": "not_whatsapp_user",
        "phone": "905550000000"
    }));
}

#[tokio::test]
async fn gateway_failure_is_internal_error_with_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::failing(), dir.path(), Some(SECRET));
    harness.session.apply(SessionEvent::Ready);
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({ "phone": KNOWN_PHONE, "message": "Hi" }))
        .await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({ "ok": false, "error": "gateway rejected the message" }));
}

// ============ PDF Tests ============

#[tokio::test]
async fn send_pdf_with_caption_leaves_no_temp_file() {
    let pdf_host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/receipts/42.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 test".to_vec()))
        .expect(1)
        .mount(&pdf_host)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let staging = dir.path().join("tmp");
    let harness = ready_harness(&staging);
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({
            "phone": KNOWN_PHONE,
            "message": "Your receipt",
            "pdfUrl": format!("{}/receipts/42.pdf", pdf_host.uri())
        }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "ok": true, "sent": "pdf_with_caption" }));
    assert_eq!(
        harness.gateway.deliveries(),
        vec![Delivery::Media {
            to: format!("{KNOWN_PHONE}@s.whatsapp.net"),
            caption: "Your receipt".to_string(),
            bytes: 13,
        }]
    );
    assert_eq!(staged_files(&staging), 0);
}

#[tokio::test]
async fn failed_pdf_dispatch_still_removes_temp_file() {
    let pdf_host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-".to_vec()))
        .mount(&pdf_host)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let harness = harness_with(FakeGateway::failing(), dir.path(), Some(SECRET));
    harness.session.apply(SessionEvent::Ready);
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({
            "phone": KNOWN_PHONE,
            "message": "Your receipt",
            "pdfUrl": format!("{}/r.pdf", pdf_host.uri())
        }))
        .await;

    response.assert_status_internal_server_error();
    assert_eq!(staged_files(dir.path()), 0);
}

#[tokio::test]
async fn pdf_download_failure_is_internal_error() {
    let pdf_host = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&pdf_host)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let harness = ready_harness(dir.path());
    let (name, value) = secret_header(SECRET);

    let response = harness
        .server
        .post("/send")
        .add_header(name, value)
        .json(&json!({
            "phone": KNOWN_PHONE,
            "message": "Your receipt",
            "pdfUrl": format!("{}/missing.pdf", pdf_host.uri())
        }))
        .await;

    response.assert_status_internal_server_error();
    response.assert_json(&json!({
        "ok": false,
        "error": "Request failed with status code 404"
    }));
    assert!(harness.gateway.deliveries().is_empty());
}

// ============ Middleware Stack Tests ============

#[tokio::test]
async fn preflight_to_send_passes_cors_without_secret() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = Arc::new(FakeGateway::default());
    let mut config = config_with_secret(Some(SECRET));
    config.server.cors_origins = vec!["https://shop.example".to_string()];
    let (app, _session) = app_with(&gateway, dir.path(), config);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/send")
                .header(header::ORIGIN, "https://shop.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-bot-secret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static("https://shop.example"))
    );
}

#[tokio::test]
async fn oversized_streamed_body_is_payload_too_large() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gateway = Arc::new(FakeGateway::default());
    let mut config = config_with_secret(Some(SECRET));
    config.server.max_body_size_bytes = 64;
    let (app, session) = app_with(&gateway, dir.path(), config);
    session.apply(SessionEvent::Ready);

    let body = json!({ "phone": KNOWN_PHONE, "message": "x".repeat(256) }).to_string();

    // No content-length header, so the limit trips while reading the body
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/send")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-bot-secret", SECRET)
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(gateway.deliveries().is_empty());
}
