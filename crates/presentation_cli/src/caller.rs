//! HTTP calls against a running relay

use std::time::Duration;

use domain::SendRequest;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Header carrying the shared secret
const BOT_SECRET_HEADER: &str = "x-bot-secret";

/// Status and body of a relay response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Body pretty-printed when it is JSON, verbatim otherwise
    pub fn pretty_body(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .and_then(|json| serde_json::to_string_pretty(&json))
            .unwrap_or_else(|_| self.body.clone())
    }
}

/// Thin client for the relay endpoints
#[derive(Debug, Clone)]
pub struct RelayCaller {
    http: Client,
}

impl RelayCaller {
    /// Create a caller whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// POST a send request to `url`
    pub async fn send(
        &self,
        url: &str,
        secret: &str,
        request: &SendRequest,
    ) -> reqwest::Result<Reply> {
        debug!(url, "Posting send request");
        let response = self
            .http
            .post(url)
            .header(BOT_SECRET_HEADER, secret)
            .json(request)
            .send()
            .await?;
        Self::reply(response).await
    }

    /// GET `{base_url}/health`
    pub async fn health(&self, base_url: &str) -> reqwest::Result<Reply> {
        let url = health_url(base_url);
        debug!(url = %url, "Checking relay health");
        let response = self.http.get(url).send().await?;
        Self::reply(response).await
    }

    async fn reply(response: reqwest::Response) -> reqwest::Result<Reply> {
        let status = response.status();
        let body = response.text().await?;
        Ok(Reply { status, body })
    }
}

/// Health endpoint for a relay base URL or send URL
pub fn health_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/send").unwrap_or(base);
    format!("{base}/health")
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use super::*;

    fn caller() -> RelayCaller {
        RelayCaller::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn health_url_accepts_send_url() {
        assert_eq!(health_url("http://localhost:3001"), "http://localhost:3001/health");
        assert_eq!(health_url("http://localhost:3001/"), "http://localhost:3001/health");
        assert_eq!(
            health_url("http://localhost:3001/send"),
            "http://localhost:3001/health"
        );
    }

    #[test]
    fn pretty_body_falls_back_to_raw_text() {
        let reply = Reply {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(reply.pretty_body(), "upstream down");

        let reply = Reply {
            status: StatusCode::OK,
            body: r#"{"ok":true}"#.to_string(),
        };
        assert!(reply.pretty_body().contains("\"ok\": true"));
    }

    #[tokio::test]
    async fn send_posts_secret_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("x-bot-secret", "s3cret"))
            .and(body_json(serde_json::json!({
                "phone": "05397324662",
                "message": "Hi",
                "pdfUrl": "https://files.example/r.pdf"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "sent": "pdf_with_caption" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request =
            SendRequest::new("05397324662", "Hi").with_pdf_url("https://files.example/r.pdf");
        let reply = caller()
            .send(&format!("{}/send", server.uri()), "s3cret", &request)
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("pdf_with_caption"));
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "ok": false, "error": "unauthorized" })),
            )
            .mount(&server)
            .await;

        let reply = caller()
            .send(
                &format!("{}/send", server.uri()),
                "wrong",
                &SendRequest::new("1", "x"),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_reads_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "isReady": true })),
            )
            .mount(&server)
            .await;

        let reply = caller().health(&server.uri()).await.unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.contains("isReady"));
    }
}
