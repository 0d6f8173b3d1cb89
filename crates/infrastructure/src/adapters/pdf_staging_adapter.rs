//! PDF staging adapter
//!
//! Downloads remote PDFs into uniquely named files under a temp directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use application::error::ApplicationError;
use application::ports::{DocumentStagePort, StagedDocument};
use async_trait::async_trait;
use chrono::Utc;
use domain::MediaAttachment;
use reqwest::Client;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Length of the random part of staged file names
const RANDOM_SUFFIX_LEN: usize = 8;

/// Adapter that implements `DocumentStagePort` on the local filesystem
#[derive(Debug, Clone)]
pub struct PdfStagingAdapter {
    http: Client,
    temp_dir: PathBuf,
    file_prefix: String,
}

impl PdfStagingAdapter {
    /// Create a staging adapter
    ///
    /// Without a timeout the HTTP client's defaults apply.
    pub fn new(
        temp_dir: impl Into<PathBuf>,
        file_prefix: impl Into<String>,
        fetch_timeout: Option<Duration>,
    ) -> Result<Self, ApplicationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = fetch_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApplicationError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            temp_dir: temp_dir.into(),
            file_prefix: file_prefix.into(),
        })
    }

    /// Directory staged files are written to
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// `<prefix>-<unix-millis>-<random>.pdf`
    fn unique_file_name(&self) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.pdf",
            self.file_prefix,
            Utc::now().timestamp_millis(),
            &random[..RANDOM_SUFFIX_LEN]
        )
    }
}

fn io_error(action: &str, path: &Path, error: &std::io::Error) -> ApplicationError {
    ApplicationError::Internal(format!("{action} {}: {error}", path.display()))
}

#[async_trait]
impl DocumentStagePort for PdfStagingAdapter {
    #[instrument(skip(self))]
    async fn stage(&self, url: &str) -> Result<StagedDocument, ApplicationError> {
        tokio::fs::create_dir_all(&self.temp_dir)
            .await
            .map_err(|e| io_error("Failed to create", &self.temp_dir, &e))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApplicationError::ExternalService(format!("PDF download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApplicationError::ExternalService(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApplicationError::ExternalService(format!("PDF download failed: {e}")))?;

        let file_name = self.unique_file_name();
        let path = self.temp_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| io_error("Failed to write", &path, &e))?;

        debug!(path = %path.display(), size = bytes.len(), "PDF staged");
        Ok(StagedDocument { path, file_name })
    }

    async fn load(&self, document: &StagedDocument) -> Result<MediaAttachment, ApplicationError> {
        let data = tokio::fs::read(&document.path)
            .await
            .map_err(|e| io_error("Failed to read", &document.path, &e))?;
        Ok(MediaAttachment::pdf(document.file_name.clone(), data))
    }

    async fn discard(&self, document: &StagedDocument) -> Result<(), ApplicationError> {
        match tokio::fs::remove_file(&document.path).await {
            Ok(()) => {
                debug!(path = %document.path.display(), "Temp file removed");
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("Failed to remove", &document.path, &e)),
        }
    }
}
