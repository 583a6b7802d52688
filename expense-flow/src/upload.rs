use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{config::AgentConfig, error::Result};

const DEFAULT_FILE_NAME: &str = "receipt";

/// A receipt as handed over by the user: its original name and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    /// A blank name is replaced with a generic one.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        Self {
            file_name: if file_name.trim().is_empty() {
                DEFAULT_FILE_NAME.to_string()
            } else {
                file_name
            },
            bytes: bytes.into(),
        }
    }
}

/// Result of sending one file to the asset store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub asset_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn uploaded(asset_ids: Vec<String>) -> Self {
        Self {
            success: true,
            asset_ids,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            asset_ids: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// A successful upload must name at least one asset.
    pub fn is_success(&self) -> bool {
        self.success && !self.asset_ids.is_empty()
    }

    pub fn error_message(&self) -> &str {
        match self.error.as_deref() {
            Some(error) if !error.trim().is_empty() => error,
            _ if self.success => "Upload returned no asset identifiers",
            _ => "Upload failed",
        }
    }
}

/// Transfers a user-supplied file to the remote asset store.
#[async_trait]
pub trait UploadAdapter: Send + Sync {
    async fn upload(&self, file: ReceiptFile) -> UploadOutcome;
}

/// Multipart upload to the agent service's asset endpoint
#[derive(Clone)]
pub struct HttpUploadAdapter {
    upload_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpUploadAdapter {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn try_upload(&self, file: ReceiptFile) -> Result<UploadOutcome> {
        info!(file = %file.file_name, size = file.bytes.len(), "Uploading file");

        let form = Form::new().part("files", Part::bytes(file.bytes).file_name(file.file_name));

        let mut builder = self.client.post(&self.upload_url).multipart(form);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let remote_error = serde_json::from_str::<UploadOutcome>(&text)
                .ok()
                .and_then(|outcome| outcome.error);
            warn!(status = %status, "Upload rejected");
            return Ok(UploadOutcome::failed(
                remote_error.unwrap_or_else(|| format!("Upload failed ({})", status.as_u16())),
            ));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl UploadAdapter for HttpUploadAdapter {
    async fn upload(&self, file: ReceiptFile) -> UploadOutcome {
        let file_name = file.file_name.clone();
        match self.try_upload(file).await {
            Ok(outcome) if outcome.is_success() => {
                info!(asset_count = outcome.asset_ids.len(), "Upload complete");
                outcome
            }
            Ok(outcome) => UploadOutcome::failed(outcome.error_message()),
            Err(e) => {
                error!(error = %e, file = %file_name, "Upload failed");
                UploadOutcome::failed(e.to_string())
            }
        }
    }
}
