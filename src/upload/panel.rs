use serde::Serialize;
use tokio::sync::watch;

use super::classify::{classify, FileCategory};
use super::handler::UploadHandler;
use super::source::UploadFile;
use crate::api::{ChartAnalysis, UploadResponse};
use crate::core::errors::ClientError;

pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub filename: String,
    pub category: FileCategory,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    Succeeded { response: UploadResponse },
    Failed { message: String },
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, UploadStatus::Succeeded { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Failed { message } => Some(message),
            UploadStatus::Succeeded { .. } => None,
        }
    }

    pub fn response(&self) -> Option<&UploadResponse> {
        match &self.status {
            UploadStatus::Succeeded { response } => Some(response),
            UploadStatus::Failed { .. } => None,
        }
    }

    pub fn chart_analysis(&self) -> Option<&ChartAnalysis> {
        self.response().and_then(UploadResponse::chart_analysis)
    }
}

/// Multi-modal upload widget state: accumulated results plus a batch-level
/// `uploading` flag.
pub struct UploadPanel {
    results: Vec<UploadResult>,
    uploading: watch::Sender<bool>,
}

impl Default for UploadPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadPanel {
    pub fn new() -> Self {
        let (uploading, _) = watch::channel(false);
        Self {
            results: Vec::new(),
            uploading,
        }
    }

    pub fn results(&self) -> &[UploadResult] {
        &self.results
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    pub fn is_uploading(&self) -> bool {
        *self.uploading.borrow()
    }

    /// Observe the batch-level flag from elsewhere (a spinner, a test).
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.uploading.subscribe()
    }

    /// Uploads `files` one at a time in input order and returns this batch's
    /// results, one per file.
    ///
    /// A failing file is recorded and the batch moves on; nothing is retried.
    pub async fn process_batch<H>(&mut self, files: Vec<UploadFile>, handler: &H) -> &[UploadResult]
    where
        H: UploadHandler + ?Sized,
    {
        let start = self.results.len();
        if files.is_empty() {
            return &self.results[start..];
        }

        self.uploading.send_replace(true);
        tracing::info!(files = files.len(), "Starting upload batch");

        for file in files {
            let category = classify(&file.content_type, &file.name);
            let status = match handler.upload(&file, category).await {
                Ok(response) => {
                    tracing::info!(file = %file.name, %category, "Upload succeeded");
                    UploadStatus::Succeeded { response }
                }
                Err(err) => {
                    tracing::warn!(file = %file.name, %category, error = %err, "Upload failed");
                    UploadStatus::Failed {
                        message: failure_message(&err),
                    }
                }
            };
            self.results.push(UploadResult {
                filename: file.name,
                category,
                status,
            });
        }

        self.uploading.send_replace(false);
        let batch = &self.results[start..];
        tracing::info!(
            succeeded = batch.iter().filter(|r| r.is_success()).count(),
            failed = batch.iter().filter(|r| !r.is_success()).count(),
            "Upload batch finished"
        );
        batch
    }
}

fn failure_message(err: &ClientError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_UPLOAD_ERROR.to_string()
    } else {
        message
    }
}
