use std::sync::Arc;

use async_trait::async_trait;

use super::classify::FileCategory;
use super::source::UploadFile;
use crate::api::{ApiClient, UploadResponse};
use crate::core::errors::ClientError;

/// The per-file upload step injected into an upload batch.
#[async_trait]
pub trait UploadHandler: Send + Sync {
    async fn upload(
        &self,
        file: &UploadFile,
        category: FileCategory,
    ) -> Result<UploadResponse, ClientError>;
}

#[async_trait]
impl<T: UploadHandler + ?Sized> UploadHandler for Arc<T> {
    async fn upload(
        &self,
        file: &UploadFile,
        category: FileCategory,
    ) -> Result<UploadResponse, ClientError> {
        (**self).upload(file, category).await
    }
}

/// Routes each category to its backend endpoint.
#[async_trait]
impl UploadHandler for ApiClient {
    async fn upload(
        &self,
        file: &UploadFile,
        category: FileCategory,
    ) -> Result<UploadResponse, ClientError> {
        match category {
            FileCategory::Document => {
                let response = self.upload_document(file).await?;
                if !response.success {
                    return Err(ClientError::Upload(
                        response.message.clone().unwrap_or_default(),
                    ));
                }
                Ok(UploadResponse::Document(response))
            }
            FileCategory::Chart => self.analyze_chart(file).await.map(UploadResponse::Chart),
            FileCategory::Image => {
                let analysis = self.analyze_image(file).await?;
                if let Some(message) = analysis.caption_error() {
                    return Err(ClientError::Upload(message.to_string()));
                }
                Ok(UploadResponse::Image(analysis))
            }
        }
    }
}
