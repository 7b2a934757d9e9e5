use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::query::{QueryMode, QueryRequest, QueryResponse};
use super::schema::ChartAnalysis;
use super::types::{
    unwrap_list, ChartListResponse, DeleteResponse, DocumentEntry, DocumentUploadResponse,
    HealthStatus, ImageAnalysis, VisualLinksResponse,
};
use crate::core::config::{ClientConfig, QueryOptions};
use crate::core::errors::ClientError;
use crate::upload::UploadFile;

/// HTTP client for the RAG backend.
///
/// One round trip per call. No retries, no auth headers, no request
/// cancellation; non-2xx responses become [`ClientError::Api`].
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    query_defaults: QueryOptions,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("rag-console/", env!("CARGO_PKG_VERSION"))),
        );
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self::with_http_client(config, client))
    }

    /// Uses a caller-built reqwest client, e.g. one with a proxy or custom TLS.
    pub fn with_http_client(config: &ClientConfig, client: Client) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
            query_defaults: config.query.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_defaults(&self) -> &QueryOptions {
        &self.query_defaults
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|err| {
            tracing::warn!(error = %err, "Backend request failed");
            ClientError::Transport(err)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_status(status, &body);
            tracing::warn!(%status, path = %url, error = %err, "Backend returned an error status");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload).map_err(|err| {
            tracing::warn!(path = %url, error = %err, "Backend payload did not match the expected shape");
            ClientError::decode(err)
        })
    }

    fn file_form(file: &UploadFile) -> Result<Form, ClientError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        Ok(Form::new().part("file", part))
    }

    /// Plain query with the configured defaults.
    pub async fn query(&self, text: &str) -> Result<QueryResponse, ClientError> {
        let request = QueryRequest::new(text, &self.query_defaults);
        self.query_with(&request, QueryMode::Plain).await
    }

    pub async fn query_with(
        &self,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> Result<QueryResponse, ClientError> {
        tracing::debug!(%mode, num_results = request.num_results, "Sending query");
        self.send(self.client.post(self.url(mode.path())).json(request))
            .await
    }

    pub async fn upload_document(
        &self,
        file: &UploadFile,
    ) -> Result<DocumentUploadResponse, ClientError> {
        let form = Self::file_form(file)?;
        self.send(self.client.post(self.url("/upload")).multipart(form))
            .await
    }

    pub async fn analyze_chart(&self, file: &UploadFile) -> Result<ChartAnalysis, ClientError> {
        let form = Self::file_form(file)?;
        self.send(self.client.post(self.url("/analyze/chart")).multipart(form))
            .await
    }

    pub async fn analyze_image(&self, file: &UploadFile) -> Result<ImageAnalysis, ClientError> {
        let form = Self::file_form(file)?;
        self.send(self.client.post(self.url("/analyze/image")).multipart(form))
            .await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentEntry>, ClientError> {
        let payload: Value = self.send(self.client.get(self.url("/documents"))).await?;
        Ok(unwrap_list(payload, "documents")
            .into_iter()
            .filter_map(DocumentEntry::from_value)
            .collect())
    }

    pub async fn delete_document(&self, id: &str) -> Result<DeleteResponse, ClientError> {
        if id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "document id cannot be empty".to_string(),
            ));
        }
        let path = format!("/documents/{}", urlencoding::encode(id));
        self.send(self.client.delete(self.url(&path))).await
    }

    pub async fn search(&self, request: &QueryRequest) -> Result<Vec<Value>, ClientError> {
        let payload: Value = self
            .send(self.client.post(self.url("/search")).json(request))
            .await?;
        Ok(unwrap_list(payload, "results"))
    }

    pub async fn citation(&self, id: &str) -> Result<Value, ClientError> {
        let path = format!("/citation/{}", urlencoding::encode(id));
        self.send(self.client.get(self.url(&path))).await
    }

    pub async fn visual_links(&self, document_id: &str) -> Result<VisualLinksResponse, ClientError> {
        let path = format!("/multimodal/visual-links/{}", urlencoding::encode(document_id));
        self.send(self.client.get(self.url(&path))).await
    }

    pub async fn list_charts(&self) -> Result<ChartListResponse, ClientError> {
        self.send(self.client.get(self.url("/multimodal/charts")))
            .await
    }
}
