use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiClient, QueryMode, QueryRequest, QueryResponse};
use crate::core::errors::ClientError;

/// Where chat questions go. [`ApiClient`] in production, fakes in tests.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn send_query(
        &self,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> Result<QueryResponse, ClientError>;
}

#[async_trait]
impl QueryBackend for ApiClient {
    async fn send_query(
        &self,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> Result<QueryResponse, ClientError> {
        self.query_with(request, mode).await
    }
}

#[async_trait]
impl<T: QueryBackend + ?Sized> QueryBackend for Arc<T> {
    async fn send_query(
        &self,
        request: &QueryRequest,
        mode: QueryMode,
    ) -> Result<QueryResponse, ClientError> {
        (**self).send_query(request, mode).await
    }
}
