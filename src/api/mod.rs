//! Typed access to the RAG backend's HTTP API.

pub mod client;
pub mod query;
pub mod schema;
pub mod types;

pub use client::ApiClient;
pub use query::{Citation, QueryMode, QueryRequest, QueryResponse};
pub use schema::{
    ChartAnalysis, DataInsights, DataPoint, KeyStatistics, MultiModalMetadata, StatPoint,
    VisualTextLink,
};
pub use types::{
    ChartListResponse, ChartSummary, DeleteResponse, DocumentEntry, DocumentUploadResponse,
    HealthStatus, ImageAnalysis, ServiceState, UploadResponse, VisualLinksResponse,
};
