pub mod analysis;
pub mod api;
pub mod chat;
pub mod core;
pub mod upload;
pub mod workspace;
pub mod ws;

pub use api::ApiClient;
pub use crate::core::config::ClientConfig;
pub use crate::core::errors::ClientError;
