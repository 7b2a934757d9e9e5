pub mod defaults;
pub mod paths;
pub mod service;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use paths::AppPaths;
pub use service::ConfigService;

use crate::core::errors::ClientError;
use defaults::{DEFAULT_API_BASE_URL, DEFAULT_NUM_RESULTS, DEFAULT_WS_BASE_URL};

/// Everything the client needs to reach the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub ws_base_url: String,
    /// Start chat sessions in multi-modal mode.
    #[serde(default)]
    pub multimodal: bool,
    #[serde(default)]
    pub query: QueryOptions,
}

/// Per-query knobs sent with every chat question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub num_results: u32,
    pub include_web_search: bool,
    pub include_drive_search: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            num_results: DEFAULT_NUM_RESULTS,
            include_web_search: true,
            include_drive_search: false,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            multimodal: false,
            query: QueryOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `api_base_url`, with the WebSocket URL derived from it.
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        let ws_base_url = derive_ws_url(&api_base_url);
        Self {
            api_base_url,
            ws_base_url,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let value = serde_json::to_value(self).map_err(|e| ClientError::Config(e.to_string()))?;
        validation::validate_config(&value)
    }
}

/// `http://host` -> `ws://host`, `https://host` -> `wss://host`.
pub fn derive_ws_url(api_base_url: &str) -> String {
    if let Some(rest) = api_base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = api_base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        api_base_url.to_string()
    }
}
