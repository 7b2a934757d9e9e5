use serde_json::{json, Value};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_WS_BASE_URL: &str = "ws://localhost:8000";
pub const DEFAULT_NUM_RESULTS: u32 = 5;

pub fn default_config() -> Value {
    json!({
        "api_base_url": DEFAULT_API_BASE_URL,
        "ws_base_url": DEFAULT_WS_BASE_URL,
        "multimodal": false,
        "query": {
            "num_results": DEFAULT_NUM_RESULTS,
            "include_web_search": true,
            "include_drive_search": false
        }
    })
}
