use reqwest::Url;
use serde_json::{Map, Value};

use crate::core::errors::ClientError;

pub fn validate_config(config: &Value) -> Result<(), ClientError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    validate_url_field(root, "api_base_url", &["http", "https"])?;
    validate_url_field(root, "ws_base_url", &["ws", "wss"])?;
    validate_bool_field(root, "multimodal", "multimodal")?;

    if let Some(query) = expect_optional_object(root, "query")? {
        validate_u64_field(query, "query.num_results", "num_results", 1, 50)?;
        validate_bool_field(query, "query.include_web_search", "include_web_search")?;
        validate_bool_field(query, "query.include_drive_search", "include_drive_search")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ClientError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_url_field(
    section: &Map<String, Value>,
    key: &str,
    schemes: &[&str],
) -> Result<(), ClientError> {
    let value = section.get(key).ok_or_else(|| {
        ClientError::Config(format!("Invalid config at '{}': value is required", key))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(key, "string"));
    };
    let url = Url::parse(text.trim()).map_err(|e| {
        ClientError::Config(format!("Invalid config at '{}': {} ({})", key, e, text))
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ClientError::Config(format!(
            "Invalid config at '{}': scheme must be one of {}",
            key,
            schemes.join(", ")
        )));
    }
    Ok(())
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ClientError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ClientError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ClientError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ClientError {
    ClientError::Config(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
