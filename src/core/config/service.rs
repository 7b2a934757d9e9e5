use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::defaults::default_config;
use super::paths::AppPaths;
use super::validation::validate_config;
use super::ClientConfig;
use crate::core::errors::ClientError;

/// Environment variables that override file settings, keyed by config field.
const ENV_OVERRIDES: [(&str, &str); 2] = [
    ("RAG_API_URL", "api_base_url"),
    ("RAG_WS_URL", "ws_base_url"),
];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("RAG_CONSOLE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        self.paths.config_path.clone()
    }

    /// Defaults, then the YAML file, then the process environment.
    pub fn load_config(&self) -> Result<ClientConfig, ClientError> {
        self.load_from(&self.config_path(), |key| env::var(key).ok())
    }

    pub fn load_from<F>(&self, path: &Path, lookup_env: F) -> Result<ClientConfig, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_config = load_yaml_file(path)?;
        let merged = deep_merge(&default_config(), &file_config);
        let merged = apply_env_overrides(merged, lookup_env);

        validate_config(&merged)?;
        let config: ClientConfig =
            serde_json::from_value(merged).map_err(|e| ClientError::Config(e.to_string()))?;
        tracing::debug!(
            api = %config.api_base_url,
            ws = %config.ws_base_url,
            "Loaded client config"
        );
        Ok(config)
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, ClientError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_yaml::from_str::<Value>(&contents) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(Value::Null) => Ok(Value::Object(Map::new())),
        Ok(_) => Err(ClientError::Config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
        Err(e) => Err(ClientError::Config(format!("{}: {}", path.display(), e))),
    }
}

fn apply_env_overrides<F>(mut config: Value, lookup_env: F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    if let Value::Object(map) = &mut config {
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup_env(var).filter(|v| !v.trim().is_empty()) {
                map.insert(key.to_string(), Value::String(value.trim().to_string()));
            }
        }
    }
    config
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(dir: &Path) -> ConfigService {
        ConfigService::new(Arc::new(AppPaths::with_data_dir(dir)))
    }

    #[test]
    fn file_query_section_merges_into_defaults() {
        let merged = deep_merge(
            &default_config(),
            &json!({ "query": { "num_results": 12 }, "multimodal": true }),
        );

        assert_eq!(merged["query"]["num_results"], 12);
        assert_eq!(merged["query"]["include_web_search"], true);
        assert_eq!(merged["multimodal"], true);
        assert_eq!(merged["api_base_url"], "http://localhost:8000");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let config = svc
            .load_from(&dir.path().join("absent.yml"), |_| None)
            .unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "api_base_url: https://rag.example.com\nquery:\n  num_results: 12\n",
        )
        .unwrap();

        let config = service(dir.path()).load_from(&path, |_| None).unwrap();
        assert_eq!(config.api_base_url, "https://rag.example.com");
        assert_eq!(config.query.num_results, 12);
        assert!(config.query.include_web_search);
        assert_eq!(config.ws_base_url, "ws://localhost:8000");
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "api_base_url: https://file.example.com\n").unwrap();

        let config = service(dir.path())
            .load_from(&path, |key| match key {
                "RAG_API_URL" => Some("http://env.example.com:9000".to_string()),
                "RAG_WS_URL" => Some("   ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api_base_url, "http://env.example.com:9000");
        assert_eq!(config.ws_base_url, "ws://localhost:8000");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "query:\n  num_results: 500\n").unwrap();

        let err = service(dir.path()).load_from(&path, |_| None).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn non_mapping_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "- just\n- a list\n").unwrap();

        assert!(service(dir.path()).load_from(&path, |_| None).is_err());
    }
}
