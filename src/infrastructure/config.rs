use crate::infrastructure::error::InfraError;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const CLIENT_JSON: &str = "client.json";
const DEFAULT_STORE_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const STORE_URL_KEYS: &[&str] = &["WEEKGRID_STORE_URL"];
const SESSION_COOKIE_KEYS: &[&str] = &["WEEKGRID_SESSION_COOKIE"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub store_base_url: Url,
    pub session_cookie: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_base_url: Url::parse(DEFAULT_STORE_URL).expect("valid fixed url"),
            session_cookie: None,
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
        }
    }
}

fn default_client_file() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "storeBaseUrl": DEFAULT_STORE_URL,
        "sessionCookie": null,
        "requestTimeoutSeconds": DEFAULT_TIMEOUT_SECONDS
    })
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(CLIENT_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_client_file())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_client_config(config_dir: &Path) -> Result<ClientConfig, InfraError> {
    load_client_config_with_lookup(config_dir, |key| std::env::var(key).ok())
}

pub fn load_client_config_with_lookup<F>(
    config_dir: &Path,
    lookup: F,
) -> Result<ClientConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = read_config(&config_dir.join(CLIENT_JSON))?;

    let raw_url = optional_lookup_value(&lookup, STORE_URL_KEYS)
        .or_else(|| string_field(&file, "storeBaseUrl"))
        .unwrap_or_else(|| DEFAULT_STORE_URL.to_string());
    let store_base_url = parse_base_url(&raw_url)?;

    let session_cookie = optional_lookup_value(&lookup, SESSION_COOKIE_KEYS)
        .or_else(|| string_field(&file, "sessionCookie"));

    let request_timeout = file
        .get("requestTimeoutSeconds")
        .and_then(serde_json::Value::as_u64)
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs);

    Ok(ClientConfig {
        store_base_url,
        session_cookie,
        request_timeout,
    })
}

fn parse_base_url(raw: &str) -> Result<Url, InfraError> {
    let url = Url::parse(raw.trim())
        .map_err(|error| InfraError::InvalidConfig(format!("invalid storeBaseUrl '{raw}': {error}")))?;
    if url.cannot_be_a_base() {
        return Err(InfraError::InvalidConfig(format!(
            "storeBaseUrl '{raw}' cannot be a base URL"
        )));
    }
    Ok(url)
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn optional_lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key) {
            let normalized = value.trim();
            if !normalized.is_empty() {
                return Some(normalized.to_string());
            }
        }
    }
    None
}
