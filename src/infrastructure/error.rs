use crate::domain::registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("not authenticated with the task store")]
    NotAuthenticated,
    #[error("task store rejected the request: {0}")]
    StoreRejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("registry out of sync: {0}")]
    Registry(#[from] RegistryError),
}
