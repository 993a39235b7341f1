pub mod config;
pub mod error;
pub mod notifications;
pub mod task_store_client;
