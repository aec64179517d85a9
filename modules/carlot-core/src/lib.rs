pub mod config;
pub mod file_config;

pub use config::{AppConfig, BraintreeCredentials};
pub use file_config::{ChatbotConfig, FileConfig, ServerConfig, UploadsConfig};
