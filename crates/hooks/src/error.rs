use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HookError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Telemetry error: {0}")]
    Telemetry(String),
    #[error("Provider error: {0}")]
    Provider(String),
}

// Add implementations for error conversion
impl From<Box<dyn std::error::Error>> for HookError {
    fn from(error: Box<dyn std::error::Error>) -> Self {
        HookError::Provider(error.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for HookError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        HookError::Provider(error.to_string())
    }
}

impl From<anyhow::Error> for HookError {
    fn from(error: anyhow::Error) -> Self {
        HookError::Provider(error.to_string())
    }
}
