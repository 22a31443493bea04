use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Fatal application errors. Per-flow failures (validation, gateway) stay
/// inside the flow that raised them and never surface here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
}
