use teloxide::RequestError;

use crate::{config::ConfigError, printer::PrinterError};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Printer error: {0}")]
    PrinterError(#[from] PrinterError),

    #[error("Telegram request error: {0}")]
    RequestError(#[from] RequestError),

    #[error("Logging setup error: {0}")]
    LoggingError(#[from] std::io::Error),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
