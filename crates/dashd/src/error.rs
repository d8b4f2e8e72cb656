//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bus error: {0}")]
    Bus(#[from] dash_bus::BusError),

    #[error("Server error: {0}")]
    Server(#[from] dash_server::ServerError),

    #[error("Client error: {0}")]
    Client(#[from] dash_client::ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
