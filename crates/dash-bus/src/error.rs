//! Bus source error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Failed to open CAN channel {channel}: {source}")]
    ChannelOpen {
        channel: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Source already started")]
    AlreadyStarted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BusResult<T> = Result<T, BusError>;
