//! High-level error types

use gt521f32_core::DeviceError;
use gt521f32_transport::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(gt521f32_transport::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] gt521f32_core::Error),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Finger prompt cancelled")]
    Cancelled,

    #[error("Invalid enrollment step {0}, expected 1 to 3")]
    InvalidEnrollStep(u8),

    #[error("Image error: {0}")]
    Image(#[from] gt521f32_types::Error),
}

impl From<gt521f32_transport::Error> for Error {
    fn from(err: gt521f32_transport::Error) -> Self {
        match err {
            gt521f32_transport::Error::Config(config) => Self::Config(config),
            other => Self::Transport(other),
        }
    }
}

impl Error {
    /// Check if the sensor refused the command
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::Device(_))
    }

    /// Check if a finger prompt was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the link can no longer be trusted
    ///
    /// Configuration, transport and framing failures are never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Transport(_) | Self::Protocol(_))
    }
}
