//! Transport errors

use std::io;

use crate::TransportKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport not open")]
    NotOpen,

    #[error("Read timeout: received {received} of {expected} bytes")]
    ReadTimeout {
        expected: usize,
        received: usize,
    },

    #[error("Short transfer: requested {requested} bytes, transferred {transferred}")]
    ShortTransfer {
        requested: usize,
        transferred: usize,
    },

    #[error(
        "SCSI command failed (status=0x{status:02X}, host=0x{host_status:04X}, driver=0x{driver_status:04X})"
    )]
    Scsi {
        status: u8,
        host_status: u16,
        driver_status: u16,
    },

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors in choosing or configuring a transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not derive interface type from port {0:?}")]
    UnknownInterfaceKind(String),

    #[error("Option {option} is not supported by {kind} transports")]
    UnsupportedOption {
        option: &'static str,
        kind: TransportKind,
    },
}
