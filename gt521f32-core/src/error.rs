//! Error types for gt521f32-core

use std::fmt;

use crate::command::Command;
use crate::nack::NackCode;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Protocol errors
///
/// Raised while framing or unframing bytes. None of these are device
/// refusals; a NACK is reported as [`DeviceError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Fewer bytes than the frame shape requires
    #[error("Frame truncated: expected {expected} bytes, got {actual} bytes")]
    Truncated {
        expected: usize,
        actual: usize,
    },

    /// Trailing checksum does not match the sum of the preceding bytes
    #[error("Checksum mismatch: expected 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        expected: u16,
        received: u16,
    },

    /// Frame starts with something other than a known start code
    #[error("Bad start code: {0:02X?}")]
    BadStartCode([u8; 2]),

    /// Command name not present in the catalog
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command opcode not present in the catalog
    #[error("Unknown command code: 0x{0:02X}")]
    UnknownCommandCode(u16),
}

/// Negative acknowledgement reported by the sensor
///
/// Carries the raw error parameter and, when the catalog knows it, the
/// symbolic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceError {
    /// Command that was refused
    pub command: Command,

    /// Raw parameter of the NACK response
    pub code: u32,
}

impl DeviceError {
    pub fn new(command: Command, code: u32) -> Self {
        Self { command, code }
    }

    /// Symbolic error, if the code is in the catalog
    pub fn kind(&self) -> Option<NackCode> {
        NackCode::from_parameter(self.code)
    }

    /// Check if the code is missing from the catalog
    ///
    /// During enrollment the sensor reports a duplicate template by
    /// answering with the id it collides with instead of an error code.
    pub fn is_unrecognized(&self) -> bool {
        self.kind().is_none()
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{} refused: {}", self.command, kind),
            None => write!(
                f,
                "{} refused: unrecognized error 0x{:04X}",
                self.command, self.code
            ),
        }
    }
}

impl std::error::Error for DeviceError {}
