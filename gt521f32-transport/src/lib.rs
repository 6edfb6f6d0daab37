//! Transport layer for GT521F32 modules
//!
//! Provides serial and SCSI pass-through communication with devices.

pub mod error;
#[cfg(any(target_os = "linux", windows))]
pub mod scsi;
pub mod serial;

pub use error::{ConfigError, Error, Result};
#[cfg(any(target_os = "linux", windows))]
pub use scsi::ScsiTransport;
pub use serial::SerialTransport;

use std::fmt;
use std::time::Duration;

use bytes::BytesMut;
use tracing::debug;

/// Transport trait for the two physical links
///
/// The protocol is strictly half-duplex, so implementations are driven
/// by one caller at a time.
pub trait Transport: Send {
    /// Which kind of link this is
    fn kind(&self) -> TransportKind;

    /// Check if the link is open
    fn is_open(&self) -> bool;

    /// Send raw bytes
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Receive exactly `len` bytes
    ///
    /// Blocks until all bytes arrived or the link fails. Partial reads are
    /// never returned.
    fn read(&mut self, len: usize) -> Result<BytesMut>;

    /// Release the link
    fn close(&mut self) -> Result<()>;

    /// Re-create the link at a new baud rate
    fn reopen(&mut self, baud_rate: u32) -> Result<()> {
        let _ = baud_rate;
        Err(ConfigError::UnsupportedOption {
            option: "baud_rate",
            kind: self.kind(),
        }
        .into())
    }

    /// Port the link was opened on
    fn port_name(&self) -> String;
}

/// Physical link variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Serial line (UART or USB CDC)
    Stream,

    /// Raw block device driven through SCSI pass-through
    BlockPassthrough,
}

impl TransportKind {
    const STREAM_PREFIXES: [&'static str; 3] = ["COM", "/dev/tty", "/dev/cu."];
    const BLOCK_PREFIXES: [&'static str; 1] = ["/dev/sg"];

    /// Infer the link kind from a port name
    ///
    /// # Examples
    ///
    /// ```
    /// use gt521f32_transport::TransportKind;
    ///
    /// assert_eq!(TransportKind::classify("COM3").unwrap(), TransportKind::Stream);
    /// assert_eq!(TransportKind::classify("/dev/sg2").unwrap(), TransportKind::BlockPassthrough);
    /// assert_eq!(TransportKind::classify("E:").unwrap(), TransportKind::BlockPassthrough);
    /// assert!(TransportKind::classify("/tmp/sensor").is_err());
    /// ```
    pub fn classify(port: &str) -> std::result::Result<Self, ConfigError> {
        if Self::STREAM_PREFIXES.iter().any(|p| port.starts_with(p)) {
            return Ok(Self::Stream);
        }

        if Self::BLOCK_PREFIXES.iter().any(|p| port.starts_with(p)) || is_drive_letter(port) {
            return Ok(Self::BlockPassthrough);
        }

        Err(ConfigError::UnknownInterfaceKind(port.to_string()))
    }

    /// Check if the baud rate can be configured
    pub fn supports_baud_rate(self) -> bool {
        matches!(self, Self::Stream)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => write!(f, "serial"),
            Self::BlockPassthrough => write!(f, "SCSI pass-through"),
        }
    }
}

/// Windows drive designator such as `E:`
fn is_drive_letter(port: &str) -> bool {
    let bytes = port.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Options applied when a transport is opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Serial baud rate (serial only, module default when unset)
    pub baud_rate: Option<u32>,

    /// Upper bound for a single `read`
    ///
    /// Unset means block until the data arrives.
    pub read_timeout: Option<Duration>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Reject options the link kind cannot honour
    pub fn validate(&self, kind: TransportKind) -> std::result::Result<(), ConfigError> {
        if self.baud_rate.is_some() && !kind.supports_baud_rate() {
            return Err(ConfigError::UnsupportedOption {
                option: "baud_rate",
                kind,
            });
        }
        Ok(())
    }
}

/// Open the transport matching `port`
///
/// # Errors
///
/// Returns error if:
/// - The port name matches no known kind
/// - An option is not supported by that kind
/// - The device cannot be opened
pub fn open(port: &str, options: &TransportOptions) -> Result<Box<dyn Transport>> {
    let kind = TransportKind::classify(port)?;
    options.validate(kind)?;

    debug!("Chose {} transport for {}", kind, port);

    match kind {
        TransportKind::Stream => Ok(Box::new(SerialTransport::open(port, options)?)),
        TransportKind::BlockPassthrough => open_block(port, options),
    }
}

#[cfg(any(target_os = "linux", windows))]
fn open_block(port: &str, options: &TransportOptions) -> Result<Box<dyn Transport>> {
    Ok(Box::new(ScsiTransport::open(port, options)?))
}

#[cfg(not(any(target_os = "linux", windows)))]
fn open_block(port: &str, _options: &TransportOptions) -> Result<Box<dyn Transport>> {
    Err(Error::Unsupported(format!(
        "SCSI pass-through for {} is only available on Linux and Windows",
        port
    )))
}
