//! Serial transport
//!
//! The module talks 8N1 at 9600 baud after power-up. USB CDC adapters
//! deliver large frames in fragments, so reads accumulate whatever the
//! driver has buffered until the requested length is reached.

use std::io::{Read, Write};
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use serialport::{ClearBuffer, DataBits, SerialPort};
use tracing::{debug, trace, warn};

use crate::{Transport, TransportKind, TransportOptions, error::*};

/// Serial transport for GT521F32 modules
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    io_timeout: Duration,
    read_timeout: Option<Duration>,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Baud rate the module boots with
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    /// Timeout of a single driver call
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(2);

    /// Pause between polls for buffered bytes
    pub const FRAGMENT_DELAY: Duration = Duration::from_millis(50);

    /// Open serial transport
    pub fn open(port_name: impl Into<String>, options: &TransportOptions) -> Result<Self> {
        let mut transport = Self {
            port_name: port_name.into(),
            baud_rate: options.baud_rate.unwrap_or(Self::DEFAULT_BAUD_RATE),
            io_timeout: Self::DEFAULT_IO_TIMEOUT,
            read_timeout: options.read_timeout,
            port: None,
        };

        transport.connect()?;
        Ok(transport)
    }

    /// Current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn connect(&mut self) -> Result<()> {
        debug!("Opening {} at {} baud...", self.port_name, self.baud_rate);

        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(DataBits::Eight)
            .timeout(self.io_timeout)
            .open()
            .map_err(|e| {
                warn!("Could not open the serial device {}: {}", self.port_name, e);
                Error::Serial(e)
            })?;

        // Drop anything left over from a previous session
        port.clear(ClearBuffer::All)?;

        self.port = Some(port);
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::NotOpen)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        port.write_all(data)?;
        port.flush()?;

        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<BytesMut> {
        let read_timeout = self.read_timeout;
        let port = self.port.as_mut().ok_or(Error::NotOpen)?;

        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0;
        let started = Instant::now();

        while filled < len {
            let available = port.bytes_to_read()? as usize;

            if available == 0 {
                if let Some(limit) = read_timeout {
                    if started.elapsed() >= limit {
                        warn!("Read timeout after {:?} ({} of {} bytes)", limit, filled, len);
                        return Err(Error::ReadTimeout {
                            expected: len,
                            received: filled,
                        });
                    }
                }
                thread::sleep(Self::FRAGMENT_DELAY);
                continue;
            }

            let take = available.min(len - filled);
            port.read_exact(&mut buf[filled..filled + take])?;
            filled += take;

            trace!("Read fragment of {} bytes ({}/{})", take, filled, len);
        }

        trace!("Received {} bytes: {:02X?}", len, &buf[..len.min(16)]);

        Ok(buf)
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!("Closed {}", self.port_name);
        }
        Ok(())
    }

    fn reopen(&mut self, baud_rate: u32) -> Result<()> {
        debug!("Reopening {} at {} baud", self.port_name, baud_rate);

        self.close()?;
        self.baud_rate = baud_rate;
        self.connect()
    }

    fn port_name(&self) -> String {
        self.port_name.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_open() {
            debug!("Serial transport {} dropped while still open", self.port_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_open_missing_port() {
        let result = SerialTransport::open("/dev/ttyNOSUCHDEVICE", &TransportOptions::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_serial_defaults() {
        assert_eq!(SerialTransport::DEFAULT_BAUD_RATE, 9600);
        assert_eq!(SerialTransport::FRAGMENT_DELAY, Duration::from_millis(50));
    }

    // Note: This test requires a module on this port
    // #[test]
    // fn test_serial_transport_open() {
    //     let mut transport = SerialTransport::open("/dev/ttyUSB0", &TransportOptions::new()).unwrap();
    //     assert!(transport.is_open());
    //     transport.close().unwrap();
    //     assert!(!transport.is_open());
    // }
}
