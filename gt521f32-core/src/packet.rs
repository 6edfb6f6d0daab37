//! GT521F32 frame structure and encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::warn;

use crate::{
    checksum,
    command::Command,
    constants::{ACK, COMMAND_START_CODE, DATA_START_CODE, DEVICE_ID},
    error::{DeviceError, Error, Result},
};

/// Size of the trailing checksum
pub const CHECKSUM_SIZE: usize = 2;

/// Frame header shared by every packet
///
/// ```text
/// ┌──────────────┬─────────────┐
/// │  Start code  │  Device ID  │
/// │   2 bytes    │   2 bytes   │
/// │ (0x55 0xAA)  │  (LE u16)   │
/// └──────────────┴─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Two start bytes
    pub start_code: [u8; 2],

    /// Device id, always 1 in this protocol generation
    pub device_id: u16,
}

impl Header {
    /// Header size in bytes
    pub const SIZE: usize = 4;

    fn put(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.start_code);
        buf.put_u16_le(self.device_id);
    }

    fn get(body: &mut &[u8], accepted: &[[u8; 2]]) -> Result<Self> {
        let start_code = [body.get_u8(), body.get_u8()];
        if !accepted.contains(&start_code) {
            return Err(Error::BadStartCode(start_code));
        }

        Ok(Self {
            start_code,
            device_id: body.get_u16_le(),
        })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            start_code: COMMAND_START_CODE,
            device_id: DEVICE_ID,
        }
    }
}

/// Append the checksum of everything written so far
fn seal(buf: &mut BytesMut) {
    let checksum = checksum::calculate(buf);
    buf.put_u16_le(checksum);
}

/// Validate length and checksum, returning the frame without its checksum
fn unseal(buf: &[u8], size: usize) -> Result<&[u8]> {
    if buf.len() < size {
        return Err(Error::Truncated {
            expected: size,
            actual: buf.len(),
        });
    }

    if buf.len() > size {
        warn!("Ignoring {} extra bytes after frame", buf.len() - size);
    }

    let (body, tail) = buf[..size].split_at(size - CHECKSUM_SIZE);
    let received = u16::from_le_bytes([tail[0], tail[1]]);

    if !checksum::verify(body, received) {
        return Err(Error::ChecksumMismatch {
            expected: checksum::calculate(body),
            received,
        });
    }

    Ok(body)
}

/// Command frame (host to device)
///
/// ```text
/// ┌──────────┬─────────────┬─────────────┬─────────────┐
/// │  Header  │  Parameter  │   Command   │  Checksum   │
/// │ 4 bytes  │   4 bytes   │   2 bytes   │   2 bytes   │
/// │          │  (LE u32)   │  (LE u16)   │  (LE u16)   │
/// └──────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// # Examples
///
/// ```
/// use gt521f32_core::{Command, CommandPacket};
///
/// let packet = CommandPacket::new(Command::Open, 1);
/// let encoded = packet.encode();
/// assert_eq!(encoded.len(), CommandPacket::SIZE);
///
/// let decoded = CommandPacket::decode(&encoded).unwrap();
/// assert_eq!(decoded.command(), Some(Command::Open));
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CommandPacket {
    pub header: Header,

    /// Command-specific parameter
    pub parameter: u32,

    /// Raw command code
    pub code: u16,
}

impl CommandPacket {
    /// Frame size in bytes
    pub const SIZE: usize = Header::SIZE + 4 + 2 + CHECKSUM_SIZE;

    pub fn new(command: Command, parameter: u32) -> Self {
        Self {
            header: Header::default(),
            parameter,
            code: command.into(),
        }
    }

    /// Command, if the code is in the catalog
    pub fn command(&self) -> Option<Command> {
        Command::try_from(self.code).ok()
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        self.header.put(&mut buf);
        buf.put_u32_le(self.parameter);
        buf.put_u16_le(self.code);
        seal(&mut buf);

        buf
    }

    /// Decode packet from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than [`CommandPacket::SIZE`]
    /// - Checksum verification fails
    /// - Start code is not `0x55 0xAA`
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut body = unseal(buf, Self::SIZE)?;

        Ok(Self {
            header: Header::get(&mut body, &[COMMAND_START_CODE])?,
            parameter: body.get_u32_le(),
            code: body.get_u16_le(),
        })
    }
}

impl fmt::Debug for CommandPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("CommandPacket");
        match self.command() {
            Some(command) => debug.field("command", &command),
            None => debug.field("code", &format!("0x{:04X}", self.code)),
        };
        debug
            .field("parameter", &format!("0x{:08X}", self.parameter))
            .finish()
    }
}

/// Response frame (device to host)
///
/// Same layout as [`CommandPacket`], with the command code replaced by
/// [`ACK`](crate::constants::ACK) or [`NACK`](crate::constants::NACK).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ResponsePacket {
    pub header: Header,

    /// Output parameter on ACK, error code on NACK
    pub parameter: u32,

    /// Response code
    pub response: u16,
}

impl ResponsePacket {
    /// Frame size in bytes
    pub const SIZE: usize = Header::SIZE + 4 + 2 + CHECKSUM_SIZE;

    pub fn new(response: u16, parameter: u32) -> Self {
        Self {
            header: Header::default(),
            parameter,
            response,
        }
    }

    /// Create an ACK response
    pub fn ack(parameter: u32) -> Self {
        Self::new(ACK, parameter)
    }

    /// Create a NACK response
    pub fn nack(error: u32) -> Self {
        Self::new(crate::constants::NACK, error)
    }

    /// Check if the device acknowledged the command
    pub fn is_ack(&self) -> bool {
        self.response == ACK
    }

    /// Interpret the response to `command`
    ///
    /// Yields the output parameter on ACK and a [`DeviceError`] otherwise.
    pub fn check(&self, command: Command) -> std::result::Result<u32, DeviceError> {
        if self.is_ack() {
            Ok(self.parameter)
        } else {
            Err(DeviceError::new(command, self.parameter))
        }
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        self.header.put(&mut buf);
        buf.put_u32_le(self.parameter);
        buf.put_u16_le(self.response);
        seal(&mut buf);

        buf
    }

    /// Decode packet from bytes
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut body = unseal(buf, Self::SIZE)?;

        Ok(Self {
            header: Header::get(&mut body, &[COMMAND_START_CODE])?,
            parameter: body.get_u32_le(),
            response: body.get_u16_le(),
        })
    }
}

impl fmt::Debug for ResponsePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsePacket")
            .field("ack", &self.is_ack())
            .field("response", &format!("0x{:02X}", self.response))
            .field("parameter", &format!("0x{:08X}", self.parameter))
            .finish()
    }
}

/// Data frame (device to host, following selected responses)
///
/// ```text
/// ┌──────────┬─────────────┬─────────────┐
/// │  Header  │   Payload   │  Checksum   │
/// │ 4 bytes  │   N bytes   │   2 bytes   │
/// └──────────┴─────────────┴─────────────┘
/// ```
///
/// The payload size is not on the wire; it is implied by the command
/// that triggered the frame.
#[derive(Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub header: Header,

    /// Frame payload
    pub payload: Bytes,
}

impl DataPacket {
    /// Header plus checksum
    pub const OVERHEAD: usize = Header::SIZE + CHECKSUM_SIZE;

    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            header: Header::default(),
            payload: payload.into(),
        }
    }

    /// Frame size for a payload of `payload_len` bytes
    pub fn size(payload_len: usize) -> usize {
        payload_len + Self::OVERHEAD
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(Self::size(self.payload.len()));

        self.header.put(&mut buf);
        buf.put_slice(&self.payload);
        seal(&mut buf);

        buf
    }

    /// Decode a frame carrying `payload_len` bytes of payload
    ///
    /// Both the command start code and the data start code are accepted.
    pub fn decode(buf: &[u8], payload_len: usize) -> Result<Self> {
        let mut body = unseal(buf, Self::size(payload_len))?;
        let header = Header::get(&mut body, &[COMMAND_START_CODE, DATA_START_CODE])?;

        Ok(Self {
            header,
            payload: Bytes::copy_from_slice(body),
        })
    }
}

impl fmt::Debug for DataPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPacket")
            .field("start_code", &format!("{:02X?}", self.header.start_code))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
