//! Protocol constants

/// Start code of command and response frames
pub const COMMAND_START_CODE: [u8; 2] = [0x55, 0xAA];

/// Start code the manual assigns to data frames
///
/// Devices observed so far answer with [`COMMAND_START_CODE`] instead, so
/// this one is only accepted on decode, never emitted.
pub const DATA_START_CODE: [u8; 2] = [0x5A, 0xA5];

/// Device id, fixed in this protocol generation
pub const DEVICE_ID: u16 = 0x0001;

/// Acknowledge response code
pub const ACK: u16 = 0x30;

/// Negative acknowledge response code
pub const NACK: u16 = 0x31;

/// Baud rate the module boots with
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Maximum attempts per enrollment step
pub const MAX_RETRIES: usize = 3;

/// Number of captures needed to enroll a user
pub const ENROLL_STEPS: u8 = 3;

/// Interval between finger press polls (milliseconds)
pub const PROMPT_INTERVAL_MS: u64 = 100;

/// Image geometry reported by GET_IMAGE
pub mod image {
    /// Width in pixels
    pub const WIDTH: usize = 202;

    /// Height in pixels
    pub const HEIGHT: usize = 258;

    /// Payload size in bytes
    pub const SIZE: usize = WIDTH * HEIGHT;
}

/// Image geometry reported by GET_RAWIMAGE
pub mod raw_image {
    /// Width in pixels
    pub const WIDTH: usize = 160;

    /// Height in pixels
    pub const HEIGHT: usize = 120;

    /// Payload size in bytes
    pub const SIZE: usize = WIDTH * HEIGHT;
}
