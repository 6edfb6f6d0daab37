//! Device configuration

use std::path::PathBuf;
use std::time::Duration;

use gt521f32_core::constants::{DEFAULT_BAUD_RATE, MAX_RETRIES, PROMPT_INTERVAL_MS};

/// Behaviour of a [`Device`](crate::Device) above the wire protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Pause between finger press polls
    pub prompt_interval: Duration,

    /// Attempts per enrollment step
    pub enroll_attempts: usize,

    /// Directory enrollment captures are saved to
    pub image_dir: PathBuf,

    /// Baud rate restored when the device is closed
    pub reset_baud_rate: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            prompt_interval: Duration::from_millis(PROMPT_INTERVAL_MS),
            enroll_attempts: MAX_RETRIES,
            image_dir: PathBuf::from("."),
            reset_baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}
