//! Device information structures

use std::fmt;

/// Metadata reported when a session is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Firmware version, bare hex (e.g. `"121"`)
    pub firmware_version: String,

    /// Maximum size of the ISO area
    pub iso_area_max_size: u32,

    /// Device serial number, 32 upper-case hex digits
    pub serial_number: String,
}

impl DeviceInfo {
    pub fn new(firmware_version: String, iso_area_max_size: u32, serial_number: String) -> Self {
        Self {
            firmware_version,
            iso_area_max_size,
            serial_number,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[SN: {}, FW: {}, ISO area: {}]",
            self.serial_number, self.firmware_version, self.iso_area_max_size
        )
    }
}
