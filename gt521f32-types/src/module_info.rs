//! Module information structures

use std::fmt;

/// Sensor and engine parameters reported by MODULE_INFO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub sensor: String,
    pub engine_version: String,
    pub raw_image_width: u16,
    pub raw_image_height: u16,
    pub image_width: u16,
    pub image_height: u16,
    pub max_record_count: u16,
    pub enroll_count: u16,
    pub template_size: u16,
}

impl fmt::Display for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module[{} engine {}, raw {}x{}, image {}x{}, {}/{} records, template {} bytes]",
            self.sensor,
            self.engine_version,
            self.raw_image_width,
            self.raw_image_height,
            self.image_width,
            self.image_height,
            self.enroll_count,
            self.max_record_count,
            self.template_size
        )
    }
}
