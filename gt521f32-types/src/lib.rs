//! Type definitions for gt521f32

pub mod device_info;
pub mod error;
pub mod image;
pub mod module_info;

pub use device_info::DeviceInfo;
pub use error::{Error, Result};
pub use image::FingerprintImage;
pub use module_info::ModuleInfo;
