//! # gt521f32
//!
//! Host driver for GT521F32 optical fingerprint modules.
//!
//! ## Features
//!
//! - Serial and SCSI pass-through (USB mass-storage mode) transports
//! - Typed frames with checksums verified on every decode
//! - Finger prompts that can be cancelled from another thread
//! - Three-step enrollment with bounded retries
//! - Image download and BMP export
//!
//! ## Quick Start
//!
//! ```no_run
//! use gt521f32::Device;
//!
//! fn main() -> gt521f32::Result<()> {
//!     // Connect to device
//!     let mut device = Device::new("/dev/ttyUSB0")?;
//!     let info = device.open()?;
//!     println!("{}", info);
//!
//!     // Enroll a finger under id 7
//!     let outcome = device.enroll_user(7, false)?;
//!     println!("Enrolled: {}", outcome.is_success());
//!
//!     // Dropping the device closes it
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod device;
pub mod enroll;
pub mod error;
pub mod prompt;
pub mod retry;

// Re-exports
pub use channel::CommandChannel;
pub use config::DeviceConfig;
pub use device::Device;
pub use enroll::{EnrollOutcome, EnrollStepOutcome};
pub use error::{Error, Result};
pub use prompt::{FingerPrompt, PromptOutcome, PromptState};
pub use retry::{RetryOutcome, RetryPolicy, Verdict};

// Re-export types
pub use gt521f32_core::{Command, DeviceError, NackCode, ResponsePacket, Session};
pub use gt521f32_transport::{ConfigError, Transport, TransportKind, TransportOptions};
pub use gt521f32_types::{DeviceInfo, FingerprintImage, ModuleInfo};
