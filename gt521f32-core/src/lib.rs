//! # gt521f32-core
//!
//! Core protocol implementation for GT521F32 fingerprint modules.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Command and NACK catalogs
//! - Data frame payloads
//! - Session state and cooperative cancellation

pub mod checksum;
pub mod command;
pub mod constants;
pub mod data;
pub mod error;
pub mod nack;
pub mod packet;
pub mod session;

pub use command::Command;
pub use data::{DataPayload, ImageData, ModuleInfoData, OpenData, RawImageData};
pub use error::{DeviceError, Error, Result};
pub use nack::NackCode;
pub use packet::{CommandPacket, DataPacket, Header, ResponsePacket};
pub use session::{Session, SessionState};
