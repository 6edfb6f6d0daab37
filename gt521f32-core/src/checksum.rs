//! GT521F32 frame checksum
//!
//! Every frame ends with a 16-bit little-endian checksum: the plain sum of
//! all preceding bytes, truncated to 16 bits.

use tracing::trace;

/// Calculate the checksum over `bytes`
///
/// # Examples
///
/// ```
/// use gt521f32_core::checksum;
///
/// // OPEN(1) command frame without its checksum
/// let frame = [0x55, 0xAA, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00];
/// assert_eq!(checksum::calculate(&frame), 0x0102);
/// ```
pub fn calculate(bytes: &[u8]) -> u16 {
    let checksum = bytes
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(byte as u16));

    trace!(
        len = bytes.len(),
        checksum = format!("0x{:04X}", checksum),
        "Calculated checksum"
    );

    checksum
}

/// Verify checksum
pub fn verify(bytes: &[u8], expected: u16) -> bool {
    calculate(bytes) == expected
}
