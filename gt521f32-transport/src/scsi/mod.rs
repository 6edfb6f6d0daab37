//! SCSI pass-through transport
//!
//! In USB mode the module enumerates as a mass-storage device. Frames are
//! carried by a vendor command: CDB byte 0 is `0xEF`, byte 1 selects the
//! direction (`0xFF` read, `0xFE` write).
//!
//! Linux drives `/dev/sg*` through `SG_IO`, Windows drives a drive letter
//! through `IOCTL_SCSI_PASS_THROUGH_DIRECT`.

use std::time::Duration;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::ScsiTransport;
#[cfg(windows)]
pub use windows::ScsiTransport;

const CDB_LEN: usize = 16;
const SENSE_LEN: usize = 32;

const VENDOR_OPCODE: u8 = 0xEF;

/// Timeout of a single SCSI command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

impl Direction {
    fn cdb_byte(self) -> u8 {
        match self {
            Self::Read => 0xFF,
            Self::Write => 0xFE,
        }
    }
}

/// Vendor CDB for one transfer
fn vendor_cdb(direction: Direction) -> [u8; CDB_LEN] {
    let mut cdb = [0u8; CDB_LEN];
    cdb[0] = VENDOR_OPCODE;
    cdb[1] = direction.cdb_byte();
    cdb
}
