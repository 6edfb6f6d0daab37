//! Windows backend over `IOCTL_SCSI_PASS_THROUGH_DIRECT`
//!
//! The module shows up as a removable or CD-ROM drive; the port is its
//! drive letter (`E:`).

use std::ffi::c_void;
use std::io;
use std::mem;
use std::ptr;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};
use windows_sys::Win32::Foundation::{
    CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, GetDriveTypeW,
    OPEN_EXISTING,
};
use windows_sys::Win32::System::IO::DeviceIoControl;

use super::{CDB_LEN, DEFAULT_TIMEOUT, Direction, SENSE_LEN, vendor_cdb};
use crate::{Transport, TransportKind, TransportOptions, error::*};

/// `CTL_CODE(IOCTL_SCSI_BASE, 0x0405, METHOD_BUFFERED, FILE_READ_ACCESS | FILE_WRITE_ACCESS)`
const IOCTL_SCSI_PASS_THROUGH_DIRECT: u32 = 0x0004_D014;

const DRIVE_REMOVABLE: u32 = 2;
const DRIVE_CDROM: u32 = 5;

const SCSI_IOCTL_DATA_OUT: u8 = 0;
const SCSI_IOCTL_DATA_IN: u8 = 1;

/// The vendor command is a 10-byte CDB
const VENDOR_CDB_LEN: u8 = 10;

/// `SCSI_PASS_THROUGH_DIRECT` from `<ntddscsi.h>`
#[repr(C)]
struct ScsiPassThroughDirect {
    length: u16,
    scsi_status: u8,
    path_id: u8,
    target_id: u8,
    lun: u8,
    cdb_length: u8,
    sense_info_length: u8,
    data_in: u8,
    data_transfer_length: u32,
    timeout_value: u32,
    data_buffer: *mut c_void,
    sense_info_offset: u32,
    cdb: [u8; CDB_LEN],
}

/// Request followed by room for sense data
#[repr(C)]
struct PassThroughRequest {
    sptd: ScsiPassThroughDirect,
    filler: u32,
    sense: [u8; SENSE_LEN],
}

impl PassThroughRequest {
    fn new(direction: Direction, data: &mut [u8], timeout: Duration) -> Self {
        Self {
            sptd: ScsiPassThroughDirect {
                length: mem::size_of::<ScsiPassThroughDirect>() as u16,
                scsi_status: 0,
                path_id: 0,
                target_id: 1,
                lun: 0,
                cdb_length: VENDOR_CDB_LEN,
                sense_info_length: 0,
                data_in: match direction {
                    Direction::Read => SCSI_IOCTL_DATA_IN,
                    Direction::Write => SCSI_IOCTL_DATA_OUT,
                },
                data_transfer_length: data.len() as u32,
                timeout_value: timeout.as_secs().clamp(1, u64::from(u32::MAX)) as u32,
                data_buffer: data.as_mut_ptr().cast(),
                sense_info_offset: mem::offset_of!(PassThroughRequest, sense) as u32,
                cdb: vendor_cdb(direction),
            },
            filler: 0,
            sense: [0u8; SENSE_LEN],
        }
    }
}

/// Owned drive handle, closed on drop
struct DriveHandle(HANDLE);

// SAFETY: the handle is owned by exactly one transport and only used
// through `&mut self`.
unsafe impl Send for DriveHandle {}

impl Drop for DriveHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful CreateFileW and is
        // closed exactly once.
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

/// SCSI pass-through transport for GT521F32 modules
pub struct ScsiTransport {
    drive: String,
    handle: Option<DriveHandle>,
    timeout: Duration,
}

impl ScsiTransport {
    /// Open the drive `drive` (such as `E:`)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The drive is neither removable nor a CD-ROM
    /// - The drive cannot be opened for read and write
    pub fn open(drive: impl Into<String>, options: &TransportOptions) -> Result<Self> {
        let drive = drive.into();

        debug!("Opening SCSI drive {}...", drive);

        let root = wide(&format!("{}\\", drive));
        // SAFETY: `root` is a NUL-terminated UTF-16 string that outlives the call.
        let drive_type = unsafe { GetDriveTypeW(root.as_ptr()) };
        if !matches!(drive_type, DRIVE_REMOVABLE | DRIVE_CDROM) {
            warn!("{} has drive type {}, not a sensor", drive, drive_type);
            return Err(Error::Unsupported(format!(
                "{} is not a removable or CD-ROM drive",
                drive
            )));
        }

        let path = wide(&format!("\\\\.\\{}", drive));
        // SAFETY: `path` is a NUL-terminated UTF-16 string; the remaining
        // arguments are plain flags or null.
        let handle = unsafe {
            CreateFileW(
                path.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            let e = io::Error::last_os_error();
            warn!("Could not open the SCSI drive {}: {}", drive, e);
            return Err(Error::Io(e));
        }

        Ok(Self {
            drive,
            handle: Some(DriveHandle(handle)),
            timeout: options.read_timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    fn execute(&mut self, direction: Direction, data: &mut [u8]) -> Result<()> {
        let handle = self.handle.as_ref().ok_or(Error::NotOpen)?;

        let requested = data.len();
        let mut request = PassThroughRequest::new(direction, data, self.timeout);
        let size = mem::size_of::<PassThroughRequest>() as u32;
        let mut returned = 0u32;
        let request_ptr: *mut c_void = (&mut request as *mut PassThroughRequest).cast();

        // SAFETY: `request` and the data buffer it points to stay alive for
        // the whole synchronous call; both buffer sizes match `size`.
        let ok = unsafe {
            DeviceIoControl(
                handle.0,
                IOCTL_SCSI_PASS_THROUGH_DIRECT,
                request_ptr,
                size,
                request_ptr,
                size,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        if (returned as usize) < mem::offset_of!(ScsiPassThroughDirect, scsi_status) + 1 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "not enough SCSI status returned",
            )));
        }

        if request.sptd.scsi_status != 0 {
            warn!(
                "SCSI {:?} failed, sense: {:02X?}",
                direction,
                &request.sense[..]
            );
            return Err(Error::Scsi {
                status: request.sptd.scsi_status,
                host_status: 0,
                driver_status: 0,
            });
        }

        let transferred = request.sptd.data_transfer_length as usize;
        if transferred < requested {
            return Err(Error::ShortTransfer {
                requested,
                transferred,
            });
        }

        Ok(())
    }
}

impl Transport for ScsiTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::BlockPassthrough
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        trace!("Sending {} bytes via SCSI: {:02X?}", data.len(), &data[..data.len().min(16)]);

        let mut out = data.to_vec();
        self.execute(Direction::Write, &mut out)
    }

    fn read(&mut self, len: usize) -> Result<BytesMut> {
        let mut buf = BytesMut::zeroed(len);
        self.execute(Direction::Read, &mut buf)?;

        trace!("Received {} bytes via SCSI: {:02X?}", len, &buf[..len.min(16)]);

        Ok(buf)
    }

    fn close(&mut self) -> Result<()> {
        if self.handle.take().is_some() {
            debug!("Closed {}", self.drive);
        }
        Ok(())
    }

    fn port_name(&self) -> String {
        self.drive.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        if cfg!(target_pointer_width = "64") {
            assert_eq!(mem::size_of::<ScsiPassThroughDirect>(), 56);
            assert_eq!(mem::offset_of!(PassThroughRequest, sense), 60);
        }
    }

    #[test]
    fn test_request_fields() {
        let mut data = [0u8; 12];
        let request = PassThroughRequest::new(Direction::Read, &mut data, DEFAULT_TIMEOUT);

        assert_eq!(request.sptd.data_in, SCSI_IOCTL_DATA_IN);
        assert_eq!(request.sptd.data_transfer_length, 12);
        assert_eq!(request.sptd.timeout_value, 10);
        assert_eq!(request.sptd.cdb_length, 10);
        assert_eq!(&request.sptd.cdb[..2], &[0xEF, 0xFF]);
    }

    #[test]
    fn test_open_missing_drive_rejected() {
        // Drive letters that do not exist report DRIVE_NO_ROOT_DIR
        let result = ScsiTransport::open("#:", &TransportOptions::new());
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_closed_read() {
        let mut transport = ScsiTransport {
            drive: "E:".into(),
            handle: None,
            timeout: DEFAULT_TIMEOUT,
        };

        assert!(matches!(transport.read(12), Err(Error::NotOpen)));
    }
}
