//! Linux backend over the SCSI generic driver
//!
//! Opening `/dev/sg*` usually needs `CAP_SYS_RAWIO`.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use super::{CDB_LEN, DEFAULT_TIMEOUT, Direction, SENSE_LEN, vendor_cdb};
use crate::{Transport, TransportKind, TransportOptions, error::*};

/// `SG_IO` ioctl request
const SG_IO: libc::c_ulong = 0x2285;

const SG_INTERFACE_ID: libc::c_int = b'S' as libc::c_int;
const SG_DXFER_TO_DEV: libc::c_int = -2;
const SG_DXFER_FROM_DEV: libc::c_int = -3;
const SG_INFO_OK_MASK: libc::c_uint = 0x1;

/// `struct sg_io_hdr` from `<scsi/sg.h>`
#[repr(C)]
struct SgIoHdr {
    interface_id: libc::c_int,
    dxfer_direction: libc::c_int,
    cmd_len: libc::c_uchar,
    mx_sb_len: libc::c_uchar,
    iovec_count: libc::c_ushort,
    dxfer_len: libc::c_uint,
    dxferp: *mut libc::c_void,
    cmdp: *mut libc::c_uchar,
    sbp: *mut libc::c_uchar,
    timeout: libc::c_uint,
    flags: libc::c_uint,
    pack_id: libc::c_int,
    usr_ptr: *mut libc::c_void,
    status: libc::c_uchar,
    masked_status: libc::c_uchar,
    msg_status: libc::c_uchar,
    sb_len_wr: libc::c_uchar,
    host_status: libc::c_ushort,
    driver_status: libc::c_ushort,
    resid: libc::c_int,
    duration: libc::c_uint,
    info: libc::c_uint,
}

impl Direction {
    fn sg_direction(self) -> libc::c_int {
        match self {
            Self::Read => SG_DXFER_FROM_DEV,
            Self::Write => SG_DXFER_TO_DEV,
        }
    }
}

/// SCSI pass-through transport for GT521F32 modules
pub struct ScsiTransport {
    device_path: String,
    file: Option<File>,
    timeout: Duration,
}

impl ScsiTransport {
    /// Open SCSI generic device
    pub fn open(device_path: impl Into<String>, options: &TransportOptions) -> Result<Self> {
        let device_path = device_path.into();

        debug!("Opening SCSI device {}...", device_path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&device_path)
            .map_err(|e| {
                warn!("Could not open the SCSI device {}: {}", device_path, e);
                Error::Io(e)
            })?;

        Ok(Self {
            device_path,
            file: Some(file),
            timeout: options.read_timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    fn execute(&mut self, direction: Direction, data: &mut [u8]) -> Result<()> {
        let file = self.file.as_ref().ok_or(Error::NotOpen)?;

        let mut cdb = vendor_cdb(direction);
        let mut sense = [0u8; SENSE_LEN];

        let mut hdr = SgIoHdr {
            interface_id: SG_INTERFACE_ID,
            dxfer_direction: direction.sg_direction(),
            cmd_len: CDB_LEN as libc::c_uchar,
            mx_sb_len: SENSE_LEN as libc::c_uchar,
            iovec_count: 0,
            dxfer_len: data.len() as libc::c_uint,
            dxferp: data.as_mut_ptr().cast(),
            cmdp: cdb.as_mut_ptr(),
            sbp: sense.as_mut_ptr(),
            timeout: self.timeout.as_millis().min(libc::c_uint::MAX as u128) as libc::c_uint,
            flags: 0,
            pack_id: 0,
            usr_ptr: ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        };

        // SAFETY: every pointer in `hdr` refers to a live local buffer whose
        // length matches the corresponding length field.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), SG_IO as _, &mut hdr as *mut SgIoHdr) };
        if rc < 0 {
            return Err(Error::Io(io::Error::last_os_error()));
        }

        if hdr.info & SG_INFO_OK_MASK != 0 {
            warn!(
                "SCSI {:?} failed, sense: {:02X?}",
                direction,
                &sense[..(hdr.sb_len_wr as usize).min(SENSE_LEN)]
            );
            return Err(Error::Scsi {
                status: hdr.status,
                host_status: hdr.host_status,
                driver_status: hdr.driver_status,
            });
        }

        if hdr.resid > 0 {
            let requested = data.len();
            return Err(Error::ShortTransfer {
                requested,
                transferred: requested.saturating_sub(hdr.resid as usize),
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
        self.file.is_some()
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
        if self.file.take().is_some() {
            debug!("Closed {}", self.device_path);
        }
        Ok(())
    }

    fn port_name(&self) -> String {
        self.device_path.clone()
    }
}
