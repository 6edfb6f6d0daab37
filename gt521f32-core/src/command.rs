//! GT521F32 command definitions

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// All commands from the GT521Fxx programming manual.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    // Session
    Open = 0x01,
    Close = 0x02,
    UsbInternalCheck = 0x03,
    ChangeBaudRate = 0x04,
    ModuleInfo = 0x06,

    // Sensor
    CmosLed = 0x12,

    // Enrollment
    EnrollCount = 0x20,
    CheckEnrolled = 0x21,
    EnrollStart = 0x22,
    Enroll1 = 0x23,
    Enroll2 = 0x24,
    Enroll3 = 0x25,
    IsPressFinger = 0x26,

    // Database
    DeleteId = 0x40,
    DeleteAll = 0x41,

    // Matching
    Verify = 0x50,
    Identify = 0x51,
    VerifyTemplate = 0x52,
    IdentifyTemplate = 0x53,

    // Imaging
    Capture = 0x60,
    MakeTemplate = 0x61,
    GetImage = 0x62,
    GetRawImage = 0x63,

    // Templates
    GetTemplate = 0x70,
    SetTemplate = 0x71,
    GetDatabaseStart = 0x72,
    GetDatabaseEnd = 0x73,

    // Maintenance
    FwUpdate = 0x80,
    IsoUpdate = 0x81,
    FakeDetector = 0x91,
    SetSecurityLevel = 0xF0,
    GetSecurityLevel = 0xF1,
    IdentifyTemplate2 = 0xF4,
    StandbyMode = 0xF9,
}

impl Command {
    /// Every command in the catalog
    pub const ALL: [Command; 34] = [
        Self::Open,
        Self::Close,
        Self::UsbInternalCheck,
        Self::ChangeBaudRate,
        Self::ModuleInfo,
        Self::CmosLed,
        Self::EnrollCount,
        Self::CheckEnrolled,
        Self::EnrollStart,
        Self::Enroll1,
        Self::Enroll2,
        Self::Enroll3,
        Self::IsPressFinger,
        Self::DeleteId,
        Self::DeleteAll,
        Self::Verify,
        Self::Identify,
        Self::VerifyTemplate,
        Self::IdentifyTemplate,
        Self::Capture,
        Self::MakeTemplate,
        Self::GetImage,
        Self::GetRawImage,
        Self::GetTemplate,
        Self::SetTemplate,
        Self::GetDatabaseStart,
        Self::GetDatabaseEnd,
        Self::FwUpdate,
        Self::IsoUpdate,
        Self::FakeDetector,
        Self::SetSecurityLevel,
        Self::GetSecurityLevel,
        Self::IdentifyTemplate2,
        Self::StandbyMode,
    ];

    /// Enrollment command for step `n` (1..=3)
    pub fn enroll_step(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Enroll1),
            2 => Some(Self::Enroll2),
            3 => Some(Self::Enroll3),
            _ => None,
        }
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::UsbInternalCheck => "USB_INTERNAL_CHECK",
            Self::ChangeBaudRate => "CHANGE_BAUDRATE",
            Self::ModuleInfo => "MODULE_INFO",
            Self::CmosLed => "CMOS_LED",
            Self::EnrollCount => "ENROLL_COUNT",
            Self::CheckEnrolled => "CHECK_ENROLLED",
            Self::EnrollStart => "ENROLL_START",
            Self::Enroll1 => "ENROLL1",
            Self::Enroll2 => "ENROLL2",
            Self::Enroll3 => "ENROLL3",
            Self::IsPressFinger => "IS_PRESS_FINGER",
            Self::DeleteId => "DELETE_ID",
            Self::DeleteAll => "DELETE_ALL",
            Self::Verify => "VERIFY",
            Self::Identify => "IDENTIFY",
            Self::VerifyTemplate => "VERIFY_TEMPLATE",
            Self::IdentifyTemplate => "IDENTIFY_TEMPLATE",
            Self::Capture => "CAPTURE",
            Self::MakeTemplate => "MAKE_TEMPLATE",
            Self::GetImage => "GET_IMAGE",
            Self::GetRawImage => "GET_RAWIMAGE",
            Self::GetTemplate => "GET_TEMPLATE",
            Self::SetTemplate => "SET_TEMPLATE",
            Self::GetDatabaseStart => "GET_DATABASE_START",
            Self::GetDatabaseEnd => "GET_DATABASE_END",
            Self::FwUpdate => "FW_UPDATE",
            Self::IsoUpdate => "ISO_UPDATE",
            Self::FakeDetector => "FAKE_DETECTOR",
            Self::SetSecurityLevel => "SET_SECURITY_LEVEL",
            Self::GetSecurityLevel => "GET_SECURITY_LEVEL",
            Self::IdentifyTemplate2 => "IDENTIFY_TEMPLATE_2",
            Self::StandbyMode => "STANDBY_MODE",
        }
    }
}

impl From<Command> for u16 {
    fn from(cmd: Command) -> u16 {
        cmd as u16
    }
}

impl TryFrom<u16> for Command {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| *cmd as u16 == value)
            .ok_or(Error::UnknownCommandCode(value))
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.name() == name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u16)
    }
}
