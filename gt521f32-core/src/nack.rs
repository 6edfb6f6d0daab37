//! NACK error catalog

use std::fmt;

/// Error codes carried in the parameter of a NACK response
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NackCode {
    Timeout = 0x1001,
    InvalidBaudRate = 0x1002,
    InvalidPos = 0x1003,
    IsNotUsed = 0x1004,
    IsAlreadyUsed = 0x1005,
    CommErr = 0x1006,
    VerifyFailed = 0x1007,
    IdentifyFailed = 0x1008,
    DbIsFull = 0x1009,
    DbIsEmpty = 0x100A,
    TurnErr = 0x100B,
    BadFinger = 0x100C,
    EnrollFailed = 0x100D,
    IsNotSupported = 0x100E,
    DevErr = 0x100F,
    CaptureCanceled = 0x1010,
    InvalidParam = 0x1011,
    FingerIsNotPressed = 0x1012,
}

impl NackCode {
    /// Look up a NACK parameter in the catalog
    pub fn from_parameter(parameter: u32) -> Option<Self> {
        let code = u16::try_from(parameter).ok()?;
        Self::try_from(code).ok()
    }

    /// Get error name
    pub fn name(self) -> &'static str {
        match self {
            Self::Timeout => "NACK_TIMEOUT",
            Self::InvalidBaudRate => "NACK_INVALID_BAUDRATE",
            Self::InvalidPos => "NACK_INVALID_POS",
            Self::IsNotUsed => "NACK_IS_NOT_USED",
            Self::IsAlreadyUsed => "NACK_IS_ALREADY_USED",
            Self::CommErr => "NACK_COMM_ERR",
            Self::VerifyFailed => "NACK_VERIFY_FAILED",
            Self::IdentifyFailed => "NACK_IDENTIFY_FAILED",
            Self::DbIsFull => "NACK_DB_IS_FULL",
            Self::DbIsEmpty => "NACK_DB_IS_EMPTY",
            Self::TurnErr => "NACK_TURN_ERR",
            Self::BadFinger => "NACK_BAD_FINGER",
            Self::EnrollFailed => "NACK_ENROLL_FAILED",
            Self::IsNotSupported => "NACK_IS_NOT_SUPPORTED",
            Self::DevErr => "NACK_DEV_ERR",
            Self::CaptureCanceled => "NACK_CAPTURE_CANCELED",
            Self::InvalidParam => "NACK_INVALID_PARAM",
            Self::FingerIsNotPressed => "NACK_FINGER_IS_NOT_PRESSED",
        }
    }
}

impl TryFrom<u16> for NackCode {
    type Error = u16;

    fn try_from(value: u16) -> std::result::Result<Self, u16> {
        match value {
            0x1001 => Ok(Self::Timeout),
            0x1002 => Ok(Self::InvalidBaudRate),
            0x1003 => Ok(Self::InvalidPos),
            0x1004 => Ok(Self::IsNotUsed),
            0x1005 => Ok(Self::IsAlreadyUsed),
            0x1006 => Ok(Self::CommErr),
            0x1007 => Ok(Self::VerifyFailed),
            0x1008 => Ok(Self::IdentifyFailed),
            0x1009 => Ok(Self::DbIsFull),
            0x100A => Ok(Self::DbIsEmpty),
            0x100B => Ok(Self::TurnErr),
            0x100C => Ok(Self::BadFinger),
            0x100D => Ok(Self::EnrollFailed),
            0x100E => Ok(Self::IsNotSupported),
            0x100F => Ok(Self::DevErr),
            0x1010 => Ok(Self::CaptureCanceled),
            0x1011 => Ok(Self::InvalidParam),
            0x1012 => Ok(Self::FingerIsNotPressed),
            other => Err(other),
        }
    }
}

impl From<NackCode> for u16 {
    fn from(code: NackCode) -> u16 {
        code as u16
    }
}

impl fmt::Display for NackCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name(), *self as u16)
    }
}
