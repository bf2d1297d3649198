//! Types for MGEN operations

use std::fmt;

/// Firmware personality currently running on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// Boot loader, 9600 baud
    Boot,
    /// Autoguider application, 250000 baud
    App,
}

/// Firmware version as reported by the boot loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion(pub u16);

impl FirmwareVersion {
    pub fn major(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn minor(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major(), self.minor())
    }
}

/// Keys on the device's front panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Esc = 0x00,
    Set = 0x01,
    Left = 0x02,
    Right = 0x03,
    Up = 0x04,
    Down = 0x05,
}

/// Front panel LED states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedState(pub u8);

impl LedState {
    pub const RA_PLUS: u8 = 0x01;
    pub const RA_MINUS: u8 = 0x02;
    pub const DEC_PLUS: u8 = 0x04;
    pub const DEC_MINUS: u8 = 0x08;
    pub const STATUS_RED: u8 = 0x10;
    pub const STATUS_GREEN: u8 = 0x20;

    pub fn is_ra_plus(&self) -> bool {
        self.0 & Self::RA_PLUS != 0
    }

    pub fn is_ra_minus(&self) -> bool {
        self.0 & Self::RA_MINUS != 0
    }

    pub fn is_dec_plus(&self) -> bool {
        self.0 & Self::DEC_PLUS != 0
    }

    pub fn is_dec_minus(&self) -> bool {
        self.0 & Self::DEC_MINUS != 0
    }

    pub fn is_status_red(&self) -> bool {
        self.0 & Self::STATUS_RED != 0
    }

    pub fn is_status_green(&self) -> bool {
        self.0 & Self::STATUS_GREEN != 0
    }

    /// Any of the four guide output LEDs is lit
    pub fn is_correcting(&self) -> bool {
        self.0 & (Self::RA_PLUS | Self::RA_MINUS | Self::DEC_PLUS | Self::DEC_MINUS) != 0
    }
}

/// Camera settings used for guiding exposures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagingParameters {
    pub gain: u8,
    /// Exposure time in milliseconds
    pub exposure_ms: u16,
    /// Star detection threshold
    pub threshold: u8,
}

/// Outcome of a star search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarSearchResult {
    pub number_of_stars: u8,
}

/// Dither status byte. Bits are distinct states, not a single boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DitherState(pub u8);

impl DitherState {
    /// Bit 4: a dither offset is being applied
    pub const DITHERING: u8 = 0x10;
    /// Bit 6: the next exposure will restart dithering
    pub const RESTART_PENDING: u8 = 0x40;

    pub fn is_dithering(&self) -> bool {
        self.0 & Self::DITHERING != 0
    }

    pub fn is_next_exposure_restart(&self) -> bool {
        self.0 & Self::RESTART_PENDING != 0
    }
}

/// Selects the optional blocks returned by a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryFlags(pub u8);

impl QueryFlags {
    pub const AUTOGUIDING_STATE: u8 = 0x01;
    pub const FRAME_INFO: u8 = 0x02;

    pub fn autoguiding_state() -> Self {
        Self(Self::AUTOGUIDING_STATE)
    }

    pub fn frame_info() -> Self {
        Self(Self::FRAME_INFO)
    }

    pub fn all() -> Self {
        Self(Self::AUTOGUIDING_STATE | Self::FRAME_INFO)
    }

    pub fn has_autoguiding_state(&self) -> bool {
        self.0 & Self::AUTOGUIDING_STATE != 0
    }

    pub fn has_frame_info(&self) -> bool {
        self.0 & Self::FRAME_INFO != 0
    }
}

/// Guide star position and guiding error for one camera frame.
///
/// All values are in 1/256 pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Wrapping frame counter, never zero for a valid frame
    pub frame_index: u8,
    /// Packed as signed 24-bit on the wire, sign-extended here
    pub pos_x: i32,
    /// Packed as signed 24-bit on the wire, sign-extended here
    pub pos_y: i32,
    pub dist_ra: i16,
    pub dist_dec: i16,
}

impl FrameInfo {
    pub const SUBPIXELS: f64 = 256.0;

    pub fn x_pixels(&self) -> f64 {
        self.pos_x as f64 / Self::SUBPIXELS
    }

    pub fn y_pixels(&self) -> f64 {
        self.pos_y as f64 / Self::SUBPIXELS
    }

    pub fn ra_pixels(&self) -> f64 {
        self.dist_ra as f64 / Self::SUBPIXELS
    }

    pub fn dec_pixels(&self) -> f64 {
        self.dist_dec as f64 / Self::SUBPIXELS
    }
}

/// Decoded answer to a query. Blocks not requested are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryResult {
    pub autoguiding: Option<bool>,
    pub frame_info: Option<FrameInfo>,
}

/// Why a calibration run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    Cancelled,
    StarLost,
    FatalPositionError,
    OrientationError,
    Unknown(u8),
}

impl CalibrationError {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => CalibrationError::Cancelled,
            0x02 => CalibrationError::StarLost,
            0x03 => CalibrationError::FatalPositionError,
            0x04 => CalibrationError::OrientationError,
            other => CalibrationError::Unknown(other),
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Cancelled => f.write_str("Calibration was cancelled"),
            CalibrationError::StarLost => f.write_str("Guide star was lost during calibration"),
            CalibrationError::FatalPositionError => {
                f.write_str("Fatal position error: the star did not move as commanded")
            }
            CalibrationError::OrientationError => {
                f.write_str("Orientation error: RA and Dec axes are not perpendicular")
            }
            CalibrationError::Unknown(code) => {
                write!(f, "Unknown calibration error 0x{:02X}", code)
            }
        }
    }
}

/// Progress of a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    NotStarted,
    MeasuringStartPosition,
    MovingDecEliminatingBacklash,
    MeasuringDec,
    MeasuringRA,
    AlmostDone,
    Done,
    Error(CalibrationError),
}

impl CalibrationStatus {
    /// Classify a `(state, error)` pair. State `0xFF` needs the error byte
    /// to tell success from failure.
    pub fn from_bytes(state: u8, error: u8) -> Option<Self> {
        let status = match state {
            0x00 => CalibrationStatus::NotStarted,
            0x01 => CalibrationStatus::MeasuringStartPosition,
            0x02 => CalibrationStatus::MovingDecEliminatingBacklash,
            0x03 => CalibrationStatus::MeasuringDec,
            0x04 => CalibrationStatus::MeasuringRA,
            0x05 => CalibrationStatus::AlmostDone,
            0xFF if error == 0x00 => CalibrationStatus::Done,
            0xFF => CalibrationStatus::Error(CalibrationError::from_code(error)),
            _ => return None,
        };
        Some(status)
    }

    /// Calibration is no longer running
    pub fn is_finished(&self) -> bool {
        matches!(self, CalibrationStatus::Done | CalibrationStatus::Error(_))
    }
}

/// Convert bytes to uppercase hex string
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
