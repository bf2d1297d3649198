//! Autoguiding on/off and the target guide star position.

use std::time::Duration;

use super::{Command, DEFAULT_TIMEOUT, GUIDING_FUNCTION, ResponseRead, status_command};
use crate::codec::encode_i24_le;
use crate::error::{DeviceError, MgenError};
use crate::types::FrameInfo;

const START_AUTOGUIDING: u8 = 0x01;
const STOP_AUTOGUIDING: u8 = 0x02;
const SET_GUIDING_POSITION: u8 = 0x10;

status_command! {
    StartAutoGuidingCommand {
        code: GUIDING_FUNCTION,
        sub_code: START_AUTOGUIDING,
        timeout: Duration::from_secs(2),
        errors: [
            (0xF0, UiLocked),
            (0xF1, AnotherCommandInProgress),
            (0xF2, CameraIsOff),
            (0xF3, AutoGuidingActive),
        ],
    }
}

status_command! {
    StopAutoGuidingCommand {
        code: GUIDING_FUNCTION,
        sub_code: STOP_AUTOGUIDING,
        timeout: DEFAULT_TIMEOUT,
        errors: [
            (0xF0, UiLocked),
            (0xF1, AnotherCommandInProgress),
        ],
    }
}

/// Move the point the guide star is held at.
///
/// Coordinates are sensor pixels; the device works in 1/256 pixel packed
/// into signed 24-bit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetGuidingPositionCommand {
    x: [u8; 3],
    y: [u8; 3],
}

impl SetGuidingPositionCommand {
    pub fn new(x_pixels: f64, y_pixels: f64) -> Result<Self, MgenError> {
        Ok(Self {
            x: Self::encode_axis("x", x_pixels)?,
            y: Self::encode_axis("y", y_pixels)?,
        })
    }

    fn encode_axis(name: &str, pixels: f64) -> Result<[u8; 3], MgenError> {
        let subpixels = (pixels * FrameInfo::SUBPIXELS).round();
        if !subpixels.is_finite() || subpixels < i32::MIN as f64 || subpixels > i32::MAX as f64 {
            return Err(MgenError::InvalidParameter(format!(
                "guiding position {} is not representable: {}",
                name, pixels
            )));
        }
        encode_i24_le(subpixels as i32).ok_or_else(|| {
            MgenError::InvalidParameter(format!(
                "guiding position {} out of range: {} pixels",
                name, pixels
            ))
        })
    }
}

impl Command for SetGuidingPositionCommand {
    type Output = ();

    fn code(&self) -> u8 {
        GUIDING_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(SET_GUIDING_POSITION)
    }

    fn payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(6);
        payload.extend_from_slice(&self.x);
        payload.extend_from_slice(&self.y);
        payload
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF1, DeviceError::AnotherCommandInProgress),
            (0xF2, DeviceError::CameraIsOff),
            (0xF3, DeviceError::CannotDoFunctions),
        ]
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<(), MgenError> {
        self.read_status(response)
    }
}
