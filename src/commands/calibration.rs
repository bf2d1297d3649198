//! Guiding calibration.
//!
//! Calibration runs on the device for tens of seconds. Start it, then poll
//! [`QueryCalibrationCommand`] until the status is finished.

use std::time::Duration;

use super::{CALIBRATION_FUNCTION, Command, DEFAULT_TIMEOUT, ResponseRead, status_command};
use crate::error::{DeviceError, MgenError};
use crate::types::CalibrationStatus;

const START_CALIBRATION: u8 = 0x01;
const CANCEL_CALIBRATION: u8 = 0x02;
const QUERY_CALIBRATION: u8 = 0x03;

status_command! {
    StartCalibrationCommand {
        code: CALIBRATION_FUNCTION,
        sub_code: START_CALIBRATION,
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
    CancelCalibrationCommand {
        code: CALIBRATION_FUNCTION,
        sub_code: CANCEL_CALIBRATION,
        timeout: DEFAULT_TIMEOUT,
        errors: [
            (0xF0, UiLocked),
            (0xF3, CannotDoFunctions),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryCalibrationCommand;

impl QueryCalibrationCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for QueryCalibrationCommand {
    type Output = CalibrationStatus;

    fn code(&self) -> u8 {
        CALIBRATION_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(QUERY_CALIBRATION)
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[(0x99, DeviceError::CannotDoFunctions)]
    }

    fn read_response<R: ResponseRead>(
        &self,
        response: &mut R,
    ) -> Result<CalibrationStatus, MgenError> {
        self.read_status(response)?;
        let [state, error] = response.read_array()?;
        CalibrationStatus::from_bytes(state, error).ok_or_else(|| {
            MgenError::InvalidResponse(format!(
                "unknown calibration state 0x{:02X} (error 0x{:02X})",
                state, error
            ))
        })
    }
}
