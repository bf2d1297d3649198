//! Guide camera control: power, exposure settings and star search.

use std::ops::RangeInclusive;
use std::time::Duration;

use super::{CAMERA_FUNCTION, Command, DEFAULT_TIMEOUT, ResponseRead, check_range, status_command};
use crate::codec::{decode_u16_le, encode_u16_le};
use crate::error::{DeviceError, MgenError};
use crate::types::{ImagingParameters, StarSearchResult};

const START_CAMERA: u8 = 0x01;
const STOP_CAMERA: u8 = 0x02;
const STAR_SEARCH: u8 = 0x30;
const GET_IMAGING_PARAMETERS: u8 = 0x90;
const SET_IMAGING_PARAMETERS: u8 = 0x91;

pub const GAIN_RANGE: RangeInclusive<u8> = 1..=10;
pub const EXPOSURE_MS_RANGE: RangeInclusive<u16> = 1..=4000;
pub const THRESHOLD_RANGE: RangeInclusive<u8> = 1..=50;

status_command! {
    /// Power up the guide camera. The sensor needs a few seconds to settle.
    StartCameraCommand {
        code: CAMERA_FUNCTION,
        sub_code: START_CAMERA,
        timeout: Duration::from_secs(5),
        errors: [
            (0xF0, UiLocked),
            (0xF1, AnotherCommandInProgress),
            (0xF3, AutoGuidingActive),
        ],
    }
}

status_command! {
    StopCameraCommand {
        code: CAMERA_FUNCTION,
        sub_code: STOP_CAMERA,
        timeout: DEFAULT_TIMEOUT,
        errors: [
            (0xF0, UiLocked),
            (0xF1, AnotherCommandInProgress),
            (0xF2, AutoGuidingActive),
        ],
    }
}

/// Expose once and count the stars above threshold.
///
/// The device only answers once the exposure and the scan are complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarSearchCommand {
    gain: u8,
    exposure_ms: u16,
}

impl StarSearchCommand {
    pub fn new(gain: u8, exposure_ms: u16) -> Result<Self, MgenError> {
        Ok(Self {
            gain: check_range("gain", gain, GAIN_RANGE)?,
            exposure_ms: check_range("exposure time", exposure_ms, EXPOSURE_MS_RANGE)?,
        })
    }
}

impl Command for StarSearchCommand {
    type Output = StarSearchResult;

    fn code(&self) -> u8 {
        CAMERA_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(STAR_SEARCH)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn payload(&self) -> Vec<u8> {
        let [exp_lo, exp_hi] = encode_u16_le(self.exposure_ms);
        vec![self.gain, exp_lo, exp_hi]
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF0, DeviceError::UiLocked),
            (0xF1, DeviceError::AnotherCommandInProgress),
            (0xF2, DeviceError::CameraIsOff),
            (0xF3, DeviceError::AutoGuidingActive),
        ]
    }

    fn read_response<R: ResponseRead>(
        &self,
        response: &mut R,
    ) -> Result<StarSearchResult, MgenError> {
        self.read_status(response)?;
        Ok(StarSearchResult {
            number_of_stars: response.read_u8()?,
        })
    }
}

/// Read back gain, exposure time and detection threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetImagingParameterCommand;

impl GetImagingParameterCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetImagingParameterCommand {
    type Output = ImagingParameters;

    fn code(&self) -> u8 {
        CAMERA_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(GET_IMAGING_PARAMETERS)
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF2, DeviceError::CameraIsOff),
            (0x99, DeviceError::CannotDoFunctions),
        ]
    }

    fn read_response<R: ResponseRead>(
        &self,
        response: &mut R,
    ) -> Result<ImagingParameters, MgenError> {
        // [status][gain][exposure lo][exposure hi][threshold]
        self.read_status(response)?;
        let [gain, exp_lo, exp_hi, threshold] = response.read_array()?;
        Ok(ImagingParameters {
            gain,
            exposure_ms: decode_u16_le([exp_lo, exp_hi]),
            threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetImagingParameterCommand {
    parameters: ImagingParameters,
}

impl SetImagingParameterCommand {
    pub fn new(gain: u8, exposure_ms: u16, threshold: u8) -> Result<Self, MgenError> {
        Ok(Self {
            parameters: ImagingParameters {
                gain: check_range("gain", gain, GAIN_RANGE)?,
                exposure_ms: check_range("exposure time", exposure_ms, EXPOSURE_MS_RANGE)?,
                threshold: check_range("threshold", threshold, THRESHOLD_RANGE)?,
            },
        })
    }

    pub fn parameters(&self) -> ImagingParameters {
        self.parameters
    }
}

impl TryFrom<ImagingParameters> for SetImagingParameterCommand {
    type Error = MgenError;

    fn try_from(parameters: ImagingParameters) -> Result<Self, Self::Error> {
        Self::new(parameters.gain, parameters.exposure_ms, parameters.threshold)
    }
}

impl Command for SetImagingParameterCommand {
    type Output = ();

    fn code(&self) -> u8 {
        CAMERA_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(SET_IMAGING_PARAMETERS)
    }

    fn payload(&self) -> Vec<u8> {
        let [exp_lo, exp_hi] = encode_u16_le(self.parameters.exposure_ms);
        vec![self.parameters.gain, exp_lo, exp_hi, self.parameters.threshold]
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF0, DeviceError::UiLocked),
            (0xF1, DeviceError::AnotherCommandInProgress),
            (0xF2, DeviceError::AutoGuidingActive),
            (0x99, DeviceError::CannotDoFunctions),
        ]
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<(), MgenError> {
        self.read_status(response)
    }
}
