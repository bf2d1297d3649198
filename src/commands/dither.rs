//! Dithering: small random offsets of the guide position between exposures.
//!
//! The dither query answers with `[status][flags][amplitude 8.8 LE]`. Both
//! state and amplitude readers issue the same query and pick their field.

use std::ops::RangeInclusive;

use super::{Command, DEFAULT_TIMEOUT, DITHER_FUNCTION, ResponseRead, status_command};
use crate::codec::{decode_fixed_8_8, decode_u16_le, encode_fixed_8_8, encode_u16_le};
use crate::error::{DeviceError, MgenError};
use crate::types::DitherState;

const QUERY_DITHER: u8 = 0x01;
const START_DITHERING: u8 = 0x02;
const SET_DITHER_AMPLITUDE: u8 = 0x03;

/// Amplitude in pixels accepted by the device
pub const AMPLITUDE_RANGE: RangeInclusive<f64> = 0.1..=25.0;

const QUERY_ERRORS: &[(u8, DeviceError)] = &[(0x99, DeviceError::CannotDoFunctions)];

/// Read the dither query reply after the acknowledge byte.
fn read_dither_reply<C, R>(command: &C, response: &mut R) -> Result<(DitherState, f64), MgenError>
where
    C: Command,
    R: ResponseRead,
{
    command.read_status(response)?;
    let [flags, amp_lo, amp_hi] = response.read_array()?;
    Ok((
        DitherState(flags),
        decode_fixed_8_8(decode_u16_le([amp_lo, amp_hi])),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetDitherStateCommand;

impl GetDitherStateCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetDitherStateCommand {
    type Output = DitherState;

    fn code(&self) -> u8 {
        DITHER_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(QUERY_DITHER)
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        QUERY_ERRORS
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<DitherState, MgenError> {
        read_dither_reply(self, response).map(|(state, _)| state)
    }
}

/// Dither amplitude in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetDitherAmplitudeCommand;

impl GetDitherAmplitudeCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetDitherAmplitudeCommand {
    type Output = f64;

    fn code(&self) -> u8 {
        DITHER_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(QUERY_DITHER)
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        QUERY_ERRORS
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<f64, MgenError> {
        read_dither_reply(self, response).map(|(_, amplitude)| amplitude)
    }
}

status_command! {
    /// Apply one dither offset. Only accepted while autoguiding.
    StartDitheringCommand {
        code: DITHER_FUNCTION,
        sub_code: START_DITHERING,
        timeout: DEFAULT_TIMEOUT,
        errors: [
            (0xF0, UiLocked),
            (0xF1, AnotherCommandInProgress),
            (0xF2, CannotDoFunctions),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetDitherAmplitudeCommand {
    raw: u16,
}

impl SetDitherAmplitudeCommand {
    pub fn new(amplitude: f64) -> Result<Self, MgenError> {
        if !AMPLITUDE_RANGE.contains(&amplitude) {
            return Err(MgenError::InvalidParameter(format!(
                "dither amplitude out of range: {} (valid: {}..={} pixels)",
                amplitude,
                AMPLITUDE_RANGE.start(),
                AMPLITUDE_RANGE.end()
            )));
        }
        let raw = encode_fixed_8_8(amplitude).ok_or_else(|| {
            MgenError::InvalidParameter(format!("dither amplitude not encodable: {}", amplitude))
        })?;
        Ok(Self { raw })
    }

    pub fn amplitude(&self) -> f64 {
        decode_fixed_8_8(self.raw)
    }
}

impl Command for SetDitherAmplitudeCommand {
    type Output = ();

    fn code(&self) -> u8 {
        DITHER_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(SET_DITHER_AMPLITUDE)
    }

    fn payload(&self) -> Vec<u8> {
        encode_u16_le(self.raw).to_vec()
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF0, DeviceError::UiLocked),
            (0xF1, DeviceError::AnotherCommandInProgress),
            (0xF3, DeviceError::AutoGuidingActive),
        ]
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<(), MgenError> {
        self.read_status(response)
    }
}
