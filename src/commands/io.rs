//! Front panel I/O: remote button presses and LED readback.

use super::{Command, IO_FUNCTION, ResponseRead};
use crate::error::{DeviceError, MgenError};
use crate::types::{Button, LedState};

const INSERT_BUTTON: u8 = 0x01;
const GET_LED_STATES: u8 = 0x0A;

/// Press a front panel key as if the user had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonCommand {
    button: Button,
}

impl ButtonCommand {
    pub fn new(button: Button) -> Self {
        Self { button }
    }

    pub fn button(&self) -> Button {
        self.button
    }
}

impl Command for ButtonCommand {
    type Output = ();

    fn code(&self) -> u8 {
        IO_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(INSERT_BUTTON)
    }

    fn payload(&self) -> Vec<u8> {
        vec![self.button as u8]
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[(0xF0, DeviceError::UiLocked)]
    }

    fn read_response<R: ResponseRead>(&self, _response: &mut R) -> Result<(), MgenError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetLedStatesCommand;

impl GetLedStatesCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetLedStatesCommand {
    type Output = LedState;

    fn code(&self) -> u8 {
        IO_FUNCTION
    }

    fn sub_code(&self) -> Option<u8> {
        Some(GET_LED_STATES)
    }

    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<LedState, MgenError> {
        Ok(LedState(response.read_u8()?))
    }
}
