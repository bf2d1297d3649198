//! Commands for finding out, and changing, which firmware personality runs.
//!
//! The two personalities listen at different baud rates, so the host can only
//! tell them apart by probing. A reply from the other personality is a normal
//! outcome of that negotiation and is reported as `Ok(None)`, never as an error.

use log::debug;

use super::{
    BOOT_MODE_BAUD_RATE, Command, ENTER_NORMAL_MODE, GET_FIRMWARE_VERSION, NO_OP, QUERY_DEVICE,
    QUERY_DEVICE_ACK, ResponseRead,
};
use crate::codec::decode_u16_le;
use crate::error::MgenError;
use crate::types::{DeviceMode, FirmwareVersion};

/// Boot loader probe: `[0xAA, 0x01, 0x01]` answered by
/// `[0x55, 0x03, 0x01, 0x80, mode]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryDeviceCommand;

impl QueryDeviceCommand {
    const REQUEST: [u8; 2] = [0x01, 0x01];
    const REPLY_HEADER: [u8; 3] = [0x03, 0x01, 0x80];
    const MODE_BOOT: u8 = 0x01;
    const MODE_APP: u8 = 0x02;

    pub fn new() -> Self {
        Self
    }
}

impl Command for QueryDeviceCommand {
    type Output = Option<DeviceMode>;

    fn code(&self) -> u8 {
        QUERY_DEVICE
    }

    fn ack_code(&self) -> u8 {
        QUERY_DEVICE_ACK
    }

    fn baud_rate(&self) -> u32 {
        BOOT_MODE_BAUD_RATE
    }

    fn payload(&self) -> Vec<u8> {
        Self::REQUEST.to_vec()
    }

    fn unacknowledged(&self, code: u8) -> Result<Self::Output, MgenError> {
        debug!("Device probe answered 0x{:02X}, not in boot mode", code);
        Ok(None)
    }

    fn read_response<R: ResponseRead>(
        &self,
        response: &mut R,
    ) -> Result<Self::Output, MgenError> {
        let reply: [u8; 4] = match response.read_array() {
            Ok(reply) => reply,
            Err(e @ MgenError::Timeout { .. }) => {
                debug!("Truncated device probe reply: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if reply[..3] != Self::REPLY_HEADER {
            debug!("Malformed device probe reply: {:02X?}", reply);
            return Ok(None);
        }
        Ok(match reply[3] {
            Self::MODE_BOOT => Some(DeviceMode::Boot),
            Self::MODE_APP => Some(DeviceMode::App),
            other => {
                debug!("Unknown mode byte in device probe: 0x{:02X}", other);
                None
            }
        })
    }
}

/// App mode probe. The device echoes `0xFF` in app mode; the boot loader
/// answers a bare `0x00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoOpCommand;

impl NoOpCommand {
    const BOOT_MODE_REPLY: u8 = 0x00;

    pub fn new() -> Self {
        Self
    }
}

impl Command for NoOpCommand {
    type Output = Option<DeviceMode>;

    fn code(&self) -> u8 {
        NO_OP
    }

    fn unacknowledged(&self, code: u8) -> Result<Self::Output, MgenError> {
        if code == Self::BOOT_MODE_REPLY {
            debug!("No-op answered by boot loader");
            return Ok(None);
        }
        Err(self.status_error(code))
    }

    fn read_response<R: ResponseRead>(&self, _response: &mut R) -> Result<Self::Output, MgenError> {
        Ok(Some(DeviceMode::App))
    }
}

/// Leave the boot loader and start the autoguider application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnterNormalModeCommand;

impl EnterNormalModeCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for EnterNormalModeCommand {
    type Output = ();

    fn code(&self) -> u8 {
        ENTER_NORMAL_MODE
    }

    fn baud_rate(&self) -> u32 {
        BOOT_MODE_BAUD_RATE
    }

    fn read_response<R: ResponseRead>(&self, _response: &mut R) -> Result<(), MgenError> {
        Ok(())
    }
}

/// Read the firmware version from the boot loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetFirmwareVersionCommand;

impl GetFirmwareVersionCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for GetFirmwareVersionCommand {
    type Output = FirmwareVersion;

    fn code(&self) -> u8 {
        GET_FIRMWARE_VERSION
    }

    fn baud_rate(&self) -> u32 {
        BOOT_MODE_BAUD_RATE
    }

    fn read_response<R: ResponseRead>(
        &self,
        response: &mut R,
    ) -> Result<FirmwareVersion, MgenError> {
        Ok(FirmwareVersion(decode_u16_le(response.read_array()?)))
    }
}
