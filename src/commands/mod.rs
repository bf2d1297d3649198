//! MGEN commands.
//!
//! Every device operation is a small immutable value implementing [`Command`].
//! A command knows its opcodes, the baud rate of the firmware personality that
//! accepts it, how long the device may take to answer, and which status bytes
//! the device uses to refuse it. [`Mgen::execute`](crate::Mgen::execute) does
//! the exchange; the command only encodes its request and decodes the bytes
//! following a matching acknowledge code.
//!
//! Frame shape on the wire:
//!
//! ```text
//! request:  [code][sub code?][payload...]
//! response: [ack][status?][payload...]
//! ```

use std::time::Duration;

use crate::error::{DeviceError, MgenError};

/// Line speed of the boot loader
pub const BOOT_MODE_BAUD_RATE: u32 = 9_600;
/// Line speed of the autoguider application
pub const APP_MODE_BAUD_RATE: u32 = 250_000;
/// Response timeout for commands that answer immediately
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Status byte reporting success
pub(crate) const STATUS_OK: u8 = 0x00;

// Boot mode opcodes
pub(crate) const QUERY_DEVICE: u8 = 0xAA;
pub(crate) const QUERY_DEVICE_ACK: u8 = 0x55;
pub(crate) const ENTER_NORMAL_MODE: u8 = 0x42;
pub(crate) const GET_FIRMWARE_VERSION: u8 = 0x03;

// App mode opcodes
pub(crate) const NO_OP: u8 = 0xFF;
pub(crate) const IO_FUNCTION: u8 = 0x5D;
pub(crate) const CAMERA_FUNCTION: u8 = 0xCA;
pub(crate) const GUIDING_FUNCTION: u8 = 0xCB;
pub(crate) const CALIBRATION_FUNCTION: u8 = 0xCC;
pub(crate) const DITHER_FUNCTION: u8 = 0xCD;
pub(crate) const QUERY: u8 = 0xCE;

/// Source of response bytes for a command being decoded.
///
/// Implemented by the dispatcher; every read shares the deadline of the
/// exchange.
pub trait ResponseRead {
    /// Fill `buf` completely or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), MgenError>;

    fn read_u8(&mut self) -> Result<u8, MgenError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], MgenError> {
        let mut bytes = [0u8; N];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// One request/response exchange with the device.
pub trait Command {
    /// Decoded result of a successful exchange
    type Output;

    /// Primary opcode, first byte of every request
    fn code(&self) -> u8;

    /// Second opcode byte for commands sharing a primary opcode
    fn sub_code(&self) -> Option<u8> {
        None
    }

    /// First response byte confirming the request was framed correctly
    fn ack_code(&self) -> u8 {
        self.code()
    }

    /// Baud rate the transport must run at for this command
    fn baud_rate(&self) -> u32 {
        APP_MODE_BAUD_RATE
    }

    /// Upper bound for the complete response
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Request bytes following the opcodes
    fn payload(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Status bytes this command recognizes as device refusals.
    ///
    /// The table is per command: the same byte means different things
    /// depending on which command produced it.
    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[]
    }

    /// The full request frame
    fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut frame = Vec::with_capacity(2 + payload.len());
        frame.push(self.code());
        if let Some(sub_code) = self.sub_code() {
            frame.push(sub_code);
        }
        frame.extend_from_slice(&payload);
        frame
    }

    /// Map a non-success status byte to an error
    fn status_error(&self, status: u8) -> MgenError {
        match self.error_codes().iter().find(|(code, _)| *code == status) {
            Some(&(_, kind)) => MgenError::Device {
                command: self.code(),
                status,
                kind,
            },
            None => MgenError::UnexpectedReturnCode {
                command: self.code(),
                code: status,
            },
        }
    }

    /// Read a status byte and fail unless it reports success
    fn read_status<R: ResponseRead>(&self, response: &mut R) -> Result<(), MgenError> {
        match response.read_u8()? {
            STATUS_OK => Ok(()),
            status => Err(self.status_error(status)),
        }
    }

    /// Called when the first response byte is not the acknowledge code
    fn unacknowledged(&self, code: u8) -> Result<Self::Output, MgenError> {
        Err(self.status_error(code))
    }

    /// Decode the bytes following a matching acknowledge code
    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<Self::Output, MgenError>;
}

/// Declares a command that carries no payload and answers with
/// acknowledge + status only.
macro_rules! status_command {
    (
        $(#[$meta:meta])*
        $name:ident {
            code: $code:expr,
            sub_code: $sub:expr,
            timeout: $timeout:expr,
            errors: [$(($status:expr, $kind:ident)),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl $crate::commands::Command for $name {
            type Output = ();

            fn code(&self) -> u8 {
                $code
            }

            fn sub_code(&self) -> Option<u8> {
                Some($sub)
            }

            fn timeout(&self) -> std::time::Duration {
                $timeout
            }

            fn error_codes(&self) -> &'static [(u8, $crate::error::DeviceError)] {
                &[$(($status, $crate::error::DeviceError::$kind)),*]
            }

            fn read_response<R: $crate::commands::ResponseRead>(
                &self,
                response: &mut R,
            ) -> Result<(), $crate::error::MgenError> {
                $crate::commands::Command::read_status(self, response)
            }
        }
    };
}

pub(crate) use status_command;

/// Fail with `InvalidParameter` unless `value` lies in `range`.
pub(crate) fn check_range<T>(
    name: &str,
    value: T,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, MgenError>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(MgenError::InvalidParameter(format!(
            "{} out of range: {} (valid: {}..={})",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}

mod calibration;
mod dither;
mod guiding;
mod imaging;
mod io;
mod mode;
mod query;

pub use calibration::{CancelCalibrationCommand, QueryCalibrationCommand, StartCalibrationCommand};
pub use dither::{
    GetDitherAmplitudeCommand, GetDitherStateCommand, SetDitherAmplitudeCommand,
    StartDitheringCommand,
};
pub use guiding::{SetGuidingPositionCommand, StartAutoGuidingCommand, StopAutoGuidingCommand};
pub use imaging::{
    GetImagingParameterCommand, SetImagingParameterCommand, StarSearchCommand,
    StartCameraCommand, StopCameraCommand,
};
pub use io::{ButtonCommand, GetLedStatesCommand};
pub use mode::{EnterNormalModeCommand, GetFirmwareVersionCommand, NoOpCommand, QueryDeviceCommand};
pub use query::QueryCommand;
