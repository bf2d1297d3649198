//! Error types for MGEN operations

use thiserror::Error;

/// Reasons the device gives for refusing an operation.
///
/// The status byte that selects one of these is command specific, see
/// [`Command::error_codes`](crate::Command::error_codes).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The user is operating the device's own keypad
    #[error("device user interface is locked")]
    UiLocked,
    #[error("another command is still in progress")]
    AnotherCommandInProgress,
    #[error("camera is switched off")]
    CameraIsOff,
    #[error("autoguiding is active")]
    AutoGuidingActive,
    /// The device is in a state where the function is not available
    #[error("device cannot perform this function now")]
    CannotDoFunctions,
}

/// Errors that can occur during MGEN operations
#[derive(Debug, Error)]
pub enum MgenError {
    /// Transport layer error (serial port, USB bridge, etc.)
    #[error("transport error: {0}")]
    Transport(String),

    /// The device did not answer in time
    #[error(
        "timed out after {timeout_ms}ms waiting for command 0x{command:02X}: expected {expected} bytes, received {received}"
    )]
    Timeout {
        command: u8,
        expected: usize,
        received: usize,
        timeout_ms: u64,
    },

    /// A status byte the command does not know; the link is probably out of sync
    #[error("unexpected return code 0x{code:02X} for command 0x{command:02X}")]
    UnexpectedReturnCode { command: u8, code: u8 },

    /// The device refused the command
    #[error("command 0x{command:02X} refused with status 0x{status:02X}: {kind}")]
    Device {
        command: u8,
        status: u8,
        kind: DeviceError,
    },

    /// Neither firmware personality answered its probe
    #[error("device did not answer at either baud rate")]
    NoDevice,

    /// Invalid parameter passed to a command constructor
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Acknowledged response carrying a value outside its domain
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl MgenError {
    /// The device-reported refusal, if this is one.
    pub fn device_error(&self) -> Option<DeviceError> {
        match self {
            MgenError::Device { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether re-issuing the same command later can succeed without
    /// resynchronizing the link first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MgenError::Timeout { .. }
                | MgenError::Device {
                    kind: DeviceError::AnotherCommandInProgress,
                    ..
                }
        )
    }
}
