//! Protocol driver for the Lacerta MGEN standalone autoguider.
//!
//! The MGEN is reached through a USB-serial bridge and runs one of two
//! firmware personalities: a boot loader at 9600 baud and the autoguider
//! application at 250000 baud. Every operation is a [`Command`] executed by
//! [`Mgen::execute`], which switches the line speed as needed, writes the
//! request, checks the acknowledge byte and decodes the reply.
//!
//! # Features
//!
//! - `serial` - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use mgen_protocol::{Mgen, SerialTransport, QueryFlags, BOOT_MODE_BAUD_RATE};
//!
//! let transport = SerialTransport::new("/dev/ttyUSB0", BOOT_MODE_BAUD_RATE)?;
//! let mut mgen = Mgen::with_baud_rate(transport, BOOT_MODE_BAUD_RATE);
//!
//! mgen.enter_app_mode()?;
//! if let Some(frame) = mgen.query(QueryFlags::frame_info())?.frame_info {
//!     println!("Star at {:.2}, {:.2}", frame.x_pixels(), frame.y_pixels());
//! }
//! ```

mod codec;
mod commands;
mod device;
mod error;
mod transport;
mod types;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use codec::{
    decode_fixed_8_8, decode_i16_le, decode_i24_le, decode_i32_le, decode_u16_le,
    encode_fixed_8_8, encode_i24_le, encode_u16_le,
};
pub use commands::{
    APP_MODE_BAUD_RATE, BOOT_MODE_BAUD_RATE, ButtonCommand, CancelCalibrationCommand, Command,
    DEFAULT_TIMEOUT, EnterNormalModeCommand, GetDitherAmplitudeCommand, GetDitherStateCommand,
    GetFirmwareVersionCommand, GetImagingParameterCommand, GetLedStatesCommand, NoOpCommand,
    QueryCalibrationCommand, QueryCommand, QueryDeviceCommand, ResponseRead,
    SetDitherAmplitudeCommand, SetGuidingPositionCommand, SetImagingParameterCommand,
    StarSearchCommand, StartAutoGuidingCommand, StartCalibrationCommand, StartCameraCommand,
    StartDitheringCommand, StopAutoGuidingCommand, StopCameraCommand,
};
pub use device::Mgen;
pub use error::{DeviceError, MgenError};
pub use transport::MgenTransport;
pub use types::{
    Button, CalibrationError, CalibrationStatus, DeviceMode, DitherState, FirmwareVersion,
    FrameInfo, ImagingParameters, LedState, QueryFlags, QueryResult, StarSearchResult,
};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
