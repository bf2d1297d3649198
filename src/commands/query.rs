//! Combined status query with optional blocks.
//!
//! The request flags select which blocks follow the status byte. They are
//! always sent in this order and must be read in this order:
//!
//! ```text
//! [status]
//! [autoguiding state: 0 | 1]                                    if AUTOGUIDING_STATE
//! [frame index][reserved][x:i24][y:i24][ra:i16][dec:i16]        if FRAME_INFO
//! ```

use super::{Command, QUERY, ResponseRead};
use crate::codec::{decode_i16_le, decode_i24_le};
use crate::error::{DeviceError, MgenError};
use crate::types::{FrameInfo, QueryFlags, QueryResult};

const FRAME_INFO_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCommand {
    flags: QueryFlags,
}

impl QueryCommand {
    pub fn new(flags: QueryFlags) -> Result<Self, MgenError> {
        let known = QueryFlags::AUTOGUIDING_STATE | QueryFlags::FRAME_INFO;
        if flags.0 & !known != 0 {
            return Err(MgenError::InvalidParameter(format!(
                "unknown query flags: 0x{:02X}",
                flags.0 & !known
            )));
        }
        Ok(Self { flags })
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    fn decode_frame_info(block: [u8; FRAME_INFO_LEN]) -> Option<FrameInfo> {
        let frame_index = block[0];
        if frame_index == 0 {
            return None;
        }
        Some(FrameInfo {
            frame_index,
            pos_x: decode_i24_le([block[2], block[3], block[4]]),
            pos_y: decode_i24_le([block[5], block[6], block[7]]),
            dist_ra: decode_i16_le([block[8], block[9]]),
            dist_dec: decode_i16_le([block[10], block[11]]),
        })
    }
}

impl Command for QueryCommand {
    type Output = QueryResult;

    fn code(&self) -> u8 {
        QUERY
    }

    fn payload(&self) -> Vec<u8> {
        vec![self.flags.0]
    }

    fn error_codes(&self) -> &'static [(u8, DeviceError)] {
        &[
            (0xF1, DeviceError::AnotherCommandInProgress),
            (0x99, DeviceError::CannotDoFunctions),
        ]
    }

    // The acknowledge byte doubles as the status byte here.
    fn read_response<R: ResponseRead>(&self, response: &mut R) -> Result<QueryResult, MgenError> {
        let mut result = QueryResult::default();

        if self.flags.has_autoguiding_state() {
            result.autoguiding = Some(match response.read_u8()? {
                0 => false,
                1 => true,
                other => {
                    return Err(MgenError::InvalidResponse(format!(
                        "autoguiding state must be 0 or 1, got 0x{:02X}",
                        other
                    )));
                }
            });
        }

        if self.flags.has_frame_info() {
            // Consume the whole block even when the frame index says it is empty.
            result.frame_info = Self::decode_frame_info(response.read_array()?);
        }

        Ok(result)
    }
}
