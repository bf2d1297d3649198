use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::commands::{
    ButtonCommand, CancelCalibrationCommand, Command, EnterNormalModeCommand,
    GetDitherAmplitudeCommand, GetDitherStateCommand, GetFirmwareVersionCommand,
    GetImagingParameterCommand, GetLedStatesCommand, NoOpCommand, QueryCalibrationCommand,
    QueryCommand, QueryDeviceCommand, ResponseRead, SetDitherAmplitudeCommand,
    SetGuidingPositionCommand, SetImagingParameterCommand, StarSearchCommand,
    StartAutoGuidingCommand, StartCalibrationCommand, StartCameraCommand, StartDitheringCommand,
    StopAutoGuidingCommand, StopCameraCommand,
};
use crate::error::MgenError;
use crate::transport::MgenTransport;
use crate::types::{
    Button, CalibrationStatus, DeviceMode, DitherState, FirmwareVersion, FrameInfo,
    ImagingParameters, LedState, QueryFlags, QueryResult, bytes_to_hex,
};

/// How often to check whether the application firmware came up
const APP_START_POLL: Duration = Duration::from_millis(200);
const APP_START_ATTEMPTS: usize = 10;

fn transport_error<E: std::fmt::Debug>(e: E) -> MgenError {
    MgenError::Transport(format!("{:?}", e))
}

/// Handle to one MGEN device.
///
/// Owns the transport, so exchanges and baud rate switches are serialized by
/// `&mut self`. The device has no request IDs; overlapping two commands would
/// desynchronize it. Share across threads by wrapping the handle in a mutex.
pub struct Mgen<T: MgenTransport> {
    transport: T,
    /// Rate the transport is known to be set to, `None` until the first switch
    baud_rate: Option<u32>,
}

impl<T: MgenTransport> Mgen<T> {
    /// Create a new MGEN handle with the given transport.
    /// The transport's baud rate is set before the first command.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            baud_rate: None,
        }
    }

    /// Create a handle for a transport already running at `baud_rate`
    pub fn with_baud_rate(transport: T, baud_rate: u32) -> Self {
        Self {
            transport,
            baud_rate: Some(baud_rate),
        }
    }

    /// Current line speed, if known
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give back the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Discard any bytes still arriving from an earlier exchange.
    /// Use after an `UnexpectedReturnCode` before retrying.
    pub fn resynchronize(&mut self) -> Result<(), MgenError> {
        self.transport.clear_input().map_err(transport_error)
    }

    /// Perform one request/response exchange.
    ///
    /// Switches the baud rate if the command needs another one, writes the
    /// request frame in one call, then reads the acknowledge byte and whatever
    /// the command decodes after it, all within the command's timeout.
    pub fn execute<C: Command>(&mut self, command: &C) -> Result<C::Output, MgenError> {
        self.ensure_baud_rate(command.baud_rate())?;
        self.transport.clear_input().map_err(transport_error)?;

        let frame = command.encode();
        debug!("Sending command: {}", bytes_to_hex(&frame));
        let written = self.transport.write(&frame).map_err(transport_error)?;
        if written != frame.len() {
            return Err(MgenError::Transport(format!(
                "short write: {} of {} bytes",
                written,
                frame.len()
            )));
        }

        let timeout = command.timeout();
        let mut exchange = Exchange {
            transport: &mut self.transport,
            command: command.code(),
            timeout,
            deadline: Instant::now() + timeout,
            expected: 0,
            received: 0,
        };

        let ack = exchange.read_u8()?;
        let result = if ack == command.ack_code() {
            command.read_response(&mut exchange)
        } else {
            command.unacknowledged(ack)
        };
        if let Err(e) = &result {
            warn!("Command 0x{:02X} failed: {}", command.code(), e);
        }
        result
    }

    fn ensure_baud_rate(&mut self, baud_rate: u32) -> Result<(), MgenError> {
        if self.baud_rate == Some(baud_rate) {
            return Ok(());
        }
        info!("Switching baud rate to {}", baud_rate);
        // Unknown until the switch is confirmed
        self.baud_rate = None;
        self.transport
            .set_baud_rate(baud_rate)
            .map_err(transport_error)?;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    /// Find out which firmware personality is running.
    ///
    /// Probes the application first, then the boot loader. Returns `None` if
    /// neither answers.
    pub fn detect_mode(&mut self) -> Result<Option<DeviceMode>, MgenError> {
        match self.execute(&NoOpCommand::new()) {
            Ok(Some(mode)) => return Ok(Some(mode)),
            Ok(None) => debug!("Boot loader answered the app mode probe"),
            Err(e @ (MgenError::Timeout { .. } | MgenError::UnexpectedReturnCode { .. })) => {
                debug!("No app mode answer: {}", e)
            }
            Err(e) => return Err(e),
        }

        match self.execute(&QueryDeviceCommand::new()) {
            Ok(mode) => Ok(mode),
            Err(MgenError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make sure the autoguider application is running, starting it from the
    /// boot loader if necessary.
    pub fn enter_app_mode(&mut self) -> Result<(), MgenError> {
        match self.detect_mode()? {
            Some(DeviceMode::App) => return Ok(()),
            Some(DeviceMode::Boot) => {
                info!("Starting application firmware");
                self.execute(&EnterNormalModeCommand::new())?;
            }
            None => return Err(MgenError::NoDevice),
        }

        for attempt in 1..=APP_START_ATTEMPTS {
            std::thread::sleep(APP_START_POLL);
            match self.execute(&NoOpCommand::new()) {
                Ok(Some(DeviceMode::App)) => {
                    info!("Application firmware running");
                    return Ok(());
                }
                Ok(_)
                | Err(MgenError::Timeout { .. })
                | Err(MgenError::UnexpectedReturnCode { .. }) => {
                    debug!("Application not up yet (attempt {})", attempt);
                }
                Err(e) => return Err(e),
            }
        }
        Err(MgenError::NoDevice)
    }

    /// Get firmware version. Boot mode only.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, MgenError> {
        self.execute(&GetFirmwareVersionCommand::new())
    }

    /// Press a front panel key remotely
    pub fn press_button(&mut self, button: Button) -> Result<(), MgenError> {
        self.execute(&ButtonCommand::new(button))
    }

    pub fn led_states(&mut self) -> Result<LedState, MgenError> {
        self.execute(&GetLedStatesCommand::new())
    }

    pub fn start_camera(&mut self) -> Result<(), MgenError> {
        self.execute(&StartCameraCommand::new())
    }

    pub fn stop_camera(&mut self) -> Result<(), MgenError> {
        self.execute(&StopCameraCommand::new())
    }

    pub fn imaging_parameters(&mut self) -> Result<ImagingParameters, MgenError> {
        self.execute(&GetImagingParameterCommand::new())
    }

    /// Set gain, exposure time and detection threshold.
    /// Out of range values are rejected before anything is sent.
    pub fn set_imaging_parameters(
        &mut self,
        parameters: ImagingParameters,
    ) -> Result<(), MgenError> {
        self.execute(&SetImagingParameterCommand::try_from(parameters)?)
    }

    /// Run a star search and return the number of stars found
    ///
    /// # Arguments
    /// * `gain` - Camera gain for the search exposure
    /// * `exposure_ms` - Exposure time in milliseconds
    pub fn star_search(&mut self, gain: u8, exposure_ms: u16) -> Result<u8, MgenError> {
        self.execute(&StarSearchCommand::new(gain, exposure_ms)?)
            .map(|result| result.number_of_stars)
    }

    pub fn start_calibration(&mut self) -> Result<(), MgenError> {
        self.execute(&StartCalibrationCommand::new())
    }

    pub fn cancel_calibration(&mut self) -> Result<(), MgenError> {
        self.execute(&CancelCalibrationCommand::new())
    }

    pub fn calibration_status(&mut self) -> Result<CalibrationStatus, MgenError> {
        self.execute(&QueryCalibrationCommand::new())
    }

    /// Poll the calibration status until it finishes
    ///
    /// # Arguments
    /// * `poll_interval` - Pause between status queries
    /// * `max_wait` - Give up polling after this long
    ///
    /// # Returns
    /// The last status read. It is not finished if `max_wait` ran out first.
    pub fn wait_for_calibration(
        &mut self,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<CalibrationStatus, MgenError> {
        let start = Instant::now();

        loop {
            match self.calibration_status() {
                Ok(status) => {
                    debug!("Calibration status: {:?}", status);
                    if status.is_finished() || start.elapsed() >= max_wait {
                        return Ok(status);
                    }
                }
                Err(e) if e.is_retryable() && start.elapsed() < max_wait => {
                    warn!("Calibration status unavailable, retrying: {}", e);
                }
                Err(e) => return Err(e),
            }
            std::thread::sleep(poll_interval);
        }
    }

    pub fn start_autoguiding(&mut self) -> Result<(), MgenError> {
        self.execute(&StartAutoGuidingCommand::new())
    }

    pub fn stop_autoguiding(&mut self) -> Result<(), MgenError> {
        self.execute(&StopAutoGuidingCommand::new())
    }

    /// Move the guiding target to a sensor position in pixels
    pub fn set_guiding_position(&mut self, x_pixels: f64, y_pixels: f64) -> Result<(), MgenError> {
        self.execute(&SetGuidingPositionCommand::new(x_pixels, y_pixels)?)
    }

    pub fn query(&mut self, flags: QueryFlags) -> Result<QueryResult, MgenError> {
        self.execute(&QueryCommand::new(flags)?)
    }

    pub fn is_autoguiding(&mut self) -> Result<bool, MgenError> {
        let result = self.query(QueryFlags::autoguiding_state())?;
        Ok(result.autoguiding.unwrap_or(false))
    }

    /// Latest guide frame, `None` if no frame has been taken yet
    pub fn frame_info(&mut self) -> Result<Option<FrameInfo>, MgenError> {
        self.query(QueryFlags::frame_info()).map(|result| result.frame_info)
    }

    pub fn dither_state(&mut self) -> Result<DitherState, MgenError> {
        self.execute(&GetDitherStateCommand::new())
    }

    /// Dither amplitude in pixels
    pub fn dither_amplitude(&mut self) -> Result<f64, MgenError> {
        self.execute(&GetDitherAmplitudeCommand::new())
    }

    pub fn set_dither_amplitude(&mut self, amplitude: f64) -> Result<(), MgenError> {
        self.execute(&SetDitherAmplitudeCommand::new(amplitude)?)
    }

    pub fn start_dithering(&mut self) -> Result<(), MgenError> {
        self.execute(&StartDitheringCommand::new())
    }
}

/// Response side of one exchange. All reads share the deadline set when the
/// request was written.
struct Exchange<'a, T: MgenTransport> {
    transport: &'a mut T,
    command: u8,
    timeout: Duration,
    deadline: Instant,
    expected: usize,
    received: usize,
}

impl<T: MgenTransport> Exchange<'_, T> {
    fn timed_out(&self) -> MgenError {
        MgenError::Timeout {
            command: self.command,
            expected: self.expected,
            received: self.received,
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

impl<T: MgenTransport> ResponseRead for Exchange<'_, T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), MgenError> {
        self.expected += buf.len();
        let mut filled = 0;

        while filled < buf.len() {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.timed_out());
            }
            let timeout_ms = remaining.as_millis().clamp(1, u32::MAX as u128) as u32;

            match self.transport.read(&mut buf[filled..], timeout_ms) {
                Ok(bytes_read) => {
                    filled += bytes_read;
                    self.received += bytes_read;
                }
                Err(e) => {
                    error!("Read error: {:?}", e);
                    return Err(transport_error(e));
                }
            }
        }

        debug!("Received {} bytes: {}", buf.len(), bytes_to_hex(buf));
        Ok(())
    }
}
