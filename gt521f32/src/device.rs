//! High-level device interface

use std::path::{Path, PathBuf};
use std::time::Duration;

use gt521f32_core::{
    Command, DataPayload, DeviceError, ImageData, ModuleInfoData, OpenData, RawImageData,
    ResponsePacket, Session,
    constants::{image, raw_image},
};
use gt521f32_transport::{ConfigError, Transport, TransportKind, TransportOptions};
use gt521f32_types::{DeviceInfo, FingerprintImage, ModuleInfo};
use tracing::{debug, error, info, warn};

use crate::channel::CommandChannel;
use crate::config::DeviceConfig;
use crate::error::Result;
use crate::prompt::{self, FingerPrompt, PromptOutcome};

/// GT521F32 fingerprint module
///
/// Owns the transport for its whole life. Every command takes `&mut self`,
/// so at most one command is ever in flight. A clone of [`Device::session`]
/// can cancel a finger prompt from another thread.
///
/// Dropping the device closes it.
///
/// # Examples
///
/// ```no_run
/// use gt521f32::Device;
///
/// fn main() -> gt521f32::Result<()> {
///     let mut device = Device::new("/dev/ttyUSB0")?;
///
///     let info = device.open()?;
///     println!("Device: {}", info);
///
///     match device.identify()? {
///         Some(id) => println!("Hello, user {}", id),
///         None => println!("Unknown finger"),
///     }
///
///     device.close();
///     Ok(())
/// }
/// ```
pub struct Device {
    transport: Box<dyn Transport>,
    session: Session,
    config: DeviceConfig,
}

impl Device {
    /// Open the transport matching `port` with default options
    pub fn new(port: &str) -> Result<Self> {
        Self::with_options(port, &TransportOptions::new())
    }

    /// Open the transport matching `port`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The port name matches no known transport kind
    /// - An option is not supported by that kind
    /// - The port cannot be opened
    pub fn with_options(port: &str, options: &TransportOptions) -> Result<Self> {
        let transport = gt521f32_transport::open(port, options)?;
        Ok(Self::with_transport(transport))
    }

    /// Drive an already open transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            session: Session::new(),
            config: DeviceConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set finger press poll interval
    pub fn with_prompt_interval(mut self, interval: Duration) -> Self {
        self.config.prompt_interval = interval;
        self
    }

    /// Set attempts per enrollment step
    pub fn with_enroll_attempts(mut self, attempts: usize) -> Self {
        self.config.enroll_attempts = attempts;
        self
    }

    /// Set directory for enrollment images
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Session handle, usable as a cancel handle from other threads
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// Request cancellation of the running or next finger prompt
    pub fn cancel(&self) {
        self.session.cancel();
    }

    /// Kind of the underlying link
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn port_name(&self) -> String {
        self.transport.port_name()
    }

    /// Check if the transport is open
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Open a session and read the device metadata
    pub fn open(&mut self) -> Result<DeviceInfo> {
        info!("Opening session on {}...", self.transport.port_name());

        let mut channel = self.channel();
        channel.send(Command::Open, 1)?.check(Command::Open)?;
        let data: OpenData = channel.read_data()?;

        let info = device_info(&data);
        self.session.open(data);

        info!("Session opened: {}", info);
        Ok(info)
    }

    /// Read sensor and engine parameters
    pub fn module_info(&mut self) -> Result<ModuleInfo> {
        let mut channel = self.channel();
        let announced = channel
            .send(Command::ModuleInfo, 0)?
            .check(Command::ModuleInfo)? as usize;

        let size = if announced == 0 {
            ModuleInfoData::SIZE
        } else {
            announced
        };
        let packet = channel.read_data_sized(size)?;
        let data = ModuleInfoData::parse_lenient(&packet.payload);

        let info = ModuleInfo {
            sensor: data.sensor_name(),
            engine_version: data.engine_version_string(),
            raw_image_width: data.raw_img_width,
            raw_image_height: data.raw_img_height,
            image_width: data.img_width,
            image_height: data.img_height,
            max_record_count: data.max_record_count,
            enroll_count: data.enroll_count,
            template_size: data.template_size,
        };

        info!("{}", info);
        Ok(info)
    }

    /// End the session, reset the baud rate and release the transport
    ///
    /// Sends CLOSE, then CHANGE_BAUDRATE with the configured reset rate.
    /// Failures are logged, not returned. Calling this more than once is
    /// harmless.
    pub fn close(&mut self) {
        if !self.transport.is_open() {
            self.session.close();
            return;
        }

        info!("Closing {}...", self.transport.port_name());

        let baud_rate = self.config.reset_baud_rate;
        for (command, parameter) in [(Command::Close, 0), (Command::ChangeBaudRate, baud_rate)] {
            match self.channel().send(command, parameter) {
                Ok(response) if response.is_ack() => debug!("{} acknowledged", command),
                Ok(response) => warn!("{}", DeviceError::new(command, response.parameter)),
                Err(e) => warn!("{} failed: {}", command, e),
            }
        }

        if let Err(e) = self.transport.close() {
            error!("Could not close {}: {}", self.transport.port_name(), e);
        }
        self.session.close();

        info!("Closed");
    }

    /// Run the module's USB self check
    pub fn usb_internal_check(&mut self) -> Result<bool> {
        Ok(self.request(Command::UsbInternalCheck, 0)?.is_some())
    }

    /// Ask the module to switch baud rate
    pub fn change_baud_rate(&mut self, baud_rate: u32) -> Result<bool> {
        Ok(self.request(Command::ChangeBaudRate, baud_rate)?.is_some())
    }

    /// Switch baud rate on both ends of a serial link
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedOption`] on links without a baud
    /// rate.
    pub fn change_baud_rate_and_reopen(&mut self, baud_rate: u32) -> Result<bool> {
        let kind = self.transport.kind();
        if !kind.supports_baud_rate() {
            return Err(ConfigError::UnsupportedOption {
                option: "baud_rate",
                kind,
            }
            .into());
        }

        if !self.change_baud_rate(baud_rate)? {
            return Ok(false);
        }
        self.transport.reopen(baud_rate)?;

        info!("Now talking at {} baud", baud_rate);
        Ok(true)
    }

    /// Switch the sensor backlight
    pub fn set_led(&mut self, on: bool) -> Result<bool> {
        prompt::set_led(&mut self.channel(), on)
    }

    /// Check if a finger rests on the sensor
    pub fn is_finger_pressed(&mut self) -> Result<bool> {
        prompt::is_finger_pressed(&mut self.channel())
    }

    /// Poll until a finger is pressed
    ///
    /// Returns `false` if the wait was cancelled. The LED is left as is.
    pub fn wait_for_finger_press(&mut self) -> Result<bool> {
        let mut channel = CommandChannel::new(&mut *self.transport);
        FingerPrompt::new(&self.session, self.config.prompt_interval).wait(&mut channel)
    }

    /// Light the sensor, wait for a finger and run `action`
    ///
    /// The LED is off again when this returns.
    pub fn prompt_and_run<T>(
        &mut self,
        action: impl FnOnce(&mut CommandChannel<'_>) -> Result<T>,
    ) -> Result<PromptOutcome<T>> {
        let mut channel = CommandChannel::new(&mut *self.transport);
        FingerPrompt::new(&self.session, self.config.prompt_interval).run(&mut channel, action)
    }

    pub(crate) fn prompt_and_capture(
        &mut self,
        best_image: bool,
    ) -> Result<PromptOutcome<std::result::Result<u32, DeviceError>>> {
        self.prompt_and_run(|channel| {
            let response = channel.send(Command::Capture, u32::from(best_image))?;
            Ok(response.check(Command::Capture))
        })
    }

    /// Capture a fingerprint into the module's memory
    pub fn capture(&mut self, best_image: bool) -> Result<bool> {
        Ok(self.request(Command::Capture, u32::from(best_image))?.is_some())
    }

    /// Download the last captured image
    pub fn get_image(&mut self) -> Result<Option<FingerprintImage>> {
        if self.request(Command::GetImage, 0)?.is_none() {
            return Ok(None);
        }

        info!("Downloading image...");
        let data: ImageData = self.channel().read_data()?;
        Ok(Some(FingerprintImage::new(
            image::WIDTH,
            image::HEIGHT,
            data.pixels,
        )?))
    }

    /// Download a live low-resolution frame
    ///
    /// The LED must be on while this runs, see [`Device::raw_image_safe`].
    pub fn raw_image(&mut self) -> Result<Option<FingerprintImage>> {
        if self.request(Command::GetRawImage, 0)?.is_none() {
            return Ok(None);
        }

        debug!("Downloading raw image...");
        let data: RawImageData = self.channel().read_data()?;
        Ok(Some(FingerprintImage::new(
            raw_image::WIDTH,
            raw_image::HEIGHT,
            data.pixels,
        )?))
    }

    /// Download a live frame with the LED held on around the transfer
    pub fn raw_image_safe(&mut self) -> Result<Option<FingerprintImage>> {
        self.set_led(true)?;
        let result = self.raw_image();

        match (result, self.set_led(false)) {
            (Ok(image), Ok(_)) => Ok(image),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), led) => {
                if let Err(led_err) = led {
                    warn!("Could not switch the LED off: {}", led_err);
                }
                Err(e)
            }
        }
    }

    /// Prompt for a finger, capture it and download the image
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`](crate::Error::Cancelled) if the prompt was cancelled.
    pub fn capture_and_get_image(&mut self) -> Result<Option<FingerprintImage>> {
        if let Err(e) = self.prompt_and_capture(false)?.into_result()? {
            warn!("{}", e);
            return Ok(None);
        }
        self.get_image()
    }

    /// Prompt for a finger and write its image to `path` as BMP
    ///
    /// Returns `false` if no image could be captured.
    pub fn save_image_to_bmp(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let Some(image) = self.capture_and_get_image()? else {
            return Ok(false);
        };

        image.save_bmp(path.as_ref())?;
        info!("Saved image to {}", path.as_ref().display());
        Ok(true)
    }

    /// Prompt for a finger and look it up in the database
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`](crate::Error::Cancelled) if the prompt was cancelled.
    pub fn identify(&mut self) -> Result<Option<u32>> {
        if let Err(e) = self.prompt_and_capture(false)?.into_result()? {
            warn!("{}", e);
            return Ok(None);
        }

        let id = self.request(Command::Identify, 0)?;
        if let Some(id) = id {
            info!("Identified user {}", id);
        }
        Ok(id)
    }

    /// Prompt for a finger and match it against `id`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`](crate::Error::Cancelled) if the prompt was cancelled.
    pub fn verify(&mut self, id: u32) -> Result<bool> {
        if let Err(e) = self.prompt_and_capture(false)?.into_result()? {
            warn!("{}", e);
            return Ok(false);
        }

        Ok(self.request(Command::Verify, id)?.is_some())
    }

    /// Number of enrolled fingerprints
    pub fn enrolled_count(&mut self) -> Result<Option<u32>> {
        self.request(Command::EnrollCount, 0)
    }

    /// Check if `id` holds a template
    pub fn is_id_enrolled(&mut self, id: u32) -> Result<bool> {
        Ok(self.request(Command::CheckEnrolled, id)?.is_some())
    }

    /// Delete the template stored under `id`
    pub fn delete_id(&mut self, id: u32) -> Result<bool> {
        Ok(self.request(Command::DeleteId, id)?.is_some())
    }

    /// Delete every stored template
    pub fn delete_all(&mut self) -> Result<bool> {
        Ok(self.request(Command::DeleteAll, 0)?.is_some())
    }

    /// Send a command by catalog name and return the raw response
    pub fn send_named(&mut self, name: &str, parameter: u32) -> Result<ResponsePacket> {
        self.channel().send_named(name, parameter)
    }

    /// Firmware version from the last open, bare lower-case hex
    pub fn firmware_version(&self) -> Option<String> {
        self.session
            .open_data()
            .map(|data| data.firmware_version_string())
    }

    /// ISO area size from the last open
    pub fn iso_area_max_size(&self) -> Option<u32> {
        self.session.open_data().map(|data| data.iso_area_max_size)
    }

    /// Serial number from the last open, upper-case hex
    pub fn device_serial_number(&self) -> Option<String> {
        self.session.open_data().map(|data| data.serial_number_hex())
    }

    /// Everything cached by the last open
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.session.open_data().map(|data| device_info(&data))
    }

    // Helper methods

    pub(crate) fn channel(&mut self) -> CommandChannel<'_> {
        CommandChannel::new(&mut *self.transport)
    }

    /// Send a command; `None` (logged) if it was refused
    fn request(&mut self, command: Command, parameter: u32) -> Result<Option<u32>> {
        let response = self.channel().send(command, parameter)?;

        match response.check(command) {
            Ok(output) => Ok(Some(output)),
            Err(e) => {
                warn!("{}", e);
                Ok(None)
            }
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.close();
    }
}

fn device_info(data: &OpenData) -> DeviceInfo {
    DeviceInfo::new(
        data.firmware_version_string(),
        data.iso_area_max_size,
        data.serial_number_hex(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::channel::tests::MockLink;
    use gt521f32_core::CommandPacket;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_port() {
        let result = Device::new("/tmp/not-a-sensor");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_block_link_rejects_baud_change() {
        let mut link = MockLink::new();
        link.expect_kind().return_const(TransportKind::BlockPassthrough);
        link.expect_is_open().return_const(false);
        link.expect_write().never();

        let mut device = Device::with_transport(Box::new(link));
        let result = device.change_baud_rate_and_reopen(115_200);

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::UnsupportedOption { .. }))
        ));
    }

    fn is_command(data: &[u8], command: Command, parameter: u32) -> bool {
        CommandPacket::decode(data).ok() == Some(CommandPacket::new(command, parameter))
    }

    #[test]
    fn test_drop_sends_close_then_resets_baud_rate() {
        let mut seq = Sequence::new();
        let mut link = MockLink::new();

        link.expect_is_open()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        link.expect_port_name().return_const("/dev/ttyUSB0".to_string());
        link.expect_kind().return_const(TransportKind::Stream);
        link.expect_write()
            .withf(|data| is_command(data, Command::Close, 0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        link.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ResponsePacket::ack(0).encode()));
        link.expect_write()
            .withf(|data| is_command(data, Command::ChangeBaudRate, 9600))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        link.expect_read()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ResponsePacket::ack(0).encode()));
        link.expect_close()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        drop(Device::with_transport(Box::new(link)));
    }

    #[test]
    fn test_block_link_close_resets_baud_rate() {
        let mut link = MockLink::new();
        link.expect_is_open().times(1).return_const(true);
        link.expect_is_open().return_const(false);
        link.expect_port_name().return_const("/dev/sg2".to_string());
        link.expect_kind().return_const(TransportKind::BlockPassthrough);
        link.expect_write()
            .withf(|data| is_command(data, Command::Close, 0))
            .times(1)
            .returning(|_| Ok(()));
        link.expect_write()
            .withf(|data| is_command(data, Command::ChangeBaudRate, 9600))
            .times(1)
            .returning(|_| Ok(()));
        link.expect_read()
            .times(2)
            .returning(|_| Ok(ResponsePacket::ack(0).encode()));
        link.expect_close().times(1).returning(|| Ok(()));

        let mut device = Device::with_transport(Box::new(link));
        device.close();

        assert!(device.session().is_closed());
    }

    #[test]
    fn test_close_failure_is_swallowed() {
        let mut link = MockLink::new();
        link.expect_is_open().return_const(true);
        link.expect_port_name().return_const("E:".to_string());
        link.expect_kind().return_const(TransportKind::BlockPassthrough);
        // CLOSE and CHANGE_BAUDRATE, here and again on drop
        link.expect_write()
            .times(4)
            .returning(|_| Err(gt521f32_transport::Error::NotOpen));
        link.expect_read().never();
        link.expect_close()
            .times(2)
            .returning(|| Err(gt521f32_transport::Error::NotOpen));

        let mut device = Device::with_transport(Box::new(link));
        device.close();

        assert!(device.session().is_closed());
    }

    #[test]
    fn test_cached_accessors_before_open() {
        let mut link = MockLink::new();
        link.expect_is_open().return_const(false);

        let device = Device::with_transport(Box::new(link));

        assert_eq!(device.firmware_version(), None);
        assert_eq!(device.iso_area_max_size(), None);
        assert_eq!(device.device_serial_number(), None);
        assert_eq!(device.device_info(), None);
    }

    #[test]
    fn test_builders() {
        let mut link = MockLink::new();
        link.expect_is_open().return_const(false);

        let device = Device::with_transport(Box::new(link))
            .with_prompt_interval(Duration::from_millis(5))
            .with_enroll_attempts(5)
            .with_image_dir("/tmp/enroll");

        assert_eq!(device.config().prompt_interval, Duration::from_millis(5));
        assert_eq!(device.config().enroll_attempts, 5);
        assert_eq!(device.config().image_dir, PathBuf::from("/tmp/enroll"));
    }
}
