//! Device discovery, session management, and raw control requests.

use crate::analog::VoltageReference;
use crate::consts::{self, Function};
use crate::error::{unsupported_firmware, Error, Result};
use crate::firmware::{Capabilities, FirmwareVersion};
use crate::pins::{self, Namespace};
use crate::transport::{self, Transport, UsbTransport, WireInfo};
use log::{debug, warn};
use std::time::Duration;

/// Construction-time settings for a [`LittleWire`] session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Timeout applied to every control transfer.
    pub timeout: Duration,
    /// Write several digital pins with one port-wide request.
    ///
    /// Only honoured on firmware 1.1, and unreliable there; leave off unless
    /// you have verified it on your hardware.
    pub experimental_bulk_write: bool,
    /// Allow [`LittleWire::retry_once`] to repeat an operation after a
    /// transient transport error.
    pub retry_transient: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout: consts::DEFAULT_TIMEOUT,
            experimental_bulk_write: false,
            retry_transient: true,
        }
    }
}

impl Config {
    /// Sets the per-transfer timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables the bitmap digital write.
    pub fn experimental_bulk_write(mut self, enable: bool) -> Self {
        self.experimental_bulk_write = enable;
        self
    }

    /// Enables or disables the retry-once policy.
    pub fn retry_transient(mut self, enable: bool) -> Self {
        self.retry_transient = enable;
        self
    }
}

/// Host-side copy of device state that the firmware cannot report back.
///
/// Every field equals the last value successfully written to the device.
/// `None` means the state has not been set during this process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirroredState {
    pub hardware_pwm_enabled: Option<bool>,
    pub hardware_pwm_prescale: Option<u16>,
    pub hardware_pwm: [u8; 2],
    pub software_pwm_enabled: Option<bool>,
    pub software_pwm: [u8; 3],
    pub analog_reference: Option<VoltageReference>,
    pub(crate) bulk_write_bitmap: u8,
}

/// A value read or written through the unified pin namespace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Logic level of a digital pin.
    Digital(bool),
    /// Normalised ADC reading in `[0, 1)`.
    Analog(f64),
    /// PWM duty value.
    Pwm(u8),
}

/// A handle to a LittleWire device.
///
/// The USB handle is opened lazily by the first operation that needs the
/// wire and released by [`LittleWire::finished`] or on drop.
///
/// **Note:** Sessions assume exclusive, sequential access. Wrap the whole
/// handle in a mutex if several threads need it; interleaving transfers from
/// two operations corrupts device state.
#[derive(Debug)]
pub struct LittleWire<T: Transport = UsbTransport> {
    pub(crate) transport: T,
    pub(crate) config: Config,
    pub(crate) version: Option<FirmwareVersion>,
    pub(crate) state: MirroredState,
    pub(crate) i2c_initialized: bool,
}

impl LittleWire<UsbTransport> {
    // --- Constructors ---

    /// Every LittleWire connected to this computer, unopened.
    pub fn all() -> Result<Vec<Self>> {
        Ok(transport::find_all()?
            .into_iter()
            .map(|info| Self::new(info, Config::default()))
            .collect())
    }

    /// The first LittleWire found. Convenient when only one is plugged in.
    pub fn connect() -> Result<Self> {
        let info = transport::find_first()?;
        Ok(Self::new(info, Config::default()))
    }

    /// The first LittleWire found, with custom settings.
    pub fn connect_with_config(config: Config) -> Result<Self> {
        let info = transport::find_first()?;
        Ok(Self::new(info, config))
    }

    /// Wraps a discovered device. Does not talk to the device.
    pub fn new(info: WireInfo, config: Config) -> Self {
        Self::with_transport(UsbTransport::new(info), config)
    }

    /// Information about the underlying USB device.
    pub fn device_info(&self) -> &WireInfo {
        self.transport.info()
    }
}

impl<T: Transport> LittleWire<T> {
    /// Creates a session over any transport. Does not talk to the device.
    pub fn with_transport(transport: T, config: Config) -> Self {
        LittleWire {
            transport,
            config,
            version: None,
            state: MirroredState::default(),
            i2c_initialized: false,
        }
    }

    /// The settings this session was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Host-side mirror of PWM and ADC settings.
    pub fn mirrored_state(&self) -> &MirroredState {
        &self.state
    }

    /// The transport this session talks through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Releases the USB handle so other programs can use the device.
    ///
    /// Any later operation claims it again and starts a new session.
    pub fn finished(&mut self) {
        if self.transport.is_open() {
            debug!("Finishing LittleWire session");
        }
        self.transport.close();
        self.version = None;
        self.i2c_initialized = false;
    }

    // --- Session ---

    /// Opens the handle if needed and performs the version handshake once.
    pub(crate) fn ensure_session(&mut self) -> Result<FirmwareVersion> {
        if !self.transport.is_open() {
            self.transport.open()?;
        }
        if let Some(version) = self.version {
            return Ok(version);
        }
        let mut buf = [0u8; 1];
        let received = self.transport.control_in(
            Function::Version.code(),
            0,
            0,
            &mut buf,
            self.config.timeout,
        )?;
        if received < 1 {
            return Err(Error::ShortResponse {
                expected: 1,
                actual: received,
            });
        }
        let version = FirmwareVersion::from_byte(buf[0]);
        debug!("LittleWire firmware version {}", version);
        if !version.is_supported() {
            warn!(
                "Unknown LittleWire firmware version {} might cause problems",
                version
            );
        } else if !version.is_newest() {
            warn!(
                "LittleWire is running old firmware version {} - some features might not work",
                version
            );
        }
        self.version = Some(version);
        Ok(version)
    }

    /// Firmware version of the device, queried once per session.
    pub fn version(&mut self) -> Result<FirmwareVersion> {
        self.ensure_session()
    }

    /// Features available with the connected firmware.
    pub fn capabilities(&mut self) -> Result<Capabilities> {
        Ok(Capabilities::for_version(self.version()?))
    }

    /// Fails with `UnsupportedFirmware` unless the firmware is at least
    /// `required`. Issues no transfer once the version is cached.
    pub(crate) fn require_firmware(&mut self, feature: &'static str, required: i8) -> Result<()> {
        let version = self.version()?;
        if version.at_least(required) {
            Ok(())
        } else {
            Err(unsupported_firmware(feature, required, version))
        }
    }

    /// Runs `op`, and runs it a second time if the first attempt failed with
    /// a transient transport error and [`Config::retry_transient`] is set.
    ///
    /// Multi-transfer operations may leave the device half-updated when they
    /// fail, so only pass operations that are safe to repeat from the start.
    pub fn retry_once<R>(&mut self, mut op: impl FnMut(&mut Self) -> Result<R>) -> Result<R> {
        match op(self) {
            Err(e) if self.config.retry_transient && e.is_transient() => {
                warn!("Transient transport error ({}), retrying operation once", e);
                op(self)
            }
            other => other,
        }
    }

    // --- Control transfers ---

    pub(crate) fn request_out(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
        self.ensure_session()?;
        self.transport
            .control_out(request, value, index, self.config.timeout)
    }

    pub(crate) fn request_in(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.ensure_session()?;
        let mut buf = vec![0u8; len.min(consts::MAX_RESPONSE_LEN)];
        let received =
            self.transport
                .control_in(request, value, index, &mut buf, self.config.timeout)?;
        buf.truncate(received);
        Ok(buf)
    }

    pub(crate) fn control_out(&mut self, function: Function, value: u16, index: u16) -> Result<()> {
        self.request_out(function.code(), value, index)
    }

    pub(crate) fn control_in(
        &mut self,
        function: Function,
        value: u16,
        index: u16,
        len: usize,
    ) -> Result<Vec<u8>> {
        self.request_in(function.code(), value, index, len)
    }

    /// Like [`Self::control_in`] but fails unless at least `len` bytes arrive.
    pub(crate) fn control_in_exact(
        &mut self,
        function: Function,
        value: u16,
        index: u16,
        len: usize,
    ) -> Result<Vec<u8>> {
        let data = self.control_in(function, value, index, len)?;
        if data.len() < len {
            return Err(Error::ShortResponse {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Reads the firmware's 8-byte result buffer.
    pub(crate) fn read_buffer(&mut self) -> Result<Vec<u8>> {
        self.control_in(Function::ReadBuffer, 0, 0, consts::MAX_RESPONSE_LEN)
    }

    // --- Generic requests ---

    /// Echo test: the firmware returns the setup packet it received.
    pub fn echo(&mut self) -> Result<Vec<u16>> {
        let data = self.control_in(Function::Echo, 0, 0, consts::MAX_RESPONSE_LEN)?;
        Ok(data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    /// Reads the whole digital port as one byte.
    pub fn port_read(&mut self) -> Result<u8> {
        let data = self.control_in_exact(Function::Read, 0, 0, 1)?;
        Ok(data[0])
    }

    /// Writes the whole digital port.
    ///
    /// Bit 3 carries USB D-; clearing it drops the device off the bus.
    pub fn port_write(&mut self, byte: u8) -> Result<()> {
        self.control_out(Function::Write, byte.into(), 0)
    }

    /// Sets one bit of the digital port.
    pub fn port_set_bit(&mut self, bit: u8) -> Result<()> {
        self.control_out(Function::SetBit, bit.into(), 0)
    }

    /// Clears one bit of the digital port.
    pub fn port_clear_bit(&mut self, bit: u8) -> Result<()> {
        self.control_out(Function::ClearBit, bit.into(), 0)
    }

    // --- Unified namespace ---

    /// Reads anything addressable by name: digital pins, analog inputs, or
    /// the mirrored value of a PWM channel.
    pub fn get(&mut self, name: &str) -> Result<Value> {
        match pins::generic_lookup(name)? {
            Namespace::Digital => Ok(Value::Digital(self.digital_read(name)?)),
            Namespace::Analog => Ok(Value::Analog(
                self.analog_read(name, VoltageReference::Vcc)?,
            )),
            Namespace::HardwarePwm => Ok(Value::Pwm(self.hardware_pwm_read(name)?)),
            Namespace::SoftwarePwm => Ok(Value::Pwm(self.software_pwm_read(name)?)),
        }
    }

    /// Writes anything addressable by name. Digital pins go high for any
    /// non-zero value; PWM channels take the value modulo 256.
    pub fn set(&mut self, name: &str, value: u32) -> Result<()> {
        match pins::generic_lookup(name)? {
            Namespace::Digital => self.digital_write(name, value != 0),
            Namespace::Analog => Err(Error::InvalidArgument(format!(
                "Analog input '{}' cannot be written",
                name
            ))),
            Namespace::HardwarePwm => self.hardware_pwm_write(name, value),
            Namespace::SoftwarePwm => self.software_pwm_write(name, value),
        }
    }
}

impl<T: Transport> Drop for LittleWire<T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}
