//! Hardware PWM, software PWM, and servo control.
//!
//! The firmware cannot report PWM settings back, so every read here returns
//! the host-side mirror in [`MirroredState`](crate::MirroredState). If
//! something else reconfigures the device the mirror goes stale.

use crate::consts::{pwm, version, Function};
use crate::device::LittleWire;
use crate::error::{Error, Result};
use crate::pins::{resolve, Namespace, PinRef};
use crate::transport::Transport;
use log::debug;

/// Number of hardware PWM compare channels.
pub const HARDWARE_PWM_CHANNELS: usize = 2;
/// Number of software PWM channels.
pub const SOFTWARE_PWM_CHANNELS: usize = 3;

fn channel_index<'p>(
    namespace: Namespace,
    channel: impl Into<PinRef<'p>>,
    count: usize,
) -> Result<usize> {
    let id = usize::from(resolve(namespace, channel)?);
    if id >= count {
        return Err(Error::InvalidArgument(format!(
            "{} channel {} out of range (0-{})",
            namespace,
            id,
            count - 1
        )));
    }
    Ok(id)
}

/// Maps a servo angle in degrees (nominally -90 to +90) to a duty value at
/// the 1024 prescale.
pub fn servo_angle_to_value(angle: f64) -> u8 {
    let step = ((angle + 90.0) / pwm::SERVO_DEGREES_PER_STEP).round() + pwm::SERVO_OFFSET;
    (step as i64).rem_euclid(256) as u8
}

/// Inverse of [`servo_angle_to_value`].
pub fn servo_value_to_angle(value: u8) -> f64 {
    (f64::from(value) - pwm::SERVO_OFFSET) * pwm::SERVO_DEGREES_PER_STEP - 90.0
}

impl<T: Transport> LittleWire<T> {
    // --- Hardware PWM ---

    /// Starts or stops the hardware PWM timer. Sends nothing if the mirror
    /// already holds `enabled`.
    pub fn set_hardware_pwm_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.state.hardware_pwm_enabled == Some(enabled) {
            return Ok(());
        }
        let function = if enabled {
            Function::StartPwm
        } else {
            Function::StopPwm
        };
        debug!("Hardware PWM enabled={}", enabled);
        self.control_out(function, 0, 0)?;
        self.state.hardware_pwm_enabled = Some(enabled);
        Ok(())
    }

    /// Last values written to both hardware PWM channels.
    pub fn hardware_pwm(&self) -> [u8; HARDWARE_PWM_CHANNELS] {
        self.state.hardware_pwm
    }

    /// Writes both hardware PWM channels in one request, enabling the timer
    /// first if needed.
    pub fn set_hardware_pwm(&mut self, values: [u8; HARDWARE_PWM_CHANNELS]) -> Result<()> {
        self.set_hardware_pwm_enabled(true)?;
        debug!("Hardware PWM compare = {:?}", values);
        self.control_out(
            Function::UpdatePwmCompare,
            values[0].into(),
            values[1].into(),
        )?;
        self.state.hardware_pwm = values;
        Ok(())
    }

    /// Writes one hardware PWM channel. `value` is taken modulo 256. The
    /// other channel keeps its last written value.
    pub fn hardware_pwm_write<'p>(
        &mut self,
        channel: impl Into<PinRef<'p>>,
        value: u32,
    ) -> Result<()> {
        let index = channel_index(Namespace::HardwarePwm, channel, HARDWARE_PWM_CHANNELS)?;
        let mut values = self.state.hardware_pwm;
        values[index] = (value % 256) as u8;
        self.set_hardware_pwm(values)
    }

    /// Last value written to a hardware PWM channel. Never queries the device.
    pub fn hardware_pwm_read<'p>(&self, channel: impl Into<PinRef<'p>>) -> Result<u8> {
        let index = channel_index(Namespace::HardwarePwm, channel, HARDWARE_PWM_CHANNELS)?;
        Ok(self.state.hardware_pwm[index])
    }

    /// Last prescaler division written, if any.
    pub fn hardware_pwm_prescale(&self) -> Option<u16> {
        self.state.hardware_pwm_prescale
    }

    /// Sets the timer prescaler. `division` must be 1, 8, 64, 256 or 1024.
    ///
    /// Larger divisions give lower PWM frequencies; 1024 is about 63Hz.
    pub fn set_hardware_pwm_prescale(&mut self, division: u16) -> Result<()> {
        let index = pwm::PRESCALE_DIVISIONS
            .iter()
            .position(|&d| d == division)
            .ok_or(Error::InvalidPrescale(division))?;
        if self.state.hardware_pwm_prescale == Some(division) {
            return Ok(());
        }
        debug!("Hardware PWM prescale = {} (index {})", division, index);
        self.control_out(Function::ChangePwmPrescale, index as u16, 0)?;
        self.state.hardware_pwm_prescale = Some(division);
        Ok(())
    }

    // --- Software PWM ---

    /// Starts or stops the software PWM engine. Needs firmware 1.1.
    pub fn set_software_pwm_enabled(&mut self, enabled: bool) -> Result<()> {
        self.require_firmware("Software PWM", version::SOFTWARE_PWM)?;
        if self.state.software_pwm_enabled == Some(enabled) {
            return Ok(());
        }
        debug!("Software PWM enabled={}", enabled);
        self.control_out(Function::InitSoftPwm, u16::from(enabled), 0)?;
        self.state.software_pwm_enabled = Some(enabled);
        Ok(())
    }

    /// Last values written to the three software PWM channels.
    pub fn software_pwm(&self) -> [u8; SOFTWARE_PWM_CHANNELS] {
        self.state.software_pwm
    }

    /// Writes all three software PWM channels in one request.
    pub fn set_software_pwm(&mut self, values: [u8; SOFTWARE_PWM_CHANNELS]) -> Result<()> {
        self.set_software_pwm_enabled(true)?;
        debug!("Software PWM = {:?}", values);
        let value = u16::from_le_bytes([values[0], values[1]]);
        self.control_out(Function::UpdateSoftPwm, value, values[2].into())?;
        self.state.software_pwm = values;
        Ok(())
    }

    /// Writes one software PWM channel, modulo 256.
    pub fn software_pwm_write<'p>(
        &mut self,
        channel: impl Into<PinRef<'p>>,
        value: u32,
    ) -> Result<()> {
        let index = channel_index(Namespace::SoftwarePwm, channel, SOFTWARE_PWM_CHANNELS)?;
        let mut values = self.state.software_pwm;
        values[index] = (value % 256) as u8;
        self.set_software_pwm(values)
    }

    /// Last value written to a software PWM channel. Never queries the device.
    pub fn software_pwm_read<'p>(&self, channel: impl Into<PinRef<'p>>) -> Result<u8> {
        let index = channel_index(Namespace::SoftwarePwm, channel, SOFTWARE_PWM_CHANNELS)?;
        Ok(self.state.software_pwm[index])
    }

    // --- Servo ---

    /// Points a servo on a hardware PWM channel at `angle` degrees.
    ///
    /// Forces the prescaler to 1024, which also slows the other channel.
    pub fn servo_write<'p>(&mut self, channel: impl Into<PinRef<'p>>, angle: f64) -> Result<()> {
        let channel = channel.into();
        self.set_hardware_pwm_prescale(pwm::SERVO_PRESCALE)?;
        let value = servo_angle_to_value(angle);
        debug!("Servo {} -> {} degrees (duty {})", channel, angle, value);
        self.hardware_pwm_write(channel, value.into())
    }

    /// Angle last written to a servo, recovered from the mirrored duty value.
    pub fn servo_read<'p>(&self, channel: impl Into<PinRef<'p>>) -> Result<f64> {
        Ok(servo_value_to_angle(self.hardware_pwm_read(channel)?))
    }
}
