//! ADC reads and the on-chip temperature sensor.

use crate::consts::{analog, Function};
use crate::device::LittleWire;
use crate::error::Result;
use crate::pins::{resolve, Namespace, PinRef};
use crate::transport::Transport;
use log::debug;

/// Voltage the ADC compares its input against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum VoltageReference {
    /// Supply voltage, usually 5V.
    #[default]
    Vcc = 0,
    /// Internal 1.1V bandgap.
    Internal1V1 = 1,
    /// Internal 2.56V reference.
    Internal2V56 = 2,
}

impl VoltageReference {
    /// Selector value the firmware expects in the high byte of wValue.
    #[inline]
    pub fn selector(self) -> u8 {
        self as u8
    }
}

impl<T: Transport> LittleWire<T> {
    /// Samples an analog input. Returns a value in `[0, 1)` relative to
    /// `reference`.
    ///
    /// Changing the reference resets the converter first; the firmware does
    /// not apply a new reference reliably without that step.
    pub fn analog_read<'p>(
        &mut self,
        channel: impl Into<PinRef<'p>>,
        reference: VoltageReference,
    ) -> Result<f64> {
        let channel = resolve(Namespace::Analog, channel)?;
        if self.state.analog_reference != Some(reference) {
            debug!("Switching ADC reference to {:?}", reference);
            self.control_out(Function::AnalogInit, analog::SCALING_SETTING, 0)?;
            let setting = analog::SCALING_SETTING | (u16::from(reference.selector()) << 8);
            self.control_out(Function::AnalogInit, setting, 0)?;
            self.state.analog_reference = Some(reference);
        }
        let data = self.control_in_exact(Function::ReadAdc, channel.into(), 0, 2)?;
        let raw = u16::from_le_bytes([data[0], data[1]]);
        debug!("ADC channel {} raw={}", channel, raw);
        Ok(f64::from(raw) / analog::FULL_SCALE)
    }

    /// Raw reading of the chip's internal temperature sensor.
    ///
    /// The result is not in any physical unit. Each chip differs; calibrate
    /// it yourself by fitting a line through readings taken at two known
    /// temperatures.
    pub fn temperature(&mut self) -> Result<f64> {
        let reading = self.analog_read("temperature", VoltageReference::Internal1V1)?;
        Ok(reading * analog::FULL_SCALE / analog::TEMPERATURE_SCALE)
    }
}
