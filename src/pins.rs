//! Symbolic pin names and their mapping to firmware identifiers.
//!
//! Every resource on the device lives in one of four namespaces. A physical
//! pin can appear in several of them under different identifiers: `pin4` is
//! bit 0 of the digital port and also hardware PWM channel 0.
//!
//! Names that are not in a namespace table but parse as an integer are
//! passed through unchanged, so callers can address raw identifiers.

use crate::error::{Error, Result};
use std::fmt;

/// Independent identifier spaces used by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Bit positions in the digital port.
    Digital,
    /// ADC multiplexer channels.
    Analog,
    /// Indexes into the two hardware PWM compare registers.
    HardwarePwm,
    /// Indexes into the three software PWM channels.
    SoftwarePwm,
}

impl Namespace {
    /// Alias table for this namespace.
    pub fn table(&self) -> &'static [(&'static str, u8)] {
        match self {
            Namespace::Digital => DIGITAL_PINS,
            Namespace::Analog => ANALOG_PINS,
            Namespace::HardwarePwm => HARDWARE_PWM_PINS,
            Namespace::SoftwarePwm => SOFTWARE_PWM_PINS,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Namespace::Digital => "digital",
            Namespace::Analog => "analog",
            Namespace::HardwarePwm => "hardware PWM",
            Namespace::SoftwarePwm => "software PWM",
        };
        f.write_str(name)
    }
}

/// Bit positions in PORTB. `ds*` names follow the Digispark silkscreen.
#[rustfmt::skip]
const DIGITAL_PINS: &[(&str, u8)] = &[
    ("pin1", 1), ("d1", 1), ("miso", 1), ("pwm_b", 1), ("ds1", 1),
    ("pin2", 2), ("d2", 2), ("sck", 2), ("ds2", 2),
    ("pin3", 5), ("d3", 5), ("reset", 5), ("ds5", 5),
    ("pin4", 0), ("d4", 0), ("mosi", 0), ("pwm_a", 0), ("ds0", 0),
];

/// ADC multiplexer channels; channel 2 is the on-chip temperature sensor.
#[rustfmt::skip]
const ANALOG_PINS: &[(&str, u8)] = &[
    ("a1", 0), ("adc_1", 0), ("reset", 0), ("pin3", 0), ("d3", 0), ("ds5", 0),
    ("a2", 1), ("adc_2", 1), ("sck", 1), ("pin2", 1), ("d2", 1), ("ds2", 1),
    ("temperature", 2), ("temp", 2),
];

/// Channel A is OC0A on pin4, channel B is OC0B on pin1.
#[rustfmt::skip]
const HARDWARE_PWM_PINS: &[(&str, u8)] = &[
    ("pwm_a", 0), ("pwm_1", 0), ("pin4", 0), ("d4", 0), ("mosi", 0), ("ds0", 0),
    ("pwm_b", 1), ("pwm_2", 1), ("pin1", 1), ("d1", 1), ("miso", 1), ("ds1", 1),
];

#[rustfmt::skip]
const SOFTWARE_PWM_PINS: &[(&str, u8)] = &[
    ("softpwm_1", 0), ("softpwm_a", 0),
    ("softpwm_2", 1), ("softpwm_b", 1),
    ("softpwm_3", 2), ("softpwm_c", 2),
];

/// Names understood by [`crate::LittleWire::get`] and [`crate::LittleWire::set`].
const GENERIC_PINS: &[(&str, Namespace)] = &[
    ("d1", Namespace::Digital),
    ("d2", Namespace::Digital),
    ("d3", Namespace::Digital),
    ("d4", Namespace::Digital),
    ("a1", Namespace::Analog),
    ("a2", Namespace::Analog),
    ("adc_1", Namespace::Analog),
    ("adc_2", Namespace::Analog),
    ("temperature", Namespace::Analog),
    ("pwm_1", Namespace::HardwarePwm),
    ("pwm_2", Namespace::HardwarePwm),
    ("pwm_a", Namespace::HardwarePwm),
    ("pwm_b", Namespace::HardwarePwm),
    ("softpwm_1", Namespace::SoftwarePwm),
    ("softpwm_2", Namespace::SoftwarePwm),
    ("softpwm_3", Namespace::SoftwarePwm),
    ("softpwm_a", Namespace::SoftwarePwm),
    ("softpwm_b", Namespace::SoftwarePwm),
    ("softpwm_c", Namespace::SoftwarePwm),
];

/// A pin given either by alias or by raw firmware identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRef<'a> {
    /// Symbolic alias such as `"pin4"` or `"pwm_a"`.
    Name(&'a str),
    /// Raw identifier, used as-is.
    Id(u8),
}

impl<'a> From<&'a str> for PinRef<'a> {
    fn from(name: &'a str) -> Self {
        PinRef::Name(name)
    }
}

impl<'a> From<&'a String> for PinRef<'a> {
    fn from(name: &'a String) -> Self {
        PinRef::Name(name.as_str())
    }
}

impl From<u8> for PinRef<'_> {
    fn from(id: u8) -> Self {
        PinRef::Id(id)
    }
}

impl fmt::Display for PinRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinRef::Name(name) => f.write_str(name),
            PinRef::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Resolves a pin to its identifier within a namespace.
///
/// Pure lookup; never touches the device.
pub fn resolve<'a>(namespace: Namespace, pin: impl Into<PinRef<'a>>) -> Result<u8> {
    match pin.into() {
        PinRef::Id(id) => Ok(id),
        PinRef::Name(name) => {
            if let Some(&(_, id)) = namespace
                .table()
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            {
                return Ok(id);
            }
            name.trim().parse::<u8>().map_err(|_| Error::UnknownPin {
                namespace,
                name: name.to_string(),
            })
        }
    }
}

/// Looks up a name in the unified namespace used for generic access.
pub fn generic_lookup(name: &str) -> Result<Namespace> {
    GENERIC_PINS
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|&(_, namespace)| namespace)
        .ok_or_else(|| Error::InvalidArgument(format!("Unknown pin '{}'", name)))
}
