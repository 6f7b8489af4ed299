//! Operation names for callers that dispatch by string, such as scripting
//! bridges or REPLs.
//!
//! Every operation has one snake_case canonical name and may have an
//! Arduino-style camelCase alias. The mapping is a fixed table; nothing is
//! rewritten at runtime.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A public operation of [`LittleWire`](crate::LittleWire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Echo,
    PortRead,
    PortWrite,
    PortSetBit,
    PortClearBit,
    PinMode,
    DigitalWrite,
    DigitalRead,
    AnalogRead,
    Temperature,
    HardwarePwmEnabled,
    HardwarePwm,
    HardwarePwmWrite,
    HardwarePwmRead,
    HardwarePwmPrescale,
    SoftwarePwmEnabled,
    SoftwarePwm,
    SoftwarePwmWrite,
    SoftwarePwmRead,
    ServoWrite,
    ServoRead,
    Version,
    Get,
    Set,
    I2c,
    Ws2811,
    Spi,
    OneWire,
    Finished,
}

#[rustfmt::skip]
const OPERATIONS: &[(Operation, &str, Option<&str>)] = &[
    (Operation::Echo, "echo", None),
    (Operation::PortRead, "port_read", Some("portRead")),
    (Operation::PortWrite, "port_write", Some("portWrite")),
    (Operation::PortSetBit, "port_set_bit", Some("portSetBit")),
    (Operation::PortClearBit, "port_clear_bit", Some("portClearBit")),
    (Operation::PinMode, "pin_mode", Some("pinMode")),
    (Operation::DigitalWrite, "digital_write", Some("digitalWrite")),
    (Operation::DigitalRead, "digital_read", Some("digitalRead")),
    (Operation::AnalogRead, "analog_read", Some("analogRead")),
    (Operation::Temperature, "temperature", None),
    (Operation::HardwarePwmEnabled, "hardware_pwm_enabled", Some("hardwarePwmEnabled")),
    (Operation::HardwarePwm, "hardware_pwm", Some("hardwarePwm")),
    (Operation::HardwarePwmWrite, "hardware_pwm_write", Some("hardwarePwmWrite")),
    (Operation::HardwarePwmRead, "hardware_pwm_read", Some("hardwarePwmRead")),
    (Operation::HardwarePwmPrescale, "hardware_pwm_prescale", Some("hardwarePwmPrescale")),
    (Operation::SoftwarePwmEnabled, "software_pwm_enabled", Some("softwarePwmEnabled")),
    (Operation::SoftwarePwm, "software_pwm", Some("softwarePwm")),
    (Operation::SoftwarePwmWrite, "software_pwm_write", Some("softwarePwmWrite")),
    (Operation::SoftwarePwmRead, "software_pwm_read", Some("softwarePwmRead")),
    (Operation::ServoWrite, "servo_write", Some("servoWrite")),
    (Operation::ServoRead, "servo_read", Some("servoRead")),
    (Operation::Version, "version", None),
    (Operation::Get, "get", None),
    (Operation::Set, "set", None),
    (Operation::I2c, "i2c", None),
    (Operation::Ws2811, "ws2811", None),
    (Operation::Spi, "spi", None),
    (Operation::OneWire, "onewire", None),
    (Operation::Finished, "finished", None),
];

impl Operation {
    /// Every operation, in table order.
    pub fn all() -> impl Iterator<Item = Operation> {
        OPERATIONS.iter().map(|&(op, _, _)| op)
    }

    /// Rows are in declaration order, so the discriminant is the row index.
    fn entry(self) -> &'static (Operation, &'static str, Option<&'static str>) {
        &OPERATIONS[self as usize]
    }

    /// The snake_case name.
    pub fn canonical_name(self) -> &'static str {
        self.entry().1
    }

    /// The camelCase alias, if the name has more than one word.
    pub fn camel_case_alias(self) -> Option<&'static str> {
        self.entry().2
    }
}

impl FromStr for Operation {
    type Err = Error;

    /// Accepts the canonical name or its camelCase alias. Matching is exact.
    fn from_str(s: &str) -> Result<Self> {
        OPERATIONS
            .iter()
            .find(|(_, canonical, alias)| *canonical == s || *alias == Some(s))
            .map(|&(op, _, _)| op)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}
