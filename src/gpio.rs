//! Digital pin modes, writes, and port-snapshot reads.

use crate::consts::{digital, Function};
use crate::device::LittleWire;
use crate::error::{Error, Result};
use crate::pins::{resolve, Namespace, PinRef};
use crate::transport::Transport;
use log::debug;
use std::str::FromStr;

/// Pin direction.
///
/// In `Input` mode a pin written high is pulled up to 5V through ~20kΩ and
/// a pin written low floats. In `Output` mode the pin is driven directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

impl FromStr for PinMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(PinMode::Input),
            "output" | "out" => Ok(PinMode::Output),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// Digital logic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Interprets a symbolic level. `off`, `low`, `gnd`, `ground`, `false`,
    /// `0` and the empty string are low; everything else is high.
    pub fn from_alias(alias: &str) -> Self {
        match alias.trim().to_ascii_lowercase().as_str() {
            "off" | "low" | "gnd" | "ground" | "false" | "0" | "" => Level::Low,
            _ => Level::High,
        }
    }

    /// Whether this is the high level.
    #[inline]
    pub fn is_high(&self) -> bool {
        *self == Level::High
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// An absent value counts as low.
impl From<Option<bool>> for Level {
    fn from(value: Option<bool>) -> Self {
        value.unwrap_or(false).into()
    }
}

impl From<&str> for Level {
    fn from(alias: &str) -> Self {
        Level::from_alias(alias)
    }
}

impl<T: Transport> LittleWire<T> {
    // --- Pin modes ---

    /// Sets a pin to input or output mode.
    ///
    /// Be careful not to short an output pin; the device can be damaged.
    pub fn pin_mode<'p>(&mut self, pin: impl Into<PinRef<'p>>, mode: PinMode) -> Result<()> {
        let pin = pin.into();
        let id = resolve(Namespace::Digital, pin)?;
        let function = match mode {
            PinMode::Input => Function::PinSetInput,
            PinMode::Output => Function::PinSetOutput,
        };
        debug!("Setting pin {} (bit {}) to {:?}", pin, id, mode);
        self.control_out(function, id.into(), 0)
    }

    /// Sets the mode of several pins, one request per pin.
    pub fn pin_modes<'p, P, I>(&mut self, modes: I) -> Result<()>
    where
        P: Into<PinRef<'p>>,
        I: IntoIterator<Item = (P, PinMode)>,
    {
        for (pin, mode) in modes {
            self.pin_mode(pin, mode)?;
        }
        Ok(())
    }

    // --- Digital writes ---

    /// Drives a pin high or low. See [`PinMode`] for what that means in
    /// each mode.
    pub fn digital_write<'p>(
        &mut self,
        pin: impl Into<PinRef<'p>>,
        level: impl Into<Level>,
    ) -> Result<()> {
        self.digital_write_many([(pin.into(), level.into())])
    }

    /// Writes several pins.
    ///
    /// Issues one request per pin unless
    /// [`Config::experimental_bulk_write`](crate::Config) is enabled and the
    /// firmware supports the port-wide write.
    pub fn digital_write_many<'p, P, L, I>(&mut self, levels: I) -> Result<()>
    where
        P: Into<PinRef<'p>>,
        L: Into<Level>,
        I: IntoIterator<Item = (P, L)>,
    {
        let resolved = levels
            .into_iter()
            .map(|(pin, level)| Ok((resolve(Namespace::Digital, pin)?, level.into())))
            .collect::<Result<Vec<(u8, Level)>>>()?;

        if self.bulk_write_available()? {
            let outside = resolved.iter().find(|(id, _)| *id > digital::MAX_PORT_BIT);
            if let Some(&(id, _)) = outside {
                return Err(Error::InvalidArgument(format!(
                    "Digital pin bit {} is outside the 8-bit port",
                    id
                )));
            }
            let mut bitmap = self.state.bulk_write_bitmap;
            for &(id, level) in &resolved {
                match level {
                    Level::High => bitmap |= 1 << id,
                    Level::Low => bitmap &= !(1 << id),
                }
            }
            let value =
                (bitmap & digital::BULK_WRITE_MASK_1_1) | digital::BULK_WRITE_DEFAULT_STATE_1_1;
            debug!("Bulk digital write: port=0b{:08b}", value);
            self.control_out(Function::Write, value.into(), 0)?;
            self.state.bulk_write_bitmap = bitmap;
            return Ok(());
        }

        for (id, level) in resolved {
            let function = match level {
                Level::High => Function::PinSetHigh,
                Level::Low => Function::PinSetLow,
            };
            debug!("Digital write bit {} = {:?}", id, level);
            self.control_out(function, id.into(), 0)?;
        }
        Ok(())
    }

    fn bulk_write_available(&mut self) -> Result<bool> {
        if !self.config.experimental_bulk_write {
            return Ok(false);
        }
        Ok(self.version()?.code() == 0x11)
    }

    // --- Digital reads ---

    /// Reads the logic level of one pin. `true` means closer to 5V than 0V.
    pub fn digital_read<'p>(&mut self, pin: impl Into<PinRef<'p>>) -> Result<bool> {
        let levels = self.digital_read_many([pin.into()])?;
        Ok(levels[0])
    }

    /// Reads several pins from a single port snapshot, so all values are
    /// sampled at the same instant with one request.
    pub fn digital_read_many<'p, P, I>(&mut self, pins: I) -> Result<Vec<bool>>
    where
        P: Into<PinRef<'p>>,
        I: IntoIterator<Item = P>,
    {
        let ids = pins
            .into_iter()
            .map(|pin| resolve(Namespace::Digital, pin))
            .collect::<Result<Vec<u8>>>()?;
        if ids.is_empty() {
            return Err(Error::InvalidArgument(
                "digital_read needs at least one pin".to_string(),
            ));
        }
        if let Some(&id) = ids.iter().find(|&&id| id > digital::MAX_PORT_BIT) {
            return Err(Error::InvalidArgument(format!(
                "Digital pin bit {} is outside the 8-bit port",
                id
            )));
        }
        let port = self.port_read()?;
        debug!("Digital port snapshot: 0b{:08b}", port);
        Ok(ids.into_iter().map(|id| (port >> id) & 1 == 1).collect())
    }
}
