//! WS2811/WS2812 LED strip output.
//!
//! The firmware buffers up to 64 pixels. Each pixel but the last is sent as
//! a preload request; the last one travels with the output pin and the flush
//! marker, which makes the device clock the whole buffer out to the strip.
//! The device runs with interrupts disabled while it does that, so the host
//! must stay silent for 30µs per pixel plus 1ms afterwards.

use crate::consts::{version, ws2811, Function};
use crate::device::LittleWire;
use crate::error::{Error, Result};
use crate::pins::{resolve, Namespace, PinRef};
use crate::transport::Transport;
use log::{debug, trace};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// An 8-bit-per-channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb::new(r, g, b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb::new(r, g, b)
    }
}

/// `0xRRGGBB`; the top byte is ignored.
impl From<u32> for Rgb {
    fn from(hex: u32) -> Self {
        Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// Channel order of a strip's controller chip.
///
/// Some LEDs wire the controller outputs to different colour dies, so the
/// colour has to be shuffled before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Wiring {
    /// Pass through. Correct for WS2812 LEDs with the chip inside the package.
    #[default]
    Rgb,
    Grb,
    Bgr,
    Gbr,
    Rbg,
    /// Average of the three channels on every channel.
    Greyscale,
}

impl Wiring {
    /// Maps a colour into the strip's channel order.
    pub fn apply(self, c: Rgb) -> Rgb {
        match self {
            Wiring::Rgb => c,
            Wiring::Grb => Rgb::new(c.g, c.r, c.b),
            Wiring::Bgr => Rgb::new(c.b, c.r, c.g),
            Wiring::Gbr => Rgb::new(c.g, c.b, c.r),
            Wiring::Rbg => Rgb::new(c.r, c.b, c.g),
            Wiring::Greyscale => {
                let grey = ((u16::from(c.r) + u16::from(c.g) + u16::from(c.b)) / 3) as u8;
                Rgb::new(grey, grey, grey)
            }
        }
    }
}

impl fmt::Display for Wiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Wiring::Rgb => "rgb",
            Wiring::Grb => "grb",
            Wiring::Bgr => "bgr",
            Wiring::Gbr => "gbr",
            Wiring::Rbg => "rbg",
            Wiring::Greyscale => "greyscale",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
enum WiringEntry {
    Transform(Wiring),
    Alias(&'static str),
}

/// Wiring styles by name. Aliases point at another entry.
const WIRING_TABLE: &[(&str, WiringEntry)] = &[
    ("rgb", WiringEntry::Transform(Wiring::Rgb)),
    ("grb", WiringEntry::Transform(Wiring::Grb)),
    ("bgr", WiringEntry::Transform(Wiring::Bgr)),
    ("gbr", WiringEntry::Transform(Wiring::Gbr)),
    ("rbg", WiringEntry::Transform(Wiring::Rbg)),
    ("greyscale", WiringEntry::Transform(Wiring::Greyscale)),
    // Adafruit Flora pixels v1 modified for 800kHz
    ("florapixel_v1", WiringEntry::Alias("rbg")),
    ("florapixels_v1", WiringEntry::Alias("florapixel_v1")),
    ("ws2812", WiringEntry::Alias("rgb")),
    ("florapixel_v2", WiringEntry::Alias("ws2812")),
    ("florapixels_v2", WiringEntry::Alias("florapixel_v2")),
    ("grayscale", WiringEntry::Alias("greyscale")),
    ("white", WiringEntry::Alias("greyscale")),
];

/// Follows the alias chain from `name` to a transform. Each entry may be
/// visited once, so a loop is reported instead of spinning.
fn resolve_wiring_in(table: &[(&str, WiringEntry)], name: &str) -> Result<Wiring> {
    let mut current = name;
    for _ in 0..=table.len() {
        let entry = table
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(current))
            .map(|&(_, entry)| entry)
            .ok_or_else(|| Error::UnknownWiring(name.to_string()))?;
        match entry {
            WiringEntry::Transform(wiring) => return Ok(wiring),
            WiringEntry::Alias(next) => current = next,
        }
    }
    Err(Error::WiringAliasLoop(name.to_string()))
}

impl FromStr for Wiring {
    type Err = Error;

    /// Resolves a wiring style name, following aliases such as
    /// `florapixels_v1` → `florapixel_v1` → `rbg`.
    fn from_str(s: &str) -> Result<Self> {
        resolve_wiring_in(WIRING_TABLE, s)
    }
}

/// Names accepted by [`Wiring::from_str`].
pub fn wiring_names() -> impl Iterator<Item = &'static str> {
    WIRING_TABLE.iter().map(|(name, _)| *name)
}

/// Time the device is deaf after clocking out `pixels` pixels.
pub fn output_delay(pixels: usize) -> Duration {
    Duration::from_micros(ws2811::MICROS_PER_PIXEL * pixels as u64 + ws2811::RESET_MICROS)
}

/// Borrowed LED strip session obtained from [`LittleWire::ws2811`].
#[derive(Debug)]
pub struct Ws2811<'a, T: Transport> {
    wire: &'a mut LittleWire<T>,
    pin: Option<u8>,
    wiring: Wiring,
    colors: Vec<Rgb>,
    preloaded: usize,
}

impl<T: Transport> LittleWire<T> {
    /// Opens the LED strip sub-protocol. Needs firmware 1.2.
    pub fn ws2811(&mut self) -> Result<Ws2811<'_, T>> {
        self.require_firmware("WS2811", version::WS2811)?;
        Ok(Ws2811 {
            wire: self,
            pin: None,
            wiring: Wiring::default(),
            colors: Vec::new(),
            preloaded: 0,
        })
    }
}

impl<T: Transport> Ws2811<'_, T> {
    /// Selects the digital pin the strip's data line is attached to.
    pub fn set_pin<'p>(&mut self, pin: impl Into<PinRef<'p>>) -> Result<&mut Self> {
        let id = resolve(Namespace::Digital, pin)?;
        // The pin shares wValue's low byte with the flush/write markers
        if id > ws2811::MAX_PIN {
            return Err(Error::InvalidArgument(format!(
                "WS2811 pin bit {} is outside the 8-bit port",
                id
            )));
        }
        self.pin = Some(id);
        Ok(self)
    }

    /// Digital port bit the strip is driven from, if set.
    pub fn pin(&self) -> Option<u8> {
        self.pin
    }

    /// Selects the wiring style by name. Fails without touching the device if
    /// the name does not resolve.
    pub fn set_wiring(&mut self, style: &str) -> Result<&mut Self> {
        self.wiring = style.parse()?;
        debug!("WS2811 wiring '{}' -> {}", style, self.wiring);
        Ok(self)
    }

    pub fn wiring(&self) -> Wiring {
        self.wiring
    }

    /// The colour buffer sent by [`Ws2811::output`].
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut Vec<Rgb> {
        &mut self.colors
    }

    /// Sends the colour buffer to the strip and waits until the device is
    /// listening again.
    pub fn output(&mut self) -> Result<()> {
        let count = self.colors.len();
        if self.preloaded + count > ws2811::CHANNEL_SIZE {
            return Err(Error::OperationTooLarge {
                max: ws2811::CHANNEL_SIZE,
                actual: self.preloaded + count,
            });
        }
        let pin = self.pin.ok_or_else(|| {
            Error::InvalidArgument("WS2811 output pin has not been set".to_string())
        })?;
        let Some((&last, rest)) = self.colors.split_last() else {
            return Ok(());
        };
        let wiring = self.wiring;
        let rest = rest.to_vec();
        debug!("WS2811 output {} pixels on bit {}", count, pin);
        for color in rest {
            self.preload(color)?;
        }
        self.write(wiring.apply(last), pin)
    }

    /// Replaces the colour buffer and outputs it.
    pub fn send<C, I>(&mut self, colors: I) -> Result<()>
    where
        C: Into<Rgb>,
        I: IntoIterator<Item = C>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self.output()
    }

    /// Turns off all 64 pixels the firmware can address. Strips power up in
    /// random colours, so this is a good first call.
    pub fn black(&mut self) -> Result<()> {
        self.send(vec![Rgb::BLACK; ws2811::CHANNEL_SIZE])
    }

    /// Buffers one pixel on the device without transmitting it.
    pub fn preload(&mut self, color: impl Into<Rgb>) -> Result<()> {
        if self.preloaded >= ws2811::CHANNEL_SIZE {
            return Err(Error::OperationTooLarge {
                max: ws2811::CHANNEL_SIZE,
                actual: self.preloaded + 1,
            });
        }
        let c = self.wiring.apply(color.into());
        trace!("WS2811 preload {:?}", c);
        self.transfer(
            u16::from(c.g) << 8 | ws2811::PRELOAD_MARKER,
            u16::from(c.b) << 8 | u16::from(c.r),
        )?;
        self.preloaded += 1;
        Ok(())
    }

    /// Transmits the pixels buffered by [`Ws2811::preload`].
    pub fn flush(&mut self) -> Result<()> {
        let pin = self.pin.ok_or_else(|| {
            Error::InvalidArgument("WS2811 output pin has not been set".to_string())
        })?;
        self.transfer(u16::from(pin) | ws2811::FLUSH_MARKER, 0)?;
        self.finish_flush();
        Ok(())
    }

    /// Buffers the last pixel and flushes in a single request.
    fn write(&mut self, c: Rgb, pin: u8) -> Result<()> {
        self.transfer(
            u16::from(c.g) << 8 | u16::from(pin) | ws2811::WRITE_MARKER,
            u16::from(c.b) << 8 | u16::from(c.r),
        )?;
        self.preloaded += 1;
        self.finish_flush();
        Ok(())
    }

    /// Sends one strip request. The device buffer is unknown after a failure,
    /// so the pixel count restarts from zero.
    fn transfer(&mut self, value: u16, index: u16) -> Result<()> {
        let result = self.wire.control_out(Function::Ws2812, value, index);
        if result.is_err() {
            self.preloaded = 0;
        }
        result
    }

    fn finish_flush(&mut self) {
        let delay = output_delay(self.preloaded);
        trace!("WS2811 flushed {} pixels, holding off {:?}", self.preloaded, delay);
        self.preloaded = 0;
        self.wire.transport.hold_off(delay);
    }
}
