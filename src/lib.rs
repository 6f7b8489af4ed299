//! # littlewire
//!
//! A Rust crate for driving [LittleWire](http://littlewire.github.io) and
//! Digispark boards running the LittleWire firmware from a host computer.
//!
//! The firmware exposes no bulk or interrupt endpoints; every feature is a
//! vendor control request on endpoint 0. This crate uses `nusb` for those
//! transfers, so no kernel driver or libusb installation is needed.
//!
//! ## Features
//!
//! *   Device discovery (`LittleWire::all`, `LittleWire::connect`, `find_all`).
//! *   Symbolic pin names (`"pin4"`, `"mosi"`, `"pwm_a"`, `"temperature"`) with
//!     raw numeric fallback.
//! *   Digital IO:
//!     *   Pin modes (`pin_mode`, `pin_modes`).
//!     *   Single and multi-pin writes (`digital_write`, `digital_write_many`).
//!     *   Multi-pin reads from one port snapshot (`digital_read_many`).
//! *   Analog inputs with selectable reference (`analog_read`) and the on-chip
//!     temperature sensor (`temperature`).
//! *   Hardware PWM (2 channels, selectable prescaler), software PWM
//!     (3 channels, firmware 1.1+), and servo angles.
//! *   I²C master (firmware 1.2+): start/write/read/stop, `transmit`,
//!     `request`, bus `search`.
//! *   WS2811/WS2812 LED strips (firmware 1.2+), up to 64 pixels per pin,
//!     with channel-order wiring styles.
//! *   SPI master (firmware 1.1+) and 1-Wire master with ROM search
//!     (firmware 1.2+).
//! *   Generic access by pin name (`get`, `set`) and an operation name table
//!     for string dispatch (`Operation`).
//!
//! ## Firmware Support
//!
//! Firmware 1.0 to 1.3 are recognised. The version is read once per session
//! and features that need a newer release fail with
//! `Error::UnsupportedFirmware` before anything is sent. Firmware 1.2 has a
//! broken I²C delay setting; a warning is logged when I²C is opened on it.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use littlewire::{LittleWire, PinMode, Result};
//! use std::{thread, time::Duration};
//!
//! fn main() -> Result<()> {
//!     // Optional: Initialize logging
//!     // env_logger::init();
//!
//!     let mut wire = LittleWire::connect()?;
//!     println!("Firmware {}", wire.version()?);
//!
//!     wire.pin_mode("pin4", PinMode::Output)?;
//!     for _ in 0..5 {
//!         wire.digital_write("pin4", true)?;
//!         thread::sleep(Duration::from_millis(200));
//!         wire.digital_write("pin4", false)?;
//!         thread::sleep(Duration::from_millis(200));
//!     }
//!
//!     let light = wire.analog_read("a1", Default::default())?;
//!     println!("Light level: {:.3}", light);
//!
//!     if wire.capabilities()?.i2c {
//!         let found = wire.i2c()?.search()?;
//!         println!("I2C devices: {:02X?}", found);
//!     }
//!
//!     // Let other programs use the device again
//!     wire.finished();
//!     Ok(())
//! }
//! ```
//!
//! ## Hardware Setup Notes
//!
//! *   **Linux udev Rules:** Grant user access to the device. Create
//!     `/etc/udev/rules.d/99-littlewire.rules`:
//!     ```udev
//!     SUBSYSTEM=="usb", ATTRS{idVendor}=="1781", ATTRS{idProduct}=="0c9f", MODE="0666", GROUP="plugdev"
//!     ```
//!     Reload: `sudo udevadm control --reload-rules && sudo udevadm trigger`
//! *   **Pin 3 is RESET:** using it as an IO pin requires the reset fuse to
//!     be disabled, after which the chip can no longer be reprogrammed over
//!     ISP.
//! *   **WS2811 power:** each pixel draws up to 60mA at full white. A USB
//!     port cannot power more than a handful.
//!
//! ## Pin Mapping
//!
//! | Pin  | Digital bit | Analog | Hardware PWM | Other        |
//! |------|-------------|--------|--------------|--------------|
//! | pin1 | 1           |        | 1 (`pwm_b`)  | MISO, SDA    |
//! | pin2 | 2           | 1      |              | SCK, SCL     |
//! | pin3 | 5           | 0      |              | RESET        |
//! | pin4 | 0           |        | 0 (`pwm_a`)  | MOSI         |
//!
//! Analog channel 2 is the temperature sensor.
//!
//! ## Concurrency
//!
//! A [`LittleWire`] handle assumes it is the only thing talking to the device
//! and performs no locking. Share it between threads behind a `Mutex` held
//! for the whole high-level operation.
//!
//! ## License
//!
//! This project is licensed under the WTFPL.

mod consts;
mod device;
mod error;
mod firmware;
pub mod analog;
pub mod gpio;
pub mod i2c;
pub mod onewire;
pub mod operation;
pub mod pins;
pub mod pwm;
pub mod spi;
pub mod transport;
pub mod ws2811;

pub use analog::VoltageReference;
pub use consts::Function;
pub use device::{Config, LittleWire, MirroredState, Value};
pub use error::{Error, Result};
pub use firmware::{Capabilities, FirmwareVersion};
pub use gpio::{Level, PinMode};
pub use i2c::{I2c, I2cDirection};
pub use onewire::OneWire;
pub use operation::Operation;
pub use pins::{Namespace, PinRef};
pub use spi::Spi;
pub use transport::{find_all, find_first, Transport, UsbTransport, WireInfo};
pub use ws2811::{Rgb, Wiring, Ws2811};
// Re-export only essential public constants
pub use consts::{LITTLEWIRE_PID, LITTLEWIRE_PRODUCT, LITTLEWIRE_VID};
