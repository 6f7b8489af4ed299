//! Firmware version decoding and capability gating.

use crate::consts::version;
use std::fmt;

/// Firmware version code reported by the device.
///
/// The code is a signed byte whose nibbles are the major and minor release
/// numbers, so `0x11` is firmware 1.1. Versions compare numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion(i8);

impl FirmwareVersion {
    /// Wraps a raw version code.
    pub const fn from_code(code: i8) -> Self {
        FirmwareVersion(code)
    }

    /// Decodes the single byte returned by the version request.
    pub fn from_byte(byte: u8) -> Self {
        FirmwareVersion(byte as i8)
    }

    /// Returns the raw version code.
    #[inline]
    pub fn code(&self) -> i8 {
        self.0
    }

    /// Whether this release is one the driver was written against.
    pub fn is_supported(&self) -> bool {
        version::SUPPORTED.contains(&self.0)
    }

    /// Whether this is the newest release the driver knows about.
    pub fn is_newest(&self) -> bool {
        version::SUPPORTED[0] == self.0
    }

    /// Whether the firmware is at least the given version code.
    #[inline]
    pub fn at_least(&self, code: i8) -> bool {
        self.0 >= code
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-0x{:x}", self.0.unsigned_abs())
        } else {
            write!(f, "{:x}.{:x}", self.0 >> 4, self.0 & 0x0F)
        }
    }
}

/// Features available with the connected firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub software_pwm: bool,
    pub spi: bool,
    pub i2c: bool,
    pub ws2811: bool,
    pub onewire: bool,
}

impl Capabilities {
    /// Derives the feature set from a firmware version.
    pub fn for_version(version: FirmwareVersion) -> Self {
        Capabilities {
            software_pwm: version.at_least(version::SOFTWARE_PWM),
            spi: version.at_least(version::SPI),
            i2c: version.at_least(version::I2C),
            ws2811: version.at_least(version::WS2811),
            onewire: version.at_least(version::ONEWIRE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_rendering() {
        assert_eq!(FirmwareVersion::from_code(0x10).to_string(), "1.0");
        assert_eq!(FirmwareVersion::from_code(0x11).to_string(), "1.1");
        assert_eq!(FirmwareVersion::from_code(0x13).to_string(), "1.3");
        assert_eq!(FirmwareVersion::from_code(0x2a).to_string(), "2.a");
        assert_eq!(FirmwareVersion::from_byte(0xFF).to_string(), "-0x1");
    }

    #[test]
    fn test_version_is_signed() {
        let garbage = FirmwareVersion::from_byte(0x80);
        assert_eq!(garbage.code(), -128);
        assert!(garbage < FirmwareVersion::from_code(0x10));
        assert!(!garbage.is_supported());
    }

    #[test]
    fn test_supported_versions() {
        assert!(FirmwareVersion::from_code(0x13).is_newest());
        assert!(FirmwareVersion::from_code(0x11).is_supported());
        assert!(!FirmwareVersion::from_code(0x11).is_newest());
        assert!(!FirmwareVersion::from_code(0x09).is_supported());
    }

    #[test]
    fn test_capabilities_by_version() {
        let v10 = Capabilities::for_version(FirmwareVersion::from_code(0x10));
        assert!(!v10.software_pwm && !v10.i2c && !v10.ws2811);

        let v11 = Capabilities::for_version(FirmwareVersion::from_code(0x11));
        assert!(v11.software_pwm && v11.spi);
        assert!(!v11.i2c && !v11.ws2811 && !v11.onewire);

        let v12 = Capabilities::for_version(FirmwareVersion::from_code(0x12));
        assert!(v12.i2c && v12.ws2811 && v12.onewire);
    }
}
