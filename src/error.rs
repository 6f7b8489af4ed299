use crate::firmware::FirmwareVersion;
use crate::pins::Namespace;
use thiserror::Error;

/// Errors that can occur when using a LittleWire device.
///
/// Argument and firmware errors are raised locally, before any control
/// transfer is issued. Transport errors come from the USB layer and are
/// passed through unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or claim the USB device.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A control transfer failed or timed out.
    #[error("USB control transfer failed: {0}")]
    Transport(#[from] nusb::transfer::TransferError),
    /// No LittleWire device was found on the bus.
    #[error("No LittleWire device found (VID 1781, PID 0C9F, product \"USBtinySPI\")")]
    DeviceNotFound,
    /// A transfer was attempted on a transport that is not open.
    #[error("Device handle is not open")]
    NotConnected,
    /// The device returned fewer bytes than the request needs.
    #[error("Short response from device (expected {expected} bytes, got {actual})")]
    ShortResponse {
        /// Bytes the operation needs.
        expected: usize,
        /// Bytes actually received.
        actual: usize,
    },
    /// Function argument is outside the valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Pin alias is not in the namespace table and is not a raw identifier.
    #[error("Unknown {namespace} pin '{name}'")]
    UnknownPin {
        /// Namespace the lookup ran in.
        namespace: Namespace,
        /// The alias that failed to resolve.
        name: String,
    },
    /// Pin mode symbol is neither input nor output.
    #[error("Unknown pin mode '{0}' (expected input or output)")]
    UnknownMode(String),
    /// Hardware PWM prescaler division is not one of the supported values.
    #[error("Unsupported hardware PWM prescale {0}, must be one of 1, 8, 64, 256, 1024")]
    InvalidPrescale(u16),
    /// I2C address does not fit in 7 bits.
    #[error("I2C address {0} out of range (0-127)")]
    I2cAddressOutOfRange(u8),
    /// Wiring style name is not in the wiring table.
    #[error("Unknown wiring style '{0}'")]
    UnknownWiring(String),
    /// Wiring aliases point at each other without reaching a transform.
    #[error("Wiring style '{0}' does not resolve to a transform (alias loop)")]
    WiringAliasLoop(String),
    /// Operation name is neither a canonical name nor a known alias.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
    /// Requested operation exceeds device or protocol limits.
    #[error("Requested operation size is too large (max {max}, got {actual})")]
    OperationTooLarge {
        /// Maximum allowed size for this operation.
        max: usize,
        /// Actual size requested.
        actual: usize,
    },
    /// The connected firmware is older than the release that added a feature.
    #[error(
        "{feature} requires LittleWire firmware {required} or newer (device runs {actual}); install a newer firmware"
    )]
    UnsupportedFirmware {
        /// Feature that was requested.
        feature: &'static str,
        /// Minimum firmware that provides it.
        required: FirmwareVersion,
        /// Firmware reported by the device.
        actual: FirmwareVersion,
    },
    /// No I2C device acknowledged the start condition.
    #[error("I2C device at address 0x{address:02X} unresponsive")]
    DeviceUnresponsive {
        /// The 7-bit address that was started.
        address: u8,
    },
}

impl Error {
    /// Whether the failure may clear up when the whole operation is repeated.
    ///
    /// Only I/O level transport failures qualify; argument, firmware and bus
    /// acknowledgement errors never do.
    pub fn is_transient(&self) -> bool {
        use nusb::transfer::TransferError;
        match self {
            Error::Io(_) => true,
            Error::Transport(e) => !matches!(e, TransferError::Disconnected),
            Error::ShortResponse { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for LittleWire operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn unsupported_firmware(
    feature: &'static str,
    required: i8,
    actual: FirmwareVersion,
) -> Error {
    Error::UnsupportedFirmware {
        feature,
        required: FirmwareVersion::from_code(required),
        actual,
    }
}
