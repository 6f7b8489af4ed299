//! Internal constants, request codes, and firmware tables.

use std::time::Duration;

// USB identification
/// Vendor ID reported by LittleWire (and Digispark running LittleWire firmware).
pub const LITTLEWIRE_VID: u16 = 0x1781;
/// Product ID reported by LittleWire.
pub const LITTLEWIRE_PID: u16 = 0x0C9F;
/// Product string; the VID/PID pair is shared with other USBtiny gadgets.
pub const LITTLEWIRE_PRODUCT: &str = "USBtinySPI";

/// Default timeout for a single control transfer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Largest IN payload the firmware ever returns.
pub const MAX_RESPONSE_LEN: usize = 8;

/// Request codes understood by the LittleWire firmware.
///
/// Codes 36-39 are reserved. Code 54 drives the WS2812 engine added in
/// firmware 1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Function {
    // Generic requests
    Echo = 0,
    Read = 1,
    Write = 2,
    ClearBit = 3,
    SetBit = 4,
    // Programming requests
    PowerUp = 5,
    PowerDown = 6,
    Spi = 7,
    PollBytes = 8,
    FlashRead = 9,
    FlashWrite = 10,
    EepromRead = 11,
    EepromWrite = 12,
    // IO requests
    PinSetInput = 13,
    PinSetOutput = 14,
    ReadAdc = 15,
    StartPwm = 16,
    UpdatePwmCompare = 17,
    PinSetHigh = 18,
    PinSetLow = 19,
    PinRead = 20,
    SingleSpi = 21,
    ChangePwmPrescale = 22,
    SetupSpi = 23,
    SetupI2c = 24,
    I2cBeginTx = 25,
    I2cAddBuffer = 26,
    I2cSendBuffer = 27,
    SpiAddBuffer = 28,
    SpiSendBuffer = 29,
    I2cRequestFrom = 30,
    SpiUpdateDelay = 31,
    StopPwm = 32,
    DebugSpi = 33,
    Version = 34,
    AnalogInit = 35,
    ReadBuffer = 40,
    OnewireResetPulse = 41,
    OnewireSendByte = 42,
    OnewireReadByte = 43,
    I2cInit = 44,
    I2cBegin = 45,
    I2cRead = 46,
    InitSoftPwm = 47,
    UpdateSoftPwm = 48,
    I2cUpdateDelay = 49,
    OnewireReadBit = 50,
    OnewireWriteBit = 51,
    Pic24fProgramming = 52,
    Pic24fSendSix = 53,
    Ws2812 = 54,
}

impl Function {
    /// Raw `bRequest` value.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

// --- Packed requests ---
// Requests whose high nibble selects the operation and low nibble carries
// the payload length (bits 2:0) and a flag (bit 3).
pub mod packed {
    /// I2C write: low bits = chunk length, bit 3 = send stop.
    pub const I2C_WRITE: u8 = 0xE0;
    /// SPI send: low bits = message length, bit 3 = auto chip-select.
    pub const SPI_SEND: u8 = 0xF0;
    pub const FLAG_BIT: u8 = 1 << 3;
    /// Payload bytes carried by wValue and wIndex together.
    pub const MAX_PAYLOAD: usize = 4;
}

// --- Firmware versions ---
pub mod version {
    /// Known firmware releases, newest first.
    pub const SUPPORTED: [i8; 4] = [0x13, 0x12, 0x11, 0x10];
    pub const SOFTWARE_PWM: i8 = 0x11;
    pub const SPI: i8 = 0x11;
    pub const I2C: i8 = 0x12;
    pub const WS2811: i8 = 0x12;
    pub const ONEWIRE: i8 = 0x12;
    /// Firmware with a broken I2C delay setting.
    pub const I2C_DELAY_BUGGY: i8 = 0x12;
}

// --- Digital port ---
pub mod digital {
    /// Firmware 1.1 bulk-write: forced bits (USB D- stays high).
    pub const BULK_WRITE_DEFAULT_STATE_1_1: u8 = 0b0000_1000;
    /// Firmware 1.1 bulk-write: bits the host may drive.
    pub const BULK_WRITE_MASK_1_1: u8 = 0b0010_0111;
    /// Highest bit of the 8-bit port.
    pub const MAX_PORT_BIT: u8 = 7;
}

// --- ADC ---
pub mod analog {
    /// ADC prescaler setting sent with every reference change.
    pub const SCALING_SETTING: u16 = 0x07;
    /// Full-scale divisor for the 10-bit converter.
    pub const FULL_SCALE: f64 = 1024.0;
    /// Internal 1.1V reference as measured by the temperature sensor scale.
    pub const TEMPERATURE_SCALE: f64 = 1.12;
}

// --- PWM ---
pub mod pwm {
    /// Valid hardware PWM prescaler divisions, indexed by wire value.
    pub const PRESCALE_DIVISIONS: [u16; 5] = [1, 8, 64, 256, 1024];
    /// Servos need the ~63Hz frequency of the largest division.
    pub const SERVO_PRESCALE: u16 = 1024;
    pub const SERVO_OFFSET: f64 = 13.0;
    pub const SERVO_DEGREES_PER_STEP: f64 = 180.0 / 23.0;
}

// --- I2C ---
pub mod i2c {
    pub const MAX_7BIT_ADDRESS: u8 = 0x7F;
    pub const DIRECTION_WRITE: u16 = 0;
    pub const DIRECTION_READ: u16 = 1;
    pub const ADDRESS_COUNT: u8 = 128;
}

// --- WS2811 ---
pub mod ws2811 {
    /// Pixels the firmware can buffer per output call.
    pub const CHANNEL_SIZE: usize = 64;
    pub const MAX_PIN: u8 = 7;
    pub const FLUSH_MARKER: u16 = 0x10;
    pub const PRELOAD_MARKER: u16 = 0x20;
    pub const WRITE_MARKER: u16 = PRELOAD_MARKER | FLUSH_MARKER;
    pub const MICROS_PER_PIXEL: u64 = 30;
    pub const RESET_MICROS: u64 = 1000;
}

// --- One-wire ---
pub mod onewire {
    use std::time::Duration;
    /// Time the firmware needs to finish a bus slot before the next request.
    pub const SETTLE: Duration = Duration::from_millis(3);
}
