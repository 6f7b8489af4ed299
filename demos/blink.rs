use littlewire::{LittleWire, PinMode, Result};
use std::{thread, time::Duration};

// pin4 is also hardware PWM channel A and MOSI
const BLINK_PIN: &str = "pin4";

fn main() -> Result<()> {
    env_logger::init();
    println!("Opening first LittleWire...");
    let mut wire = LittleWire::connect()?;
    println!("Firmware {}.", wire.version()?);

    wire.pin_mode(BLINK_PIN, PinMode::Output)?;

    println!("Blinking {} (Press Ctrl+C to stop)", BLINK_PIN);
    loop {
        wire.digital_write(BLINK_PIN, true)?;
        thread::sleep(Duration::from_millis(250));
        wire.digital_write(BLINK_PIN, false)?;
        thread::sleep(Duration::from_millis(250));
    }
    // Note: Loop runs forever; the handle is released when the process exits
}
