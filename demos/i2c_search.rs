use littlewire::{Error, LittleWire, Result};

fn main() -> Result<()> {
    env_logger::init();
    let mut wire = LittleWire::connect()?;
    println!("Firmware {}.", wire.version()?);

    let mut i2c = match wire.i2c() {
        Ok(i2c) => i2c,
        Err(e @ Error::UnsupportedFirmware { .. }) => {
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    // Some slow sensors need a longer bit time
    i2c.set_delay(10)?;

    println!("Scanning I2C bus (SDA = pin1, SCL = pin2)...");
    let found = i2c.search()?;
    if found.is_empty() {
        println!("No devices found. Are the pull-up resistors fitted?");
    }
    for address in found {
        println!("  device at 0x{:02X}", address);
    }
    Ok(())
}
