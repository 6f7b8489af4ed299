use littlewire::{LittleWire, Result};
use std::{thread, time::Duration};

fn main() -> Result<()> {
    env_logger::init();
    let mut wire = LittleWire::connect()?;

    println!("Sweeping servo on pwm_a (pin4). Press Ctrl+C to stop.");
    loop {
        for angle in (-90..=90).step_by(5).chain((-90..=90).rev().step_by(5)) {
            wire.servo_write("pwm_a", f64::from(angle))?;
            print!("\r{:>4} degrees (reads back {:>6.1})", angle, wire.servo_read("pwm_a")?);
            thread::sleep(Duration::from_millis(40));
        }
    }
}
