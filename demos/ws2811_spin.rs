use littlewire::{LittleWire, Result, Rgb};
use std::{env, thread, time::Duration};

const PIXELS: usize = 16;

fn main() -> Result<()> {
    env_logger::init();
    // Optional first argument: wiring style, e.g. `grb` or `florapixel_v1`
    let wiring = env::args().nth(1).unwrap_or_else(|| "rgb".to_string());

    let mut wire = LittleWire::connect()?;
    let mut strip = wire.ws2811()?;
    strip.set_pin("pin4")?.set_wiring(&wiring)?;
    strip.black()?;

    println!("Spinning a dot around {} pixels. Press Ctrl+C to stop.", PIXELS);
    let mut head = 0;
    loop {
        let frame = (0..PIXELS).map(|i| match (i + PIXELS - head) % PIXELS {
            0 => Rgb::new(255, 40, 0),
            1 => Rgb::new(60, 10, 0),
            2 => Rgb::new(10, 2, 0),
            _ => Rgb::BLACK,
        });
        strip.send(frame)?;
        head = (head + 1) % PIXELS;
        thread::sleep(Duration::from_millis(50));
    }
}
