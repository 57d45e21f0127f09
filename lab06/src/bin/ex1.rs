#![no_std]
#![no_main]

use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_time::Timer;
use lab06::reflectance::Reflectance;
use line_follower::reflectance::{DEFAULT_DISCHARGE_US, position};
use panic_probe as _;

/// Reads the line sensor every 10 ms and displays where the line is.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // The IR LEDs of the sensor are connected to D2 (PA10).
    // They are active HIGH, so they start LOW (off).
    let ir_led = Output::new(peripherals.PA10, Level::Low, Speed::Low);

    // The sensors are connected from the robot's right to its left on:
    // A0 (PA0), A1 (PA1), A2 (PA4), A3 (PB0), A4 (PC1), A5 (PC0), D4 (PB5) and D5 (PB4).
    //
    // The sensors pins are used both as outputs (to charge the sensor)
    // and inputs (to read it) so we use `Flex` pins.
    let sensors = [
        Flex::new(peripherals.PA0),
        Flex::new(peripherals.PA1),
        Flex::new(peripherals.PA4),
        Flex::new(peripherals.PB0),
        Flex::new(peripherals.PC1),
        Flex::new(peripherals.PC0),
        Flex::new(peripherals.PB5),
        Flex::new(peripherals.PB4),
    ];

    let mut reflectance = Reflectance::new(ir_led, sensors);

    loop {
        let data = reflectance.read(DEFAULT_DISCHARGE_US).await;

        // `position` returns `None` when no sensor sees the line
        match position(data) {
            Some(position) => debug!("Data {:b}, line at {} x 0.1mm", data, position),
            None => debug!("Data {:b}, no line", data),
        }

        Timer::after_millis(10).await;
    }
}
