#![no_std]
#![no_main]

use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::{Spawner, task};
use embassy_stm32::gpio::{Flex, Level, Output, Speed};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_time::{Duration, Ticker, Timer};
use lab06::reflectance::Reflectance;
use line_follower::launchpad::Leds;
use line_follower::mailbox::Mailbox;
use line_follower::reflectance::{SamplePhase, SampleSchedule, zone_color};
use panic_probe as _;

/// The latest sensor reading.
///
/// The `sample_line` task publishes a reading every 10 ms, the main
/// task takes it when it is ready. If the main task is late, it only
/// sees the newest reading.
static READINGS: Mailbox<ThreadModeRawMutex, u8> = Mailbox::new();

/// Task that reads the sensor using a 1 ms tick:
/// - tick 0 - charge the sensors
/// - tick 1 - read the sensors and publish the reading
/// - ticks 2 to 9 - nothing
#[task]
async fn sample_line(mut reflectance: Reflectance<'static>) {
    let mut schedule = SampleSchedule::default();
    let mut ticker = Ticker::every(Duration::from_millis(1));
    loop {
        match schedule.tick() {
            SamplePhase::Start => reflectance.start(),
            SamplePhase::End => READINGS.publish(reflectance.end()),
            SamplePhase::Idle => {}
        }
        ticker.next().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // The IR LEDs of the sensor are connected to D2 (PA10).
    let ir_led = Output::new(peripherals.PA10, Level::Low, Speed::Low);

    // The sensors are connected from the robot's right to its left on:
    // A0 (PA0), A1 (PA1), A2 (PA4), A3 (PB0), A4 (PC1), A5 (PC0), D4 (PB5) and D5 (PB4).
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

    // The LEDs on the lab board are active LOW: they light up when the pin is LOW
    // and turn off when the pin is HIGH. `Leds` takes care of this.
    //
    // LED1 is connected to D3 (PB3), the red, green and blue LEDs
    // to D8 (PC7), D9 (PC6) and D10 (PC9).
    let mut leds = Leds::new(
        Output::new(peripherals.PB3, Level::High, Speed::Low),
        [
            Output::new(peripherals.PC7, Level::High, Speed::Low),
            Output::new(peripherals.PC6, Level::High, Speed::Low),
            Output::new(peripherals.PC9, Level::High, Speed::Low),
        ],
    );

    spawner
        .spawn(sample_line(Reflectance::new(ir_led, sensors)))
        .unwrap();

    loop {
        // Poll the mailbox, do not wait for it
        if let Some(data) = READINGS.poll() {
            let color = zone_color(data);
            debug!("Data {:b}, color {}", data, color);
            leds.led1(data != 0);
            leds.led2(color);
        }
        Timer::after_millis(1).await;
    }
}
