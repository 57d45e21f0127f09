#![no_std]
#![no_main]

use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::Timer;
use line_follower::launchpad::{Buttons, ColorToggle, Leds};
use panic_probe as _;

/// The button poll period.
///
/// Polling every 20 ms is slow enough to skip most of the button
/// bounce and fast enough to catch every press.
const POLL_PERIOD_MS: u64 = 20;

/// - S1 turns LED2 on and off
/// - S2 changes the color of LED2 (red, green, blue) while it is on
/// - LED1 is lit while any button is pressed
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // S1 is connected to PA8 and S2 to PA7, both have external pull ups.
    let mut buttons = Buttons::new(
        Input::new(peripherals.PA8, Pull::None),
        Input::new(peripherals.PA7, Pull::None),
    );

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

    // Remembers the previous buttons, so that only presses count
    let mut toggle = ColorToggle::new();

    loop {
        let (led1, color) = toggle.update(buttons.input());
        debug!("LED2 {}", color);
        leds.led1(led1);
        leds.led2(color);

        Timer::after_millis(POLL_PERIOD_MS).await;
    }
}
