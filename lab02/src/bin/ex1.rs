#![no_std]
#![no_main]

use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::Timer;
use line_follower::launchpad::{Buttons, Leds, mirror};
use panic_probe as _;

/// Displays which buttons are pressed:
/// - S1 - blue
/// - S2 - red
/// - S1 and S2 - blue and red (pink)
///
/// LED1 is lit while any button is pressed.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // The buttons on the lab board have an external pull up resistor (soldered
    // on the lab board), so the internal pull resistor is not needed.
    // Pull Up means that:
    //    - the pin's value is HIGH when the button is release
    //    - the pin's value is LOW when the button is pressed
    // We can either use `Pull::None` or `Pull::Up` (not recommended),
    // we cannot use `Pull::Down`.
    //
    // S1 is connected to PA8 and S2 to PA7.
    let mut buttons = Buttons::new(
        Input::new(peripherals.PA8, Pull::None),
        Input::new(peripherals.PA7, Pull::None),
    );

    // The LEDs on the lab board are active LOW: they light up when the pin is LOW
    // and turn off when the pin is HIGH. We set the initial value of the pin to HIGH
    // so that the LED are turned off when the pins are setup.
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

    loop {
        let switches = buttons.input();
        let (led1, color) = mirror(switches);
        debug!("Switches {}, color {}", switches, color);
        leds.led1(led1);
        leds.led2(color);

        // Without a delay the MCU would spin in an empty loop.
        Timer::after_millis(10).await;
    }
}
