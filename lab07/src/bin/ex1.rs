#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::Delay;
use lab07::board::BoardOutputs;
use line_follower::launchpad::{Buttons, Leds};
use line_follower::motor::{MotorPins, MotorSimple};
use line_follower::{Driver, build_state_table};
use panic_probe as _;

/// Runs the line follower using the two buttons as line sensors:
/// - S1 is the left sensor
/// - S2 is the right sensor
///
/// A pressed button means the sensor sees the line. This is a good way
/// to try the state machine without putting the robot on a track.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // The state table is checked when it is built, a malformed
    // table is a bug in the firmware, so we stop here.
    let table = build_state_table().expect("the line follower state table is malformed");

    // The buttons on the lab board have an external pull up resistor (soldered
    // on the lab board), so the internal pull resistor is not needed.
    // Pull Up means that:
    //    - the pin's value is HIGH when the button is release
    //    - the pin's value is LOW when the button is pressed
    //
    // S1 is connected to PA8 and S2 to PA7.
    let buttons = Buttons::new(
        Input::new(peripherals.PA8, Pull::None),
        Input::new(peripherals.PA7, Pull::None),
    );

    // The H-bridge pins start LOW, the motors are asleep.
    //
    // Left motor: DIR on PB10, PWM on PA5 and nSLP on PA6
    // Right motor: DIR on PB8, PWM on PB9 and nSLP on PA9
    let left = MotorPins {
        direction: Output::new(peripherals.PB10, Level::Low, Speed::Low),
        pwm: Output::new(peripherals.PA5, Level::Low, Speed::Low),
        sleep: Output::new(peripherals.PA6, Level::Low, Speed::Low),
    };
    let right = MotorPins {
        direction: Output::new(peripherals.PB8, Level::Low, Speed::Low),
        pwm: Output::new(peripherals.PB9, Level::Low, Speed::Low),
        sleep: Output::new(peripherals.PA9, Level::Low, Speed::Low),
    };

    // The bump switches connect PA15 to GND when pressed, so we
    // use the internal pull up resistor.
    let bump = Input::new(peripherals.PA15, Pull::Up);

    let motors = MotorSimple::new(left, right, bump, Delay);

    // The LEDs on the lab board are active LOW, we set the initial value
    // of the pins to HIGH so that the LEDs are turned off.
    //
    // LED1 is connected to D3 (PB3), the red, green and blue LEDs
    // to D8 (PC7), D9 (PC6) and D10 (PC9).
    let leds = Leds::new(
        Output::new(peripherals.PB3, Level::High, Speed::Low),
        [
            Output::new(peripherals.PC7, Level::High, Speed::Low),
            Output::new(peripherals.PC6, Level::High, Speed::Low),
            Output::new(peripherals.PC9, Level::High, Speed::Low),
        ],
    );

    let mut driver = Driver::new(table, buttons, BoardOutputs::new(motors, leds), Delay);

    // Output, wait, read the buttons, move to the next state, forever
    driver.run().await
}
