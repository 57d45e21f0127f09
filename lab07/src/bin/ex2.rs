#![no_std]
#![no_main]

use defmt::{debug, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_time::Delay;
use lab06::reflectance::Reflectance;
use lab07::board::BoardOutputs;
use line_follower::fsm::StateName;
use line_follower::launchpad::Leds;
use line_follower::motor::{MotorPins, MotorSimple};
use line_follower::{Driver, build_state_table};
use panic_probe as _;

/// Follows the line using the two center sensors of the reflectance sensor.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    let table = build_state_table().expect("the line follower state table is malformed");

    // The IR LEDs of the sensor are connected to D2 (PA10).
    let ir_led = Output::new(peripherals.PA10, Level::Low, Speed::Low);

    // The sensors are connected from the robot's right to its left on:
    // A0 (PA0), A1 (PA1), A2 (PA4), A3 (PB0), A4 (PC1), A5 (PC0), D4 (PB5) and D5 (PB4).
    // Only the two center ones (PB0 and PC1) are used by the state machine.
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
    let reflectance = Reflectance::new(ir_led, sensors);

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
    let bump = Input::new(peripherals.PA15, Pull::Up);
    let motors = MotorSimple::new(left, right, bump, Delay);

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

    let mut driver = Driver::new(table, reflectance, BoardOutputs::new(motors, leds), Delay);

    // We run the cycles one by one so that we can display the
    // name of every state we enter.
    loop {
        match driver.cycle().await {
            Ok(step) => {
                if let Some(state) = StateName::from_id(step.next) {
                    debug!("Output {:b} for {} ms, next {}", step.output, step.dwell_ms, state);
                }
            }
            // The sensor only returns 2-bit values, if this happens
            // the sensor code is broken. The state machine stays in the
            // same state.
            Err(error) => warn!("Invalid sensor reading: {}", error),
        }
    }
}
