#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::{Delay, Timer};
use line_follower::motor::{Duty, MotorPins, MotorSimple, Outcome};
use panic_probe as _;

/// The duty cycle used for all the moves, 30% of the 10 ms period
const DUTY: Duty = match Duty::new(3000) {
    Ok(duty) => duty,
    Err(_) => panic!("the duty has to be between 100 and 9900 us"),
};

/// Drives the robot forward, turns it and backs it up, using a PWM
/// signal generated in software.
///
/// If the robot bumps into something while driving forward, it backs up.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

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

    let mut motors = MotorSimple::new(left, right, bump, Delay);

    loop {
        // 2 seconds forward (200 periods of 10 ms)
        info!("Forward");
        if motors.forward(DUTY, 200).await == Outcome::Bumped {
            warn!("Bumped into something, backing up");
            motors.backward(DUTY, 100).await;
            continue;
        }

        // Half a second for every turn
        info!("Turn right");
        motors.left(DUTY, 50).await;
        info!("Turn left");
        motors.right(DUTY, 50).await;

        // The bump switches are ignored while backing up
        info!("Backward");
        motors.backward(DUTY, 100).await;

        Timer::after_secs(1).await;
    }
}
