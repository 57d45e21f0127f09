#![no_std]
#![no_main]

use defmt::{debug, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, OutputType, Speed},
    peripherals::TIM3,
    time::hz,
    timer::{
        Ch3, Ch4,
        simple_pwm::{PwmPin, SimplePwm},
    },
};
use embassy_time::Timer;
use line_follower::pwm::PwmConfig;
use panic_probe as _;

/// The PWM period in timer ticks of 2/3 us (10 ms, 100 Hz)
const PERIOD: u16 = 15000;

/// Drives both motors forward using the timer PWM, slowly
/// increasing and then decreasing the speed.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let peripherals = embassy_stm32::init(Default::default());
    info!("Device started");

    // Both motors go forward (DIR LOW) and the H-bridges are awake (nSLP HIGH).
    //
    // Left motor: DIR on PB10 and nSLP on PA6
    // Right motor: DIR on PB8 and nSLP on PA9
    let _left_direction = Output::new(peripherals.PB10, Level::Low, Speed::Low);
    let _left_sleep = Output::new(peripherals.PA6, Level::High, Speed::Low);
    let _right_direction = Output::new(peripherals.PB8, Level::Low, Speed::Low);
    let _right_sleep = Output::new(peripherals.PA9, Level::High, Speed::Low);

    // The right motor's PWM is on PC8, Channel 3 of TIM3 and the
    // left motor's PWM is on PB1, Channel 4 of TIM3.
    //
    // The `PwmPin` sets the correct configuration of the MODER and
    // the Alternate Function of the pins.
    let right_pwm: PwmPin<'_, TIM3, Ch3> = PwmPin::new(peripherals.PC8, OutputType::PushPull);
    let left_pwm: PwmPin<'_, TIM3, Ch4> = PwmPin::new(peripherals.PB1, OutputType::PushPull);

    // Both motors start stopped (0 duty)
    let mut config = PwmConfig::new(PERIOD, 0, 0).expect("the PWM settings are invalid");

    // Enable PWM for TIM3
    // only Channels 3 and 4 are used
    let pwm = SimplePwm::new(
        peripherals.TIM3,                // Timer 3 peripheral
        None,                            // Channel 1 not used
        None,                            // Channel 2 not used
        Some(right_pwm),                 // Channel 3 output (PC8)
        Some(left_pwm),                  // Channel 4 output (PB1)
        hz(config.frequency_hz()),       // PWM frequency = 100 Hz
        Default::default(),              // Default configuration
    );

    // Both channels are used at the same time, so we split them
    // with a single borrow.
    let channels = pwm.split();
    let mut right_ch = channels.ch3;
    let mut left_ch = channels.ch4;

    // The H-bridge spins the motor while the PWM signal is HIGH
    right_ch.enable();
    left_ch.enable();

    loop {
        // Speed up from 0% to 90% and slow down back to 0%, in 10% steps
        for percent in (0..=90).step_by(10).chain((0..90).step_by(10).rev()) {
            let duty = (PERIOD as u32 * percent / 100) as u16;

            // The duties are always below the period, but if the
            // computation is wrong the previous duty is kept.
            if let Err(error) = config.set_duty3(duty) {
                warn!("Right motor: {}", error);
            }
            if let Err(error) = config.set_duty4(duty) {
                warn!("Left motor: {}", error);
            }

            let (numerator, denominator) = config.duty3_fraction();
            right_ch.set_duty_cycle_fraction(numerator, denominator);
            let (numerator, denominator) = config.duty4_fraction();
            left_ch.set_duty_cycle_fraction(numerator, denominator);

            debug!("Duty {}%", percent);
            Timer::after_millis(500).await;
        }
    }
}
