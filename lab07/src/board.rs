use embassy_stm32::gpio::{Input, Output};
use embassy_time::Delay;
use line_follower::ActuatorOutput;
use line_follower::launchpad::{Color, Leds};
use line_follower::motor::MotorSimple;

/// The motor driver used by the line follower.
///
/// The bump switches are read through an `Input` and the PWM timing
/// uses embassy's `Delay`.
pub type Motors<'d> = MotorSimple<Output<'d>, Input<'d>, Delay>;

/// Everything the state machine outputs to:
/// - the state's output turns the two motors on or off
/// - LED1 and LED2 display the state
pub struct BoardOutputs<'d> {
    motors: Motors<'d>,
    leds: Leds<Output<'d>>,
}

impl<'d> BoardOutputs<'d> {
    pub fn new(motors: Motors<'d>, leds: Leds<Output<'d>>) -> BoardOutputs<'d> {
        BoardOutputs { motors, leds }
    }
}

impl ActuatorOutput for BoardOutputs<'_> {
    fn apply(&mut self, output: u8, led1: u8, led2: u8) {
        self.motors.apply_output(output);
        // LED1 is a single LED, only the first bit is displayed
        self.leds.led1(led1 & 1 != 0);
        self.leds.led2(Color::from_low_bits(led2));
    }
}
