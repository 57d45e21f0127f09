//! Simple motor driver that bit-bangs the PWM signal.
//!
//! Every motor of the robot is driven by an H-bridge with three inputs:
//! - DIR - LOW forward, HIGH backward
//! - PWM - the motor spins while HIGH
//! - nSLP - LOW puts the H-bridge to sleep (motor stopped)
//!
//! The driver toggles PWM in software with a period of 10 ms and
//! a duty cycle between 1% and 99%. While driving forward or turning,
//! the bump switches are checked at the beginning of every period and
//! the motors stop as soon as one is pressed.

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use thiserror::Error;

/// The PWM period, in microseconds
pub const PERIOD_US: u32 = 10_000;

/// Smallest accepted duty, in microseconds
pub const MIN_DUTY_US: u32 = 100;

/// Largest accepted duty, in microseconds
pub const MAX_DUTY_US: u32 = 9_900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    #[error("duty {duty}us is outside 100..=9900us")]
    DutyOutOfRange { duty: u32 },
}

/// The time the PWM signal is HIGH during a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duty(u32);

impl Duty {
    /// `duty_us` has to be in `100..=9900`
    pub const fn new(duty_us: u32) -> Result<Duty, MotorError> {
        if duty_us >= MIN_DUTY_US && duty_us <= MAX_DUTY_US {
            Ok(Duty(duty_us))
        } else {
            Err(MotorError::DutyOutOfRange { duty: duty_us })
        }
    }

    pub const fn high_us(self) -> u32 {
        self.0
    }

    pub const fn low_us(self) -> u32 {
        PERIOD_US - self.0
    }

    /// The duty cycle in percent, rounded down
    pub const fn percent(self) -> u8 {
        (self.0 * 100 / PERIOD_US) as u8
    }
}

/// How a drive command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// All the periods were run
    Completed,
    /// A bump switch was pressed and the motors were stopped early
    Bumped,
}

/// The three H-bridge pins of a motor
pub struct MotorPins<O> {
    pub direction: O,
    pub pwm: O,
    /// Active LOW sleep (nSLP)
    pub sleep: O,
}

/// Which motors a command drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motors {
    Both,
    Left,
    Right,
}

impl Motors {
    fn left(self) -> bool {
        matches!(self, Motors::Both | Motors::Left)
    }

    fn right(self) -> bool {
        matches!(self, Motors::Both | Motors::Right)
    }
}

/// Two motors and the bump switches.
///
/// `B` reads LOW while any bump switch is pressed.
pub struct MotorSimple<O, B, D> {
    left: MotorPins<O>,
    right: MotorPins<O>,
    bump: B,
    delay: D,
}

impl<O, B, D> MotorSimple<O, B, D>
where
    O: OutputPin<Error = Infallible>,
    B: InputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Takes the pins and puts both H-bridges to sleep.
    pub fn new(left: MotorPins<O>, right: MotorPins<O>, bump: B, delay: D) -> Self {
        let mut motors = MotorSimple {
            left,
            right,
            bump,
            delay,
        };
        motors.stop();
        motors
    }

    /// Stops both motors, puts the H-bridges to sleep and sets the direction
    /// to forward.
    pub fn stop(&mut self) {
        for motor in [&mut self.left, &mut self.right] {
            let Ok(()) = motor.pwm.set_low();
            let Ok(()) = motor.direction.set_low();
            let Ok(()) = motor.sleep.set_low();
        }
    }

    /// Drives both motors forward for `periods` x 10 ms.
    ///
    /// Stops early if a bump switch is pressed.
    pub async fn forward(&mut self, duty: Duty, periods: u32) -> Outcome {
        self.drive(Motors::Both, false, duty, periods, true).await
    }

    /// Drives both motors backward for `periods` x 10 ms.
    ///
    /// The bump switches are ignored, backing up is how the robot gets
    /// away from an obstacle.
    pub async fn backward(&mut self, duty: Duty, periods: u32) -> Outcome {
        self.drive(Motors::Both, true, duty, periods, false).await
    }

    /// Drives only the left motor forward (the robot turns right).
    pub async fn left(&mut self, duty: Duty, periods: u32) -> Outcome {
        self.drive(Motors::Left, false, duty, periods, true).await
    }

    /// Drives only the right motor forward (the robot turns left).
    pub async fn right(&mut self, duty: Duty, periods: u32) -> Outcome {
        self.drive(Motors::Right, false, duty, periods, true).await
    }

    /// Turns the motors fully on or off from a 2-bit output code,
    /// bit 1 is the left motor and bit 0 the right one.
    pub fn apply_output(&mut self, output: u8) {
        let enabled = [output & 0b10 != 0, output & 0b01 != 0];
        for (motor, on) in [&mut self.left, &mut self.right].into_iter().zip(enabled) {
            let Ok(()) = motor.direction.set_low();
            let Ok(()) = motor.sleep.set_state(on.into());
            let Ok(()) = motor.pwm.set_state(on.into());
        }
    }

    /// Verifies if a bump switch is pressed
    pub fn bumped(&mut self) -> bool {
        let Ok(pressed) = self.bump.is_low();
        pressed
    }

    /// Gives back the pins and the delay
    pub fn release(self) -> (MotorPins<O>, MotorPins<O>, B, D) {
        (self.left, self.right, self.bump, self.delay)
    }

    async fn drive(
        &mut self,
        motors: Motors,
        backward: bool,
        duty: Duty,
        periods: u32,
        stop_on_bump: bool,
    ) -> Outcome {
        let enabled = [motors.left(), motors.right()];
        for (motor, on) in [&mut self.left, &mut self.right].into_iter().zip(enabled) {
            let Ok(()) = motor.direction.set_state(backward.into());
            let Ok(()) = motor.sleep.set_state(on.into());
        }
        debug!("drive {}us duty for {} periods", duty.high_us(), periods);

        for _ in 0..periods {
            if stop_on_bump && self.bumped() {
                warn!("bump switch pressed, stopping");
                self.stop();
                return Outcome::Bumped;
            }
            self.set_pwm(enabled, true);
            self.delay.delay_us(duty.high_us()).await;
            self.set_pwm(enabled, false);
            self.delay.delay_us(duty.low_us()).await;
        }

        self.stop();
        Outcome::Completed
    }

    fn set_pwm(&mut self, enabled: [bool; 2], high: bool) {
        for (motor, on) in [&mut self.left, &mut self.right].into_iter().zip(enabled) {
            if on {
                let Ok(()) = motor.pwm.set_state(high.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorType;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Pin(&'static str, bool),
        Wait(u32),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct LoggedPin {
        name: &'static str,
        log: Log,
    }

    impl ErrorType for LoggedPin {
        type Error = Infallible;
    }

    impl OutputPin for LoggedPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.name, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push(Event::Pin(self.name, true));
            Ok(())
        }
    }

    /// Reads LOW (pressed) after `presses_after` reads
    struct BumpSwitch {
        reads: u32,
        presses_after: Option<u32>,
    }

    impl ErrorType for BumpSwitch {
        type Error = Infallible;
    }

    impl InputPin for BumpSwitch {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            let pressed = self.presses_after.is_some_and(|after| self.reads >= after);
            self.reads += 1;
            Ok(pressed)
        }
    }

    struct LoggedDelay {
        log: Log,
    }

    impl DelayNs for LoggedDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.log.borrow_mut().push(Event::Wait(ns / 1000));
        }

        async fn delay_us(&mut self, us: u32) {
            self.log.borrow_mut().push(Event::Wait(us));
        }
    }

    fn motors(log: &Log, presses_after: Option<u32>) -> MotorSimple<LoggedPin, BumpSwitch, LoggedDelay> {
        let pin = |name| LoggedPin {
            name,
            log: log.clone(),
        };
        let motors = MotorSimple::new(
            MotorPins {
                direction: pin("ldir"),
                pwm: pin("lpwm"),
                sleep: pin("lslp"),
            },
            MotorPins {
                direction: pin("rdir"),
                pwm: pin("rpwm"),
                sleep: pin("rslp"),
            },
            BumpSwitch {
                reads: 0,
                presses_after,
            },
            LoggedDelay { log: log.clone() },
        );
        log.borrow_mut().clear();
        motors
    }

    fn waits(log: &Log) -> Vec<u32> {
        log.borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Wait(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    fn last_state(log: &Log, name: &str) -> Option<bool> {
        log.borrow().iter().rev().find_map(|event| match event {
            Event::Pin(pin, state) if *pin == name => Some(*state),
            _ => None,
        })
    }

    #[test]
    fn duty_limits() {
        assert_eq!(Duty::new(99), Err(MotorError::DutyOutOfRange { duty: 99 }));
        assert_eq!(Duty::new(9901), Err(MotorError::DutyOutOfRange { duty: 9901 }));
        let duty = Duty::new(2500).unwrap();
        assert_eq!((duty.high_us(), duty.low_us(), duty.percent()), (2500, 7500, 25));
    }

    #[test]
    fn forward_runs_every_period_then_stops() {
        let log = Log::default();
        let mut motors = motors(&log, None);
        let outcome = block_on(motors.forward(Duty::new(3000).unwrap(), 3));

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(waits(&log), vec![3000, 7000, 3000, 7000, 3000, 7000]);
        assert_eq!(last_state(&log, "lslp"), Some(false));
        assert_eq!(last_state(&log, "rslp"), Some(false));
        assert_eq!(last_state(&log, "lpwm"), Some(false));
    }

    #[test]
    fn forward_stops_on_bump() {
        let log = Log::default();
        let mut motors = motors(&log, Some(2));
        let outcome = block_on(motors.forward(Duty::new(5000).unwrap(), 10));

        assert_eq!(outcome, Outcome::Bumped);
        assert_eq!(waits(&log).len(), 4);
        assert_eq!(last_state(&log, "lslp"), Some(false));
    }

    #[test]
    fn backward_ignores_the_bumper() {
        let log = Log::default();
        let mut motors = motors(&log, Some(0));
        let outcome = block_on(motors.backward(Duty::new(5000).unwrap(), 2));

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(waits(&log).len(), 4);
        assert!(log.borrow().contains(&Event::Pin("ldir", true)));
        // the direction goes back to forward when stopping
        assert_eq!(last_state(&log, "ldir"), Some(false));
    }

    #[test]
    fn left_drives_only_the_left_motor() {
        let log = Log::default();
        let mut motors = motors(&log, None);
        block_on(motors.left(Duty::new(5000).unwrap(), 1));

        let events = log.borrow();
        assert!(events.contains(&Event::Pin("lslp", true)));
        assert!(events.contains(&Event::Pin("lpwm", true)));
        assert!(!events.contains(&Event::Pin("rslp", true)));
        assert!(!events.contains(&Event::Pin("rpwm", true)));
    }

    #[test]
    fn output_code_enables_the_motors() {
        let log = Log::default();
        let mut motors = motors(&log, None);

        motors.apply_output(0b10);
        assert_eq!(last_state(&log, "lslp"), Some(true));
        assert_eq!(last_state(&log, "rslp"), Some(false));

        motors.apply_output(0b01);
        assert_eq!(last_state(&log, "lpwm"), Some(false));
        assert_eq!(last_state(&log, "rpwm"), Some(true));

        motors.apply_output(0b00);
        assert_eq!(last_state(&log, "rslp"), Some(false));
    }
}
