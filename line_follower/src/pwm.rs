//! Settings of the timer PWM that drives the two motors.
//!
//! The motors use channels 3 (right) and 4 (left) of the same timer, so
//! both share the period. The period and the duties are counted in timer
//! ticks of 2/3 µs (a 1.5 MHz tick in center aligned mode).

use thiserror::Error;

/// Frequency of a timer tick
pub const TICK_HZ: u32 = 1_500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    #[error("the PWM period cannot be 0")]
    ZeroPeriod,
    #[error("duty {duty} has to be less than the period {period}")]
    DutyNotBelowPeriod { duty: u16, period: u16 },
}

/// A checked period and the duties of the two channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    period: u16,
    duty3: u16,
    duty4: u16,
}

impl PwmConfig {
    /// Both duties have to be less than the period.
    pub fn new(period: u16, duty3: u16, duty4: u16) -> Result<PwmConfig, PwmError> {
        if period == 0 {
            return Err(PwmError::ZeroPeriod);
        }
        check_duty(duty3, period)?;
        check_duty(duty4, period)?;
        Ok(PwmConfig {
            period,
            duty3,
            duty4,
        })
    }

    pub fn period(&self) -> u16 {
        self.period
    }

    /// The PWM frequency in Hz
    pub fn frequency_hz(&self) -> u32 {
        TICK_HZ / self.period as u32
    }

    /// Changes the duty of channel 3, the previous value is kept on error.
    pub fn set_duty3(&mut self, duty3: u16) -> Result<(), PwmError> {
        check_duty(duty3, self.period)?;
        self.duty3 = duty3;
        Ok(())
    }

    /// Changes the duty of channel 4, the previous value is kept on error.
    pub fn set_duty4(&mut self, duty4: u16) -> Result<(), PwmError> {
        check_duty(duty4, self.period)?;
        self.duty4 = duty4;
        Ok(())
    }

    /// Channel 3 duty as `(numerator, denominator)`, the form
    /// `set_duty_cycle_fraction` expects.
    pub fn duty3_fraction(&self) -> (u16, u16) {
        (self.duty3, self.period)
    }

    /// Channel 4 duty as `(numerator, denominator)`
    pub fn duty4_fraction(&self) -> (u16, u16) {
        (self.duty4, self.period)
    }
}

fn check_duty(duty: u16, period: u16) -> Result<(), PwmError> {
    if duty >= period {
        Err(PwmError::DutyNotBelowPeriod { duty, period })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duties_have_to_be_below_the_period() {
        assert_eq!(
            PwmConfig::new(15000, 15000, 0),
            Err(PwmError::DutyNotBelowPeriod {
                duty: 15000,
                period: 15000,
            })
        );
        assert_eq!(
            PwmConfig::new(15000, 0, 20000),
            Err(PwmError::DutyNotBelowPeriod {
                duty: 20000,
                period: 15000,
            })
        );
        assert_eq!(PwmConfig::new(0, 0, 0), Err(PwmError::ZeroPeriod));
    }

    #[test]
    fn fractions_and_frequency() {
        let config = PwmConfig::new(15000, 3750, 7500).unwrap();
        assert_eq!(config.frequency_hz(), 100);
        assert_eq!(config.duty3_fraction(), (3750, 15000));
        assert_eq!(config.duty4_fraction(), (7500, 15000));
    }

    #[test]
    fn rejected_duty_keeps_the_previous_one() {
        let mut config = PwmConfig::new(1000, 100, 200).unwrap();
        assert!(config.set_duty3(1000).is_err());
        assert_eq!(config.duty3_fraction(), (100, 1000));
        config.set_duty4(999).unwrap();
        assert_eq!(config.duty4_fraction(), (999, 1000));
    }
}
