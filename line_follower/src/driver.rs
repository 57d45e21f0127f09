//! The loop that runs the state machine on real (or fake) hardware.
//!
//! The driver only glues the pure [`StateTable::step`] to three
//! collaborators:
//! - a [`SensorInput`] that reads the 2-bit symbol
//! - an [`ActuatorOutput`] that drives the motors and the LEDs
//! - a clock, any `embedded_hal_async` [`DelayNs`] (`embassy_time::Delay`
//!   on the board)

use embedded_hal_async::delay::DelayNs;

use crate::fsm::{StateId, StateTable, Step};
use crate::symbol::InvalidSymbolError;

/// Reads the two line sensors.
// The driver is only used from a single executor, so the returned futures
// do not need to be `Send`.
#[allow(async_fn_in_trait)]
pub trait SensorInput {
    /// Returns `(left << 1) | right`, values outside `0..=3` are a
    /// defect of the sensor.
    async fn read_symbol(&mut self) -> u8;
}

/// Drives the motors and displays the state.
pub trait ActuatorOutput {
    fn apply(&mut self, output: u8, led1: u8, led2: u8);
}

impl<T: ActuatorOutput + ?Sized> ActuatorOutput for &mut T {
    fn apply(&mut self, output: u8, led1: u8, led2: u8) {
        T::apply(self, output, led1, led2)
    }
}

impl<T: SensorInput + ?Sized> SensorInput for &mut T {
    async fn read_symbol(&mut self) -> u8 {
        T::read_symbol(self).await
    }
}

/// Runs a state table.
///
/// The current state lives here and is only changed at the end of
/// a cycle.
pub struct Driver<'t, S, A, D> {
    table: StateTable<'t>,
    current: StateId,
    sensor: S,
    actuator: A,
    delay: D,
}

impl<'t, S: SensorInput, A: ActuatorOutput, D: DelayNs> Driver<'t, S, A, D> {
    /// Creates a driver that starts in the table's initial state.
    pub fn new(table: StateTable<'t>, sensor: S, actuator: A, delay: D) -> Self {
        Driver {
            current: table.initial(),
            table,
            sensor,
            actuator,
            delay,
        }
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    /// Runs one cycle:
    /// 1. output and display the current state
    /// 2. wait for the state's dwell time
    /// 3. read the sensors
    /// 4. move to the next state
    ///
    /// If the sensor returns an invalid symbol, the current state is kept
    /// and the error is returned.
    pub async fn cycle(&mut self) -> Result<Step, InvalidSymbolError> {
        // `current` always comes from the table, it is valid.
        let state = self.table.states()[self.current.index()];

        self.actuator.apply(state.output, state.led1, state.led2);
        self.delay.delay_ms(state.dwell_ms).await;

        let symbol = self.sensor.read_symbol().await;
        let step = self.table.step(self.current, symbol)?;
        debug!(
            "output {} dwell {}ms symbol {} next {}",
            step.output,
            step.dwell_ms,
            symbol,
            step.next.index()
        );
        self.current = step.next;
        Ok(step)
    }

    /// Runs `cycles` cycles and returns the state the machine is in.
    ///
    /// Stops at the first invalid symbol.
    pub async fn run_for(&mut self, cycles: usize) -> Result<StateId, InvalidSymbolError> {
        for _ in 0..cycles {
            self.cycle().await?;
        }
        Ok(self.current)
    }

    /// Runs the machine forever.
    ///
    /// An invalid symbol is logged and the current state is run again.
    ///
    /// This is [`Driver::cycle`] in a loop, the behavior is tested through
    /// `cycle` and [`Driver::run_for`].
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(error) = self.cycle().await {
                warn!("sensor returned symbol {}, keeping the state", error.symbol);
            }
        }
    }

    /// Gives back the collaborators.
    pub fn release(self) -> (S, A, D) {
        (self.sensor, self.actuator, self.delay)
    }
}
