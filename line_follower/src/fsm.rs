//! Moore finite state machine that follows a line using two sensors.
//!
//! Every state has an output (which motors are on), two values displayed
//! on the LaunchPad LEDs, a time to hold the output and four next states,
//! one for every input [`Symbol`].
//!
//! States link to each other through [`StateId`]s, indices into the same
//! table, so the table can be a plain `static` array and forward references
//! (`Center` needs `LeftOff1` that needs `Center`) are not a problem.

use thiserror::Error;

use crate::symbol::{InvalidSymbolError, Symbol};

/// Number of transitions of every state, one for every 2-bit symbol
pub const TRANSITIONS: usize = 4;

/// Largest output code, the output drives two motors
pub const MAX_OUTPUT: u8 = 0b11;

/// The state table is malformed.
///
/// The table is fixed when the firmware is built, so this error is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    #[error("the state table has no states")]
    EmptyTable,
    #[error("state {state} has output {output:#04x}, outputs are 2 bits")]
    OutputOutOfRange { state: usize, output: u8 },
    #[error("state {state} goes to state {target} on symbol {symbol}, which is not in the table")]
    DanglingTransition { state: usize, symbol: usize, target: usize },
    #[error("the initial state {initial} is not in the table")]
    InitialOutOfRange { initial: usize },
    #[error("the table has {len} states, at most 256 can be addressed")]
    TooManyStates { len: usize },
}

/// Index of a state in its table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateId(u8);

impl StateId {
    /// Ids outside the crate come from [`StateName::id`] or from a table,
    /// so they always name a row.
    pub(crate) const fn new(index: u8) -> StateId {
        StateId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A row of the state table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct State {
    /// 2-bit output, bit 1 is the left motor and bit 0 the right motor
    pub output: u8,
    /// Value displayed on LED1
    pub led1: u8,
    /// Color displayed on LED2
    pub led2: u8,
    /// How long the output is held before the sensors are read
    pub dwell_ms: u32,
    /// The next state for every input symbol
    pub next: [StateId; TRANSITIONS],
}

/// The result of one cycle of the machine.
///
/// The output, the LED values and the dwell time belong to the state that
/// was active during the cycle, `next` is where the input sends us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub next: StateId,
    pub output: u8,
    pub led1: u8,
    pub led2: u8,
    pub dwell_ms: u32,
}

/// The states of the line follower
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateName {
    /// Both sensors on the line
    Center = 0,
    /// Left sensor off the line, gentle correction
    LeftOff1 = 1,
    /// Left sensor still off the line, sharper correction
    LeftOff2 = 2,
    /// Right sensor off the line, gentle correction
    RightOff1 = 3,
    /// Right sensor still off the line, sharper correction
    RightOff2 = 4,
    /// Both sensors off, we were drifting left
    LostLeft = 5,
    /// Both sensors off, we were drifting right
    LostRight = 6,
    /// Blind forward creep after being lost
    Fwd5 = 7,
    /// Motors off, leaves as soon as a sensor sees the line
    Stop = 8,
}

impl StateName {
    pub const ALL: [StateName; 9] = [
        StateName::Center,
        StateName::LeftOff1,
        StateName::LeftOff2,
        StateName::RightOff1,
        StateName::RightOff2,
        StateName::LostLeft,
        StateName::LostRight,
        StateName::Fwd5,
        StateName::Stop,
    ];

    pub const fn id(self) -> StateId {
        StateId(self as u8)
    }

    /// The name of a state of the line follower table
    pub fn from_id(id: StateId) -> Option<StateName> {
        StateName::ALL.get(id.index()).copied()
    }
}

// Short names so that the table below reads like a table.
const CENTER: StateId = StateName::Center.id();
const LEFT_OFF_1: StateId = StateName::LeftOff1.id();
const LEFT_OFF_2: StateId = StateName::LeftOff2.id();
const RIGHT_OFF_1: StateId = StateName::RightOff1.id();
const RIGHT_OFF_2: StateId = StateName::RightOff2.id();
const LOST_LEFT: StateId = StateName::LostLeft.id();
const LOST_RIGHT: StateId = StateName::LostRight.id();
const FWD_5: StateId = StateName::Fwd5.id();
const STOP: StateId = StateName::Stop.id();

const fn state(output: u8, led1: u8, led2: u8, dwell_ms: u32, next: [StateId; 4]) -> State {
    State {
        output,
        led1,
        led2,
        dwell_ms,
        next,
    }
}

/// The line follower table, rows are in [`StateName`] order.
///
/// The `next` columns are indexed by symbol: 0 lost, 1 only right on
/// line, 2 only left on line, 3 on line.
pub static LINE_FOLLOWER: [State; 9] = [
    // Center
    state(0x03, 0, 0x02, 500, [RIGHT_OFF_1, LEFT_OFF_1, RIGHT_OFF_1, CENTER]),
    // LeftOff1
    state(0x02, 0, 0x04, 500, [LOST_LEFT, LEFT_OFF_2, RIGHT_OFF_1, CENTER]),
    // LeftOff2
    state(0x03, 1, 0x04, 500, [LOST_LEFT, LEFT_OFF_1, RIGHT_OFF_1, CENTER]),
    // RightOff1
    state(0x01, 0, 0x01, 500, [LOST_RIGHT, LEFT_OFF_1, RIGHT_OFF_2, CENTER]),
    // RightOff2
    state(0x03, 1, 0x01, 500, [LOST_RIGHT, LEFT_OFF_1, RIGHT_OFF_1, CENTER]),
    // LostLeft
    state(0x02, 0, 0x06, 5000, [FWD_5, FWD_5, FWD_5, FWD_5]),
    // LostRight
    state(0x01, 0, 0x03, 5000, [FWD_5, FWD_5, FWD_5, FWD_5]),
    // Fwd5
    state(0x03, 0, 0x07, 5000, [STOP, LEFT_OFF_1, RIGHT_OFF_1, CENTER]),
    // Stop
    state(0x00, 1, 0x00, 500, [STOP, LEFT_OFF_1, RIGHT_OFF_1, CENTER]),
];

/// A checked state table.
///
/// Once built, every transition of every state points to a state of the
/// table, so [`StateTable::advance`] never fails.
#[derive(Debug, Clone, Copy)]
pub struct StateTable<'a> {
    states: &'a [State],
    initial: StateId,
}

/// Builds the line follower table with [`StateName::Center`] as the
/// initial state.
pub fn build_state_table() -> Result<StateTable<'static>, ConfigurationError> {
    StateTable::new(&LINE_FOLLOWER, StateName::Center.id())
}

impl<'a> StateTable<'a> {
    /// Verifies the rows and the initial state.
    pub fn new(states: &'a [State], initial: StateId) -> Result<StateTable<'a>, ConfigurationError> {
        if states.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }
        // `StateId` is a `u8`, a longer table would have unreachable rows.
        if states.len() > u8::MAX as usize + 1 {
            return Err(ConfigurationError::TooManyStates { len: states.len() });
        }
        if initial.index() >= states.len() {
            return Err(ConfigurationError::InitialOutOfRange {
                initial: initial.index(),
            });
        }

        for (index, state) in states.iter().enumerate() {
            if state.output > MAX_OUTPUT {
                return Err(ConfigurationError::OutputOutOfRange {
                    state: index,
                    output: state.output,
                });
            }
            for (symbol, target) in state.next.iter().enumerate() {
                if target.index() >= states.len() {
                    return Err(ConfigurationError::DanglingTransition {
                        state: index,
                        symbol,
                        target: target.index(),
                    });
                }
            }
        }

        Ok(StateTable { states, initial })
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: StateId) -> Option<&'a State> {
        self.states.get(id.index())
    }

    pub fn states(&self) -> &'a [State] {
        self.states
    }

    /// Runs one cycle for a raw symbol.
    ///
    /// A symbol outside `0..=3` is an error, it is never masked.
    ///
    /// # Panics
    ///
    /// If `current` does not belong to this table.
    pub fn step(&self, current: StateId, symbol: u8) -> Result<Step, InvalidSymbolError> {
        let symbol = Symbol::new(symbol)?;
        Ok(self.advance(current, symbol))
    }

    /// Runs one cycle for a checked symbol.
    ///
    /// # Panics
    ///
    /// If `current` does not belong to this table.
    pub fn advance(&self, current: StateId, symbol: Symbol) -> Step {
        let state = &self.states[current.index()];
        let next = state.next[symbol.index()];
        trace!(
            "state {} + symbol {} -> state {}",
            current.index(),
            symbol.bits(),
            next.index()
        );
        Step {
            next,
            output: state.output,
            led1: state.led1,
            led2: state.led2,
            dwell_ms: state.dwell_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StateName::*;

    fn table() -> StateTable<'static> {
        build_state_table().expect("the line follower table is valid")
    }

    fn step(from: StateName, symbol: u8) -> Step {
        table().step(from.id(), symbol).expect("symbol is valid")
    }

    fn next(from: StateName, symbol: u8) -> StateName {
        StateName::from_id(step(from, symbol).next).expect("next state has a name")
    }

    #[test]
    fn starts_in_center() {
        assert_eq!(table().initial(), Center.id());
        assert_eq!(table().len(), 9);
    }

    #[test]
    fn every_state_has_four_valid_transitions() {
        let table = table();
        for state in table.states() {
            assert_eq!(state.next.len(), TRANSITIONS);
            for target in state.next {
                assert!(table.state(target).is_some());
            }
        }
    }

    #[test]
    fn center_stays_on_the_line() {
        assert_eq!(
            step(Center, 3),
            Step {
                next: Center.id(),
                output: 0x03,
                led1: 0,
                led2: 0x02,
                dwell_ms: 500,
            }
        );
    }

    #[test]
    fn center_corrects_when_the_left_sensor_drops() {
        let step = step(Center, 1);
        assert_eq!(step.next, LeftOff1.id());
        assert_eq!(step.output, 0x03);
        assert_eq!(step.dwell_ms, 500);
    }

    #[test]
    fn output_belongs_to_the_state_being_left() {
        // LeftOff1 drives only the left motor, Center drives both.
        let step = step(LeftOff1, 3);
        assert_eq!(step.next, Center.id());
        assert_eq!(step.output, 0x02);
        assert_eq!(step.led2, 0x04);
    }

    #[test]
    fn losing_the_line_escalates() {
        let table = table();
        let lost = table.step(LeftOff1.id(), 0).unwrap();
        assert_eq!(lost.next, LostLeft.id());
        assert_eq!(lost.dwell_ms, 500);

        let creep = table.step(lost.next, 0).unwrap();
        assert_eq!(creep.next, Fwd5.id());
        assert_eq!(creep.dwell_ms, 5000);

        assert_eq!(next(RightOff1, 0), LostRight);
        assert_eq!(next(LostRight, 0), Fwd5);
    }

    #[test]
    fn second_level_corrections() {
        assert_eq!(next(LeftOff1, 1), LeftOff2);
        assert_eq!(next(LeftOff2, 1), LeftOff1);
        assert_eq!(next(RightOff1, 2), RightOff2);
        assert_eq!(next(RightOff2, 2), RightOff1);
    }

    #[test]
    fn recovers_from_the_lost_states() {
        assert_eq!(next(Fwd5, 3), Center);
        // The lost states always creep forward first.
        for lost in [LostLeft, LostRight] {
            assert_eq!(next(lost, 3), Fwd5);
            assert_eq!(next(next(lost, 3), 3), Center);
        }
    }

    #[test]
    fn stop_is_only_entered_from_fwd5() {
        for from in StateName::ALL {
            for symbol in 0..4 {
                if from != Stop && next(from, symbol) == Stop {
                    assert_eq!((from, symbol), (Fwd5, 0));
                }
            }
        }
        assert_eq!(next(Fwd5, 0), Stop);
    }

    #[test]
    fn stop_can_be_left() {
        assert_eq!(next(Stop, 0), Stop);
        assert_eq!(next(Stop, 1), LeftOff1);
        assert_eq!(next(Stop, 2), RightOff1);
        assert_eq!(next(Stop, 3), Center);
        assert_eq!(step(Stop, 3).output, 0x00);
    }

    #[test]
    fn every_state_is_reachable_from_center() {
        let table = table();
        let mut seen = [false; 9];
        let mut queue = [Center.id(); 9];
        let (mut head, mut tail) = (0, 1);
        seen[Center as usize] = true;
        while head < tail {
            let current = queue[head];
            head += 1;
            for target in table.state(current).unwrap().next {
                if !seen[target.index()] {
                    seen[target.index()] = true;
                    queue[tail] = target;
                    tail += 1;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn out_of_range_symbols_are_rejected() {
        let table = table();
        assert_eq!(
            table.step(Center.id(), 4),
            Err(InvalidSymbolError { symbol: 4 })
        );
        assert_eq!(
            table.step(Stop.id(), 0xff),
            Err(InvalidSymbolError { symbol: 0xff })
        );
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let dangling = [state(0, 0, 0, 1, [StateId::new(0), StateId::new(0), StateId::new(2), StateId::new(0)])];
        assert_eq!(
            StateTable::new(&dangling, StateId::new(0)).unwrap_err(),
            ConfigurationError::DanglingTransition {
                state: 0,
                symbol: 2,
                target: 2,
            }
        );

        let loud = [state(4, 0, 0, 1, [StateId::new(0); 4])];
        assert_eq!(
            StateTable::new(&loud, StateId::new(0)).unwrap_err(),
            ConfigurationError::OutputOutOfRange { state: 0, output: 4 }
        );

        assert_eq!(
            StateTable::new(&[], StateId::new(0)).unwrap_err(),
            ConfigurationError::EmptyTable
        );

        let single = [state(0, 0, 0, 1, [StateId::new(0); 4])];
        assert_eq!(
            StateTable::new(&single, StateId::new(1)).unwrap_err(),
            ConfigurationError::InitialOutOfRange { initial: 1 }
        );
    }

    #[test]
    fn tables_are_limited_to_256_states() {
        let row = state(0, 0, 0, 1, [StateId::new(0); 4]);

        let too_long = vec![row; 257];
        assert_eq!(
            StateTable::new(&too_long, StateId::new(0)).unwrap_err(),
            ConfigurationError::TooManyStates { len: 257 }
        );

        let longest = vec![row; 256];
        let table = StateTable::new(&longest, StateId::new(255)).unwrap();
        assert_eq!(table.len(), 256);
        assert_eq!(table.step(StateId::new(255), 3).unwrap().next, StateId::new(0));
    }

    #[test]
    fn every_named_state_is_a_row() {
        let table = table();
        for name in StateName::ALL {
            assert!(table.state(name.id()).is_some());
            assert_eq!(StateName::from_id(name.id()), Some(name));
            assert!(table.step(name.id(), 0).is_ok());
        }
    }
}
