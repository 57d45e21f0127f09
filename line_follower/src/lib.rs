#![cfg_attr(not(test), no_std)]

//! Line follower logic shared by the lab firmware.
//!
//! Everything in this crate is independent of the board: the FSM engine,
//! the reflectance sensor math, the LaunchPad switch and LED logic and the
//! motor timing are written against plain values or the `embedded-hal`
//! traits, so they can be tested on the host.
//!
//! The firmware crates (`lab02`, `lab06`, `lab07` and `lab12`) plug in the
//! embassy peripherals.

// The logging macros have to be defined before the modules that use them.
#[macro_use]
mod fmt;

pub mod driver;
pub mod fsm;
pub mod launchpad;
pub mod mailbox;
pub mod motor;
pub mod pwm;
pub mod reflectance;
pub mod symbol;

pub use driver::{ActuatorOutput, Driver, SensorInput};
pub use fsm::{ConfigurationError, State, StateId, StateName, StateTable, Step, build_state_table};
pub use symbol::{InvalidSymbolError, Symbol};
