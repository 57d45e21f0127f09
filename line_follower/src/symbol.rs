//! The 2-bit input symbol read from the two center line sensors.

use thiserror::Error;

/// The sensor returned a value that does not fit in 2 bits.
///
/// This is a defect of the sensor code, not a "lost the line" condition,
/// losing the line is symbol `0` and is handled by the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("input symbol {symbol} is not in 0..=3")]
pub struct InvalidSymbolError {
    /// The rejected raw value
    pub symbol: u8,
}

/// A 2-bit input symbol that indexes the transitions of a state.
///
/// The bits are `(left << 1) | right`, a bit is set when that sensor
/// sees the line:
///
/// | symbol | left | right | meaning                 |
/// |--------|------|-------|-------------------------|
/// | 3      | 1    | 1     | on the line             |
/// | 2      | 1    | 0     | robot is off to right   |
/// | 1      | 0    | 1     | robot is off to left    |
/// | 0      | 0    | 0     | lost                    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Symbol(u8);

impl Symbol {
    /// Neither sensor sees the line
    pub const LOST: Symbol = Symbol(0b00);
    /// Only the right sensor sees the line
    pub const RIGHT_ONLY: Symbol = Symbol(0b01);
    /// Only the left sensor sees the line
    pub const LEFT_ONLY: Symbol = Symbol(0b10);
    /// Both sensors see the line
    pub const ON_LINE: Symbol = Symbol(0b11);

    /// Checks a raw value. Anything above 3 is rejected, it is never masked.
    pub const fn new(raw: u8) -> Result<Symbol, InvalidSymbolError> {
        if raw <= 0b11 {
            Ok(Symbol(raw))
        } else {
            Err(InvalidSymbolError { symbol: raw })
        }
    }

    /// Packs the two sensor values.
    pub const fn from_sensors(left_on_line: bool, right_on_line: bool) -> Symbol {
        Symbol(((left_on_line as u8) << 1) | right_on_line as u8)
    }

    pub const fn left_on_line(self) -> bool {
        self.0 & 0b10 != 0
    }

    pub const fn right_on_line(self) -> bool {
        self.0 & 0b01 != 0
    }

    /// The raw value, always in `0..=3`
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The value used to index a transition array
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Symbol {
    type Error = InvalidSymbolError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Symbol::new(raw)
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> u8 {
        symbol.0
    }
}
