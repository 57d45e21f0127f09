//! Reflectance (QTR-8RC) sensor math.
//!
//! The sensor has 8 IR LED / phototransistor pairs. A reading is a byte,
//! bit `n` is set when sensor `n + 1` sees the (black) line:
//!
//! ```text
//! bit   7   6   5   4   3   2   1   0
//!      left            center        right
//! ```
//!
//! Bit 0 is on the robot's right, so it sees the line when the robot
//! drifted to the left of it.

use crate::launchpad::Color;
use crate::symbol::Symbol;

/// How long the sensor capacitors discharge before the pins are sampled
pub const DEFAULT_DISCHARGE_US: u32 = 1000;

/// How long the sensor capacitors are charged
pub const CHARGE_PULSE_US: u32 = 10;

/// The two center sensors
const CENTER_MASK: u8 = 0b0001_1000;

/// Distance of every sensor from the center of the robot, in 0.1 mm.
///
/// Positive values are on the robot's right.
const WEIGHTS: [i32; 8] = [334, 238, 142, 48, -48, -142, -238, -334];

/// The 2-bit symbol made from the two center sensors.
///
/// Bit 4 is the left center sensor, bit 3 the right one, so the symbol
/// is `(left << 1) | right`.
pub fn center_symbol(data: u8) -> Symbol {
    let center = data & CENTER_MASK;
    Symbol::from_sensors(center & 0b1_0000 != 0, center & 0b0_1000 != 0)
}

/// Position of the line relative to the center of the robot, in 0.1 mm.
///
/// The result is the average of the distances of the sensors that see
/// the line, from -334 (left) to 334 (right). It is `None` when no sensor
/// sees the line.
pub fn position(data: u8) -> Option<i32> {
    let mut sum = 0i32;
    let mut count = 0;
    for (bit, weight) in WEIGHTS.iter().enumerate() {
        if data & (1 << bit) != 0 {
            sum += *weight;
            count += 1;
        }
    }
    if count == 0 { None } else { Some(sum / count) }
}

/// The LED2 color that shows which zone of the sensor sees the line:
/// - the two leftmost sensors - blue
/// - the four center sensors - green
/// - the two rightmost sensors - red
pub fn zone_color(data: u8) -> Color {
    let mut color = Color::empty();
    if data & 0b1100_0000 != 0 {
        color |= Color::BLUE;
    }
    if data & 0b0011_1100 != 0 {
        color |= Color::GREEN;
    }
    if data & 0b0000_0011 != 0 {
        color |= Color::RED;
    }
    color
}

/// What the periodic sampling task does on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplePhase {
    /// Turn the IR LEDs on and charge the sensors
    Start,
    /// Read the sensors, turn the IR LEDs off and publish the reading
    End,
    /// Nothing to do
    Idle,
}

/// Splits a sensor read over a periodic tick.
///
/// The sensors are charged on tick 0 and read on tick 1, every
/// `period` ticks. With a 1 ms tick and a period of 10, the line is read
/// every 10 ms and the sensors discharge for 1 ms.
#[derive(Debug, Clone, Copy)]
pub struct SampleSchedule {
    tick: u32,
    period: u32,
}

impl SampleSchedule {
    /// Default number of ticks between two reads
    pub const PERIOD: u32 = 10;

    /// # Panics
    ///
    /// If `period` is less than 2, there has to be a tick to start and
    /// one to end the read.
    pub const fn new(period: u32) -> SampleSchedule {
        assert!(period >= 2, "the period needs a start and an end tick");
        SampleSchedule { tick: 0, period }
    }

    /// Advances one tick and returns what has to be done on it.
    pub fn tick(&mut self) -> SamplePhase {
        let phase = match self.tick {
            0 => SamplePhase::Start,
            1 => SamplePhase::End,
            _ => SamplePhase::Idle,
        };
        self.tick = (self.tick + 1) % self.period;
        phase
    }
}

impl Default for SampleSchedule {
    fn default() -> Self {
        SampleSchedule::new(SampleSchedule::PERIOD)
    }
}
