//! The LaunchPad switches and LEDs.
//!
//! The lab board has two push buttons and active LOW LEDs:
//! - LED1, a single LED
//! - LED2, an RGB LED made of three LEDs
//!
//! The buttons have pull up resistors, so they read LOW when pressed.
//! Everything in this module uses positive logic, a set bit means
//! *pressed* or *lit*, the conversion happens in [`Buttons`] and [`Leds`].

use core::convert::Infallible;

use bitflags::bitflags;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::driver::SensorInput;
use crate::symbol::Symbol;

bitflags! {
    /// The pressed buttons, the bits match the LaunchPad's port 1 layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Switches: u8 {
        /// The button on the left side of the board
        const SW1 = 0x02;
        /// The button on the right side of the board
        const SW2 = 0x10;
    }
}

bitflags! {
    /// The lit LEDs of LED2.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Color: u8 {
        const RED = 0x01;
        const GREEN = 0x02;
        const BLUE = 0x04;

        const YELLOW = Self::RED.bits() | Self::GREEN.bits();
        const SKY_BLUE = Self::GREEN.bits() | Self::BLUE.bits();
        const PINK = Self::RED.bits() | Self::BLUE.bits();
        const WHITE = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Switches {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Switches({=u8:#x})", self.bits())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Color {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Color({=u8:#x})", self.bits())
    }
}

impl Switches {
    /// Converts a raw (negative logic) port read into pressed buttons.
    ///
    /// All the bits that are not buttons are cleared.
    pub fn from_port(raw: u8) -> Switches {
        Switches::from_bits_truncate(!raw)
    }
}

impl Color {
    /// Color for the 3 low bits of a value, the higher bits are ignored
    pub fn from_low_bits(value: u8) -> Color {
        Color::from_bits_truncate(value)
    }
}

/// Shows which buttons are pressed.
///
/// Returns the state of LED1 (lit when any button is pressed) and the
/// color of LED2:
/// - SW1 - blue
/// - SW2 - red
/// - both - blue and red
/// - none - dark
pub fn mirror(switches: Switches) -> (bool, Color) {
    let color = if switches == Switches::SW1 | Switches::SW2 {
        Color::BLUE | Color::RED
    } else if switches == Switches::SW1 {
        Color::BLUE
    } else if switches == Switches::SW2 {
        Color::RED
    } else {
        Color::empty()
    };
    (!switches.is_empty(), color)
}

/// The colors that SW2 cycles through
const COLOR_CYCLE: [Color; 3] = [Color::RED, Color::GREEN, Color::BLUE];

/// LED2 toggled by SW1, its color cycled by SW2.
///
/// Only presses count, holding a button does nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorToggle {
    previous: Switches,
    led2_on: bool,
    color: usize,
}

impl ColorToggle {
    pub fn new() -> ColorToggle {
        ColorToggle::default()
    }

    /// Takes the buttons that are currently pressed and returns the
    /// state of LED1 and the color of LED2.
    pub fn update(&mut self, switches: Switches) -> (bool, Color) {
        // Buttons that were released last time and are pressed now
        let pressed = switches.difference(self.previous);

        if pressed.contains(Switches::SW1) {
            self.led2_on = !self.led2_on;
        }
        if pressed.contains(Switches::SW2) && self.led2_on {
            self.color = (self.color + 1) % COLOR_CYCLE.len();
        }
        self.previous = switches;

        (!switches.is_empty(), self.led2())
    }

    /// The color LED2 should display
    pub fn led2(&self) -> Color {
        if self.led2_on {
            COLOR_CYCLE[self.color]
        } else {
            Color::empty()
        }
    }
}

/// The two LaunchPad buttons.
///
/// For embassy, `I` is `Input<'_>`.
pub struct Buttons<I> {
    sw1: I,
    sw2: I,
}

impl<I: InputPin<Error = Infallible>> Buttons<I> {
    pub fn new(sw1: I, sw2: I) -> Buttons<I> {
        Buttons { sw1, sw2 }
    }

    /// Reads the buttons
    pub fn input(&mut self) -> Switches {
        let mut switches = Switches::empty();
        // The buttons read LOW when pressed.
        let Ok(sw1_pressed) = self.sw1.is_low();
        let Ok(sw2_pressed) = self.sw2.is_low();
        switches.set(Switches::SW1, sw1_pressed);
        switches.set(Switches::SW2, sw2_pressed);
        switches
    }

    /// Gives back the pins
    pub fn release(self) -> (I, I) {
        (self.sw1, self.sw2)
    }
}

/// The buttons can stand in for the line sensors: SW1 is the left sensor
/// and SW2 the right one, pressed means "sees the line".
impl<I: InputPin<Error = Infallible>> SensorInput for Buttons<I> {
    async fn read_symbol(&mut self) -> u8 {
        let switches = self.input();
        Symbol::from_sensors(
            switches.contains(Switches::SW1),
            switches.contains(Switches::SW2),
        )
        .bits()
    }
}

/// LED1 and the RGB LED2.
///
/// For embassy, `O` is `Output<'_>`.
pub struct Leds<O> {
    led1: O,
    /// red, green, blue
    rgb: [O; 3],
}

impl<O: OutputPin<Error = Infallible>> Leds<O> {
    /// Takes the pins and turns all the LEDs off.
    pub fn new(led1: O, rgb: [O; 3]) -> Leds<O> {
        let mut leds = Leds { led1, rgb };
        leds.led1(false);
        leds.led2(Color::empty());
        leds
    }

    /// Turns LED1 on or off
    pub fn led1(&mut self, on: bool) {
        // The LEDs are active LOW.
        let Ok(()) = self.led1.set_state(PinState::from(!on));
    }

    /// Displays a color on LED2
    pub fn led2(&mut self, color: Color) {
        let colors = [Color::RED, Color::GREEN, Color::BLUE];
        for (led, bit) in self.rgb.iter_mut().zip(colors) {
            let Ok(()) = led.set_state(PinState::from(!color.contains(bit)));
        }
    }

    /// Gives back the pins
    pub fn release(self) -> (O, [O; 3]) {
        (self.led1, self.rgb)
    }
}
