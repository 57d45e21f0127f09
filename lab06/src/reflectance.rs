//! QTR-8RC reflectance sensor driver.
//!
//! Every one of the 8 sensors is an IR LED and a phototransistor that
//! discharges a capacitor. The sensor pin is used both ways:
//! 1. as an output, set HIGH to charge the capacitor
//! 2. as an input, to see if the capacitor is still charged
//!
//! A white surface reflects the IR light and the capacitor discharges
//! quickly, the pin reads LOW. A black line does not reflect much light,
//! the capacitor discharges slowly and the pin still reads HIGH after the
//! discharge time. So a bit set in the reading means *this sensor sees
//! the line*.
//!
//! The pins have to switch between input and output, this is why they
//! are `Flex` pins.

use embassy_stm32::gpio::{Flex, Output, Pull, Speed};
use embassy_time::{Duration, Timer, block_for};
use line_follower::SensorInput;
use line_follower::reflectance::{CHARGE_PULSE_US, DEFAULT_DISCHARGE_US, center_symbol};
use line_follower::symbol::Symbol;

/// The reflectance sensor
pub struct Reflectance<'d> {
    /// The IR LEDs of all the sensors, active HIGH
    ir_led: Output<'d>,

    /// The sensor pins, index 0 is the sensor on the robot's right
    sensors: [Flex<'d>; 8],
}

impl<'d> Reflectance<'d> {
    /// Create a new sensor driver.
    ///
    /// The IR LEDs are turned off and the sensor pins are made inputs.
    pub fn new(mut ir_led: Output<'d>, mut sensors: [Flex<'d>; 8]) -> Reflectance<'d> {
        ir_led.set_low();
        for sensor in sensors.iter_mut() {
            sensor.set_as_input(Pull::None);
        }
        Reflectance { ir_led, sensors }
    }

    /// Reads the 8 sensors.
    ///
    /// The capacitors discharge for `discharge_us` microseconds
    /// before the pins are read. 1000 us works for most surfaces.
    pub async fn read(&mut self, discharge_us: u32) -> u8 {
        self.charge();
        Timer::after_micros(CHARGE_PULSE_US as u64).await;
        self.release();

        Timer::after_micros(discharge_us as u64).await;

        self.end()
    }

    /// Reads only the two center sensors and returns the 2-bit symbol
    /// used by the line follower.
    pub async fn center(&mut self, discharge_us: u32) -> Symbol {
        center_symbol(self.read(discharge_us).await)
    }

    /// Starts a read that is finished by [`Reflectance::end`].
    ///
    /// This is used by code that reads the sensors periodically and
    /// cannot wait for the discharge. The 10 us charge pulse is a busy
    /// wait.
    pub fn start(&mut self) {
        self.charge();
        block_for(Duration::from_micros(CHARGE_PULSE_US as u64));
        self.release();
    }

    /// Finishes a read started by [`Reflectance::start`].
    ///
    /// Reads the sensors and turns the IR LEDs off to save power.
    pub fn end(&mut self) -> u8 {
        let mut data = 0u8;
        for (bit, sensor) in self.sensors.iter().enumerate() {
            if sensor.is_high() {
                data |= 1 << bit;
            }
        }
        self.ir_led.set_low();
        data
    }

    /// Turns the IR LEDs on and starts charging the capacitors
    fn charge(&mut self) {
        self.ir_led.set_high();
        for sensor in self.sensors.iter_mut() {
            sensor.set_high();
            sensor.set_as_output(Speed::Low);
        }
    }

    /// Lets the capacitors discharge
    fn release(&mut self) {
        for sensor in self.sensors.iter_mut() {
            sensor.set_as_input(Pull::None);
        }
    }
}

/// The line follower reads the two center sensors.
impl SensorInput for Reflectance<'_> {
    async fn read_symbol(&mut self) -> u8 {
        self.center(DEFAULT_DISCHARGE_US).await.bits()
    }
}
