//! GPIO abstractions for the LED array.
//!
//! The array is wired active-low: driving a line [`Level::Low`] sinks
//! current through the LED and lights it, [`Level::High`] turns it off.
//! Everything above this module speaks in terms of channels being "on" or
//! "off" and never touches levels directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::GpioError;

/// Number of LEDs in the array.
pub const LED_COUNT: usize = 20;

/// BCM GPIO numbers, in array order from LED 0 to LED 19.
pub const DEFAULT_PINS: [u8; LED_COUNT] = [
    2, 3, 4, 14, 15, 18, 17, 27, 22, 23, 24, 10, 9, 11, 25, 8, 7, 1, 0, 5,
];

/// BCM GPIO number of the push button.
pub const BUTTON_PIN: u8 = 12;

/// Electrical level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level that lights an LED.
    pub const ON: Self = Self::Low;
    /// Idle level, LED dark.
    pub const OFF: Self = Self::High;
}

/// Digital output line.
pub trait OutputPin {
    /// Set the line high (logic 1).
    fn set_high(&mut self);

    /// Set the line low (logic 0).
    fn set_low(&mut self);

    /// Check if the line is currently driven high.
    fn is_set_high(&self) -> bool;

    fn write(&mut self, level: Level) {
        match level {
            Level::Low => self.set_low(),
            Level::High => self.set_high(),
        }
    }

    /// Light the LED on this line.
    fn turn_on(&mut self) {
        self.write(Level::ON);
    }

    /// Darken the LED on this line.
    fn turn_off(&mut self) {
        self.write(Level::OFF);
    }

    fn is_on(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input line.
pub trait InputPin {
    /// Check if the line reads high (logic 1).
    fn is_high(&self) -> bool;

    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Output line kept in memory, used for dry runs and tests.
#[derive(Debug, Clone)]
pub struct MemoryPin {
    bcm: u8,
    level: Level,
    lit: u32,
}

impl MemoryPin {
    /// Creates a line for the given BCM number, idle (LED off).
    #[must_use]
    pub const fn new(bcm: u8) -> Self {
        Self {
            bcm,
            level: Level::OFF,
            lit: 0,
        }
    }

    #[must_use]
    pub const fn bcm(&self) -> u8 {
        self.bcm
    }

    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Number of times the line has been driven to the "on" level.
    #[must_use]
    pub const fn lit_count(&self) -> u32 {
        self.lit
    }
}

impl OutputPin for MemoryPin {
    fn set_high(&mut self) {
        self.level = Level::High;
    }

    fn set_low(&mut self) {
        self.level = Level::Low;
        self.lit += 1;
    }

    fn is_set_high(&self) -> bool {
        self.level == Level::High
    }
}

/// Input line backed by a shared flag, used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    high: Arc<AtomicBool>,
}

impl MemoryInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, high: bool) {
        self.high.store(high, Ordering::Relaxed);
    }
}

impl InputPin for MemoryInput {
    fn is_high(&self) -> bool {
        self.high.load(Ordering::Relaxed)
    }
}

/// The fixed, ordered set of output channels driving the array.
///
/// Always holds exactly [`LED_COUNT`] lines. Channel `i` is LED `i`.
#[derive(Debug)]
pub struct ChannelMap<P> {
    pins: Vec<P>,
}

impl<P: OutputPin> ChannelMap<P> {
    /// Builds a map from lines in array order and forces them all off.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::PinCount`] unless exactly [`LED_COUNT`] lines are
    /// given.
    pub fn new(pins: Vec<P>) -> Result<Self, GpioError> {
        if pins.len() != LED_COUNT {
            return Err(GpioError::PinCount {
                expected: LED_COUNT,
                actual: pins.len(),
            });
        }
        let mut map = Self { pins };
        map.clear();
        Ok(map)
    }

    /// Forces every channel to the off level.
    pub fn clear(&mut self) {
        for pin in &mut self.pins {
            pin.turn_off();
        }
    }

    /// # Panics
    ///
    /// Panics if `index >= LED_COUNT`.
    pub fn turn_on(&mut self, index: usize) {
        self.pins[index].turn_on();
    }

    /// # Panics
    ///
    /// Panics if `index >= LED_COUNT`.
    pub fn turn_off(&mut self, index: usize) {
        self.pins[index].turn_off();
    }

    /// # Panics
    ///
    /// Panics if `index >= LED_COUNT`.
    #[must_use]
    pub fn is_on(&self, index: usize) -> bool {
        self.pins[index].is_on()
    }

    /// Bitmask of lit channels, bit `i` for channel `i`.
    #[must_use]
    pub fn pattern(&self) -> u32 {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| pin.is_on())
            .fold(0, |acc, (i, _)| acc | (1 << i))
    }

    #[must_use]
    pub fn pins(&self) -> &[P] {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut [P] {
        &mut self.pins
    }
}

impl ChannelMap<MemoryPin> {
    /// In-memory map labelled with the given BCM numbers.
    #[must_use]
    pub fn memory(bcm: &[u8; LED_COUNT]) -> Self {
        Self {
            pins: bcm.iter().copied().map(MemoryPin::new).collect(),
        }
    }
}

#[cfg(feature = "rpi")]
mod rpi {
    use rppal::gpio::{Gpio, InputPin as RppalInput, OutputPin as RppalOutput};

    use super::{ChannelMap, GpioError, InputPin, LED_COUNT, OutputPin};

    impl OutputPin for RppalOutput {
        fn set_high(&mut self) {
            RppalOutput::set_high(self);
        }

        fn set_low(&mut self) {
            RppalOutput::set_low(self);
        }

        fn is_set_high(&self) -> bool {
            RppalOutput::is_set_high(self)
        }
    }

    impl InputPin for RppalInput {
        fn is_high(&self) -> bool {
            RppalInput::is_high(self)
        }
    }

    impl ChannelMap<RppalOutput> {
        /// Claims the given BCM lines as outputs, idle high.
        ///
        /// # Errors
        ///
        /// Returns an error if the GPIO peripheral or any line is unavailable.
        pub fn open(gpio: &Gpio, bcm: &[u8; LED_COUNT]) -> Result<Self, GpioError> {
            let pins = bcm
                .iter()
                .map(|&n| Ok(gpio.get(n)?.into_output_high()))
                .collect::<Result<Vec<_>, GpioError>>()?;
            Self::new(pins)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_map_starts_dark() {
        let map = ChannelMap::memory(&DEFAULT_PINS);
        assert_eq!(map.pattern(), 0);
        assert!(map.pins().iter().all(|p| p.level() == Level::High));
        assert_eq!(map.pins()[3].bcm(), 14);
    }

    #[test]
    fn on_is_active_low() {
        let mut pin = MemoryPin::new(17);
        pin.turn_on();
        assert_eq!(pin.level(), Level::Low);
        assert!(pin.is_on());
        pin.turn_off();
        assert_eq!(pin.level(), Level::High);
        assert_eq!(pin.lit_count(), 1);
    }

    #[test]
    fn pattern_tracks_channels() {
        let mut map = ChannelMap::memory(&DEFAULT_PINS);
        map.turn_on(0);
        map.turn_on(19);
        assert_eq!(map.pattern(), 1 | (1 << 19));
        map.clear();
        assert_eq!(map.pattern(), 0);
    }

    #[test]
    fn new_rejects_wrong_count() {
        let pins = vec![MemoryPin::new(2); 8];
        let err = ChannelMap::new(pins).unwrap_err();
        assert!(matches!(
            err,
            GpioError::PinCount {
                expected: 20,
                actual: 8
            }
        ));
    }

    #[test]
    fn new_forces_off() {
        let mut pins: Vec<_> = DEFAULT_PINS.iter().copied().map(MemoryPin::new).collect();
        pins[5].turn_on();
        let map = ChannelMap::new(pins).expect("20 pins");
        assert_eq!(map.pattern(), 0);
    }

    #[test]
    fn memory_input_follows_flag() {
        let input = MemoryInput::new();
        assert!(input.is_low());
        input.set(true);
        assert!(input.is_high());
    }
}
