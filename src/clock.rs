use crate::hal;

pub use hal::clock::Clock;

/// Board clock rate (16 MHz crystal on the Arduino Mega and Uno).
pub type BoardClock = hal::clock::MHz16;
