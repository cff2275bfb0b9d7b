use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

/// LED on a push-pull output pin, remembering its last state.
pub struct Led<P> {
    p: P,
    on: bool,
}

impl<P> Led<P>
where
    P: OutputPin<Error = Infallible>,
{
    /// Take over the pin, starting with the LED off.
    pub fn new(mut p: P) -> Self {
        let Ok(()) = p.set_low();
        Self { p, on: false }
    }

    pub fn turn_on(&mut self) {
        let Ok(()) = self.p.set_high();
        self.on = true;
    }

    pub fn turn_off(&mut self) {
        let Ok(()) = self.p.set_low();
        self.on = false;
    }

    /// Flip the LED, returning the new state.
    pub fn toggle(&mut self) -> bool {
        if self.on {
            self.turn_off();
        } else {
            self.turn_on();
        }
        self.on
    }
}
