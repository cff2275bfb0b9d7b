//! Timer/Counter register access for the selected chip.
//!
//! Every timer present on the chip implements [`TimerRegisters`]. [`Timers`]
//! owns all of them and implements [`TimerBank`], so operations on a timer the
//! chip does not have are skipped.

use tc_config::{bits, ControlBytes, TimerBank, TimerId, TimerOp, TimerRegisters};

use crate::hal::pac;

macro_rules! impl_timer_registers {
    (
        $TC:ident, $id:ident, $width:ty,
        $tccra:ident, $tccrb:ident, $timsk:ident, $tifr:ident, $ocra:ident, $tcnt:ident
    ) => {
        impl TimerRegisters for pac::$TC {
            fn id(&self) -> TimerId {
                TimerId::$id
            }

            fn control(&self) -> ControlBytes {
                ControlBytes {
                    a: self.$tccra.read().bits(),
                    b: self.$tccrb.read().bits(),
                }
            }

            fn write_control(&self, control: ControlBytes) {
                // SAFETY: `TimerConfig::control_bytes` leaves reserved bits clear.
                self.$tccra.write(|w| unsafe { w.bits(control.a) });
                self.$tccrb.write(|w| unsafe { w.bits(control.b) });
            }

            fn interrupt_mask(&self) -> u8 {
                self.$timsk.read().bits()
            }

            fn write_interrupt_mask(&self, mask: u8) {
                // SAFETY: only enable bits of existing interrupt vectors are passed.
                self.$timsk.write(|w| unsafe { w.bits(mask) });
            }

            fn clear_interrupt_flags(&self, flags: u8) {
                // SAFETY: writing zeroes to TIFRn has no effect.
                self.$tifr.write(|w| unsafe { w.bits(flags) });
            }

            fn set_compare_a(&self, value: u16) {
                // SAFETY: every value is a valid compare value.
                self.$ocra.write(|w| unsafe { w.bits(value as $width) });
            }

            fn set_counter(&self, value: u16) {
                // SAFETY: every value is a valid counter value.
                self.$tcnt.write(|w| unsafe { w.bits(value as $width) });
            }
        }
    };
}

impl_timer_registers!(TC0, Timer0, u8, tccr0a, tccr0b, timsk0, tifr0, ocr0a, tcnt0);
impl_timer_registers!(TC1, Timer1, u16, tccr1a, tccr1b, timsk1, tifr1, ocr1a, tcnt1);
impl_timer_registers!(TC2, Timer2, u8, tccr2a, tccr2b, timsk2, tifr2, ocr2a, tcnt2);
#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
impl_timer_registers!(TC3, Timer3, u16, tccr3a, tccr3b, timsk3, tifr3, ocr3a, tcnt3);
#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
impl_timer_registers!(TC4, Timer4, u16, tccr4a, tccr4b, timsk4, tifr4, ocr4a, tcnt4);
#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
impl_timer_registers!(TC5, Timer5, u16, tccr5a, tccr5b, timsk5, tifr5, ocr5a, tcnt5);

/// Clock source of Timer2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer2Clock {
    /// I/O clock through the prescaler.
    Internal,
    /// Crystal on the TOSC pins.
    External,
}

/// All Timer/Counter peripherals of the chip.
///
/// Build it with [`timers!`](crate::timers).
pub struct Timers {
    pub tc0: pac::TC0,
    pub tc1: pac::TC1,
    pub tc2: pac::TC2,
    #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
    pub tc3: pac::TC3,
    #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
    pub tc4: pac::TC4,
    #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
    pub tc5: pac::TC5,
}

impl Timers {
    #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
    #[must_use]
    pub fn new(
        tc0: pac::TC0,
        tc1: pac::TC1,
        tc2: pac::TC2,
        tc3: pac::TC3,
        tc4: pac::TC4,
        tc5: pac::TC5,
    ) -> Self {
        Self {
            tc0,
            tc1,
            tc2,
            tc3,
            tc4,
            tc5,
        }
    }

    #[cfg(feature = "atmega328p")]
    #[must_use]
    pub fn new(tc0: pac::TC0, tc1: pac::TC1, tc2: pac::TC2) -> Self {
        Self { tc0, tc1, tc2 }
    }

    /// Select the Timer2 clock source through `AS2` in `ASSR`.
    pub fn set_timer2_clock(&self, clock: Timer2Clock) {
        self.tc2.assr.modify(|r, w| {
            let assr = match clock {
                Timer2Clock::Internal => r.bits() & !(1 << bits::AS2),
                Timer2Clock::External => r.bits() | (1 << bits::AS2),
            };
            // SAFETY: only AS2 changes, the update-busy flags are read-only.
            unsafe { w.bits(assr) }
        });
    }
}

impl TimerBank for Timers {
    fn with<O: TimerOp>(&self, id: TimerId, op: O) -> Option<O::Output> {
        match id {
            TimerId::Timer0 => Some(op.run(&self.tc0)),
            TimerId::Timer1 => Some(op.run(&self.tc1)),
            TimerId::Timer2 => Some(op.run(&self.tc2)),
            #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
            TimerId::Timer3 => Some(op.run(&self.tc3)),
            #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
            TimerId::Timer4 => Some(op.run(&self.tc4)),
            #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
            TimerId::Timer5 => Some(op.run(&self.tc5)),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

/// Collect the chip's timers out of the peripherals struct.
#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
#[macro_export]
macro_rules! timers {
    ($p:expr) => {
        $crate::timer::Timers::new($p.TC0, $p.TC1, $p.TC2, $p.TC3, $p.TC4, $p.TC5)
    };
}

/// Collect the chip's timers out of the peripherals struct.
#[cfg(feature = "atmega328p")]
#[macro_export]
macro_rules! timers {
    ($p:expr) => {
        $crate::timer::Timers::new($p.TC0, $p.TC1, $p.TC2)
    };
}
