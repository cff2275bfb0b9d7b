//! Register byte encoding for the AVR Timer/Counter peripherals.
//!
//! Everything here is a pure mapping from small parameter codes to the bytes
//! written into `TCCRnA`, `TCCRnB`, `TIMSKn` and `TIFRn`. Out of range values
//! are masked to the width of their bitfield, never rejected.
#![cfg_attr(not(test), no_std)]

use core::ops::{BitOr, BitOrAssign};

pub mod registers;
pub mod timing;

pub use registers::{TimerBank, TimerOp, TimerRegisters};

/// Bit positions shared by every timer's registers.
pub mod bits {
    /// Overflow interrupt enable (`TIMSKn`) and overflow flag (`TIFRn`).
    pub const TOIE: u8 = 0;
    /// Output compare A match interrupt enable / flag.
    pub const OCIEA: u8 = 1;
    /// Output compare B match interrupt enable / flag.
    pub const OCIEB: u8 = 2;
    /// Timer2 asynchronous clock select in `ASSR`.
    pub const AS2: u8 = 5;

    /// Interrupt enables cleared before a timer is reconfigured.
    pub const SETUP_INTERRUPT_MASK: u8 = (1 << TOIE) | (1 << OCIEA) | (1 << OCIEB);
}

/// One of the six Timer/Counter peripherals an AVR may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TimerId {
    Timer0 = 0,
    Timer1 = 1,
    Timer2 = 2,
    Timer3 = 3,
    Timer4 = 4,
    Timer5 = 5,
}

/// Counter register width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    Bits8,
    Bits16,
}

impl TimerId {
    /// Map a timer number to its id, `None` for anything above 5.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Timer0),
            1 => Some(Self::Timer1),
            2 => Some(Self::Timer2),
            3 => Some(Self::Timer3),
            4 => Some(Self::Timer4),
            5 => Some(Self::Timer5),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Timer0 and Timer2 are 8-bit, the rest are 16-bit.
    #[must_use]
    pub const fn width(self) -> Width {
        match self {
            Self::Timer0 | Self::Timer2 => Width::Bits8,
            _ => Width::Bits16,
        }
    }

    const fn is_wide(self) -> bool {
        matches!(self.width(), Width::Bits16)
    }
}

/// Waveform generation mode, `WGMn3 << 3 | WGMn2 << 2 | WGMn1 << 1 | WGMn0`.
///
/// The named constants follow the 8-bit timer table unless suffixed otherwise.
/// The numbering differs between 8- and 16-bit timers, so any 4-bit code can be
/// built with [`WaveformMode::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformMode(u8);

impl WaveformMode {
    /// Count to `0xFF`, update OCRx immediately.
    pub const NORMAL: Self = Self(0);
    /// Phase correct PWM, top `0xFF`.
    pub const PWM_PHASE_CORRECT: Self = Self(1);
    /// Clear timer on compare match with OCRnA.
    pub const CTC: Self = Self(2);
    /// Fast PWM, top `0xFF`.
    pub const FAST_PWM: Self = Self(3);
    /// Phase correct PWM, top OCRnA.
    pub const PWM_PHASE_CORRECT_OCRA: Self = Self(5);
    /// Fast PWM, top OCRnA.
    pub const FAST_PWM_OCRA: Self = Self(7);
    /// 16-bit timers: CTC with top OCRnA.
    pub const CTC_OCRA_16BIT: Self = Self(4);
    /// 16-bit timers: CTC with top ICRn.
    pub const CTC_ICR_16BIT: Self = Self(12);

    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Behaviour of an OCnx pin on compare match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CompareOutputMode {
    /// Normal port operation, pin disconnected from the timer.
    #[default]
    Disconnected = 0,
    Toggle = 1,
    /// Set output low.
    Clear = 2,
    /// Set output high.
    Set = 3,
}

impl CompareOutputMode {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Disconnected,
            1 => Self::Toggle,
            2 => Self::Clear,
            _ => Self::Set,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Input capture unit setup, `ICNCn << 1 | ICESn`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureMode {
    pub noise_canceller: bool,
    /// Capture on the rising edge instead of the falling one.
    pub rising_edge: bool,
}

impl CaptureMode {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            noise_canceller: bits & 0b10 != 0,
            rising_edge: bits & 0b01 != 0,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        ((self.noise_canceller as u8) << 1) | self.rising_edge as u8
    }
}

/// Set of timer interrupts, `OCFnB << 2 | OCFnA << 1 | TOVn`.
///
/// The same layout is used for the enable bits in `TIMSKn` and the pending
/// flags in `TIFRn`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptSelection(u8);

impl InterruptSelection {
    pub const NONE: Self = Self(0);
    /// `TIMERn_OVF`.
    pub const OVERFLOW: Self = Self(1 << bits::TOIE);
    /// `TIMERn_COMPA`.
    pub const COMPARE_A: Self = Self(1 << bits::OCIEA);
    /// `TIMERn_COMPB`.
    pub const COMPARE_B: Self = Self(1 << bits::OCIEB);

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InterruptSelection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for InterruptSelection {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Translate a prescaler divisor into the `CSn2:0` clock select bits.
///
/// Timer2 runs from its own asynchronous prescaler, which also offers /32 and
/// /128. The other timers share the synchronous prescaler; codes 6 and 7 select
/// the external `Tn` pin there. A divisor the timer cannot produce stops
/// Timers 1-5 and switches Timer0 to its external clock, rising edge.
#[must_use]
pub const fn clock_select(timer: TimerId, divisor: u16) -> u8 {
    match timer {
        TimerId::Timer2 => match divisor {
            1 => 1,
            8 => 2,
            32 => 3,
            64 => 4,
            128 => 5,
            256 => 6,
            1024 => 7,
            _ => 0,
        },
        _ => match divisor {
            0 => 0,
            1 => 1,
            8 => 2,
            64 => 3,
            256 => 4,
            1024 => 5,
            _ => match timer {
                TimerId::Timer0 => 7,
                _ => 0,
            },
        },
    }
}

/// Packed `TCCRnA` / `TCCRnB` values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlBytes {
    pub a: u8,
    pub b: u8,
}

/// Everything written into a timer's control registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    pub waveform: WaveformMode,
    /// Clock divisor, see [`clock_select`]. `0` stops the timer.
    pub prescale: u16,
    pub compare_a: CompareOutputMode,
    pub compare_b: CompareOutputMode,
    pub compare_c: CompareOutputMode,
    pub capture: CaptureMode,
}

impl TimerConfig {
    /// A configuration with all output pins disconnected and capture off.
    #[must_use]
    pub const fn new(waveform: WaveformMode, prescale: u16) -> Self {
        Self {
            waveform,
            prescale,
            compare_a: CompareOutputMode::Disconnected,
            compare_b: CompareOutputMode::Disconnected,
            compare_c: CompareOutputMode::Disconnected,
            capture: CaptureMode {
                noise_canceller: false,
                rising_edge: false,
            },
        }
    }

    #[must_use]
    pub const fn compare_a(mut self, mode: CompareOutputMode) -> Self {
        self.compare_a = mode;
        self
    }

    #[must_use]
    pub const fn compare_b(mut self, mode: CompareOutputMode) -> Self {
        self.compare_b = mode;
        self
    }

    #[must_use]
    pub const fn compare_c(mut self, mode: CompareOutputMode) -> Self {
        self.compare_c = mode;
        self
    }

    #[must_use]
    pub const fn capture(mut self, mode: CaptureMode) -> Self {
        self.capture = mode;
        self
    }

    /// Pack the configuration for `timer`.
    ///
    /// `TCCRnA = COMnA << 6 | COMnB << 4 | COMnC << 2 | WGMn1:0` and
    /// `TCCRnB = ICNCn << 7 | ICESn << 6 | WGMn3:2 << 3 | CSn2:0`.
    /// On 8-bit timers channel C, the capture bits (force output compare
    /// strobes there) and `WGM3` are left clear.
    #[must_use]
    pub const fn control_bytes(&self, timer: TimerId) -> ControlBytes {
        let wide = timer.is_wide();

        let waveform = if wide {
            self.waveform.bits()
        } else {
            self.waveform.bits() & 0x07
        };
        let compare_c = if wide { self.compare_c.bits() } else { 0 };
        let capture = if wide { self.capture.bits() } else { 0 };

        let a = (self.compare_a.bits() << 6)
            | (self.compare_b.bits() << 4)
            | (compare_c << 2)
            | (waveform & 0x03);
        let b = (capture << 6) | ((waveform & 0x0C) << 1) | clock_select(timer, self.prescale);

        ControlBytes { a, b }
    }
}
