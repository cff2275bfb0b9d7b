use nano_fmt::NanoWrite;

use crate::clock::BoardClock;
use crate::hal::{self, port};

#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
pub use port::{PE0 as RxPin, PE1 as TxPin};
#[cfg(feature = "atmega328p")]
pub use port::{PD0 as RxPin, PD1 as TxPin};

type Baudrate = avr_hal_generic::usart::Baudrate<BoardClock>;

/// Transmit-only logger on `USART0`, 8N1.
pub struct Usart0 {
    p: hal::pac::USART0,
}

impl Usart0 {
    /// Create new instance from raw hardware.
    #[must_use]
    pub fn new<IMODE: port::mode::InputMode>(
        p: hal::pac::USART0,
        _rx: port::Pin<port::mode::Input<IMODE>, RxPin>,
        _tx: port::Pin<port::mode::Output, TxPin>,
        baudrate: u32,
    ) -> Self {
        let baudrate = Baudrate::new(baudrate);
        // SAFETY: any divisor is a valid UBRR0 value.
        p.ubrr0.write(|w| unsafe { w.bits(baudrate.ubrr) });
        p.ucsr0a.write(|w| w.u2x0().bit(baudrate.u2x));

        // Only the transmitter is used, RX stays a plain input.
        p.ucsr0b.write(|w| w.txen0().set_bit());

        Self { p }
    }
}

impl NanoWrite for Usart0 {
    fn write_byte(&mut self, b: u8) {
        while self.p.ucsr0a.read().udre0().bit_is_clear() {}

        // SAFETY: UDR0 takes any data byte.
        self.p.udr0.write(|w| unsafe { w.bits(b) });
    }
}
