#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use avr_device::interrupt::{self, CriticalSection, Mutex};
use core::cell::Cell;
use panic_halt as _;
use tc_config::{timing, InterruptSelection, TimerBank, TimerConfig, TimerId, WaveformMode};

use timer_blink::{
    clock::{BoardClock, Clock},
    hal,
    led::Led,
    timer::Timer2Clock,
    timers,
    usart::Usart0,
};

/// UART baud rate.
const BAUDRATE: u32 = 9600;

/// Timer driving the blink.
const BLINK_TIMER: TimerId = TimerId::Timer2;

/// Prescaler for the blink timer, 4us per count at 16 MHz.
const PRESCALE: u16 = 64;

/// `TIMER2_COMPA` rate, one interrupt every 16us.
const TICK_RATE: u32 = 62_500;

/// The LED changes state once this many ticks have been exceeded.
const TICKS_PER_TOGGLE: u32 = TICK_RATE;

/// OCR2A value for `TICK_RATE` interrupts per second.
const COMPARE: u8 = match timing::ctc_top(BoardClock::FREQ, PRESCALE as u32, TICK_RATE) {
    Some(top) if top <= u8::MAX as u32 => top as u8,
    _ => panic!("tick rate is out of range for an 8-bit timer"),
};

/// CTC with OCR2A as top, all compare outputs disconnected.
const BLINK_CONFIG: TimerConfig = TimerConfig::new(WaveformMode::CTC, PRESCALE);

/// Compare matches since the LED last changed.
static TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// TIMER2 compare interrupt.
/// Called every time TCNT2 reaches OCR2A and is reset back to 0 (CTC mode).
#[cfg_attr(feature = "atmega1280", avr_device::interrupt(atmega1280))]
#[cfg_attr(feature = "atmega2560", avr_device::interrupt(atmega2560))]
#[cfg_attr(feature = "atmega328p", avr_device::interrupt(atmega328p))]
fn TIMER2_COMPA() {
    // SAFETY: We are inside a blocking interrupt.
    let cs = unsafe { CriticalSection::new() };

    let ticks = TICKS.borrow(cs);
    ticks.set(ticks.get().wrapping_add(1));
}

/// Return true and restart the count once a full period has elapsed.
fn period_elapsed() -> bool {
    let ticks = interrupt::free(|cs| TICKS.borrow(cs).get());
    if ticks <= TICKS_PER_TOGGLE {
        return false;
    }

    interrupt::free(|cs| TICKS.borrow(cs).set(0));
    true
}

#[hal::entry]
fn main() -> ! {
    let dp = hal::Peripherals::take().unwrap();
    let pins = hal::pins!(dp);

    #[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
    let (rx, tx, led) = (pins.pe0, pins.pe1, pins.pb7);
    #[cfg(feature = "atmega328p")]
    let (rx, tx, led) = (pins.pd0, pins.pd1, pins.pb5);

    let mut serial = Usart0::new(
        dp.USART0,
        rx.into_pull_up_input(),
        tx.into_output(),
        BAUDRATE,
    );
    nano_fmt::write!(&mut serial, "timer-blink\r\n");

    let mut led = Led::new(led.into_output());

    let timers = timers!(dp);
    timers.begin_setup(BLINK_TIMER);
    timers.set_timer2_clock(Timer2Clock::Internal);
    timers.setup(BLINK_TIMER, &BLINK_CONFIG);
    timers.set_compare_a(BLINK_TIMER, COMPARE.into());
    timers.reset_counter(BLINK_TIMER);
    timers.set_interrupts(BLINK_TIMER, InterruptSelection::COMPARE_A);

    if let Some(control) = timers.control(BLINK_TIMER) {
        nano_fmt::write!(
            &mut serial,
            "timer{}: TCCRA={:x} TCCRB={:b} OCRA={}\r\n",
            BLINK_TIMER.index(),
            control.a,
            control.b,
            COMPARE
        );
    }

    // SAFETY: Not inside a critical section and the timer setup has been
    // completed at this point.
    unsafe {
        avr_device::interrupt::enable();
    }

    loop {
        if period_elapsed() {
            if led.toggle() {
                nano_fmt::write!(&mut serial, "led on\r\n");
            } else {
                nano_fmt::write!(&mut serial, "led off\r\n");
            }
        }
    }
}
