//! Setup sequences on top of raw timer register access.
//!
//! A chip crate implements [`TimerRegisters`] for each of its Timer/Counter
//! peripherals and [`TimerBank`] for the set it owns. The sequences are written
//! once here against those traits and dispatch statically.

use crate::{bits, ControlBytes, InterruptSelection, TimerConfig, TimerId};

/// Raw access to one timer's registers plus the setup steps built on it.
pub trait TimerRegisters {
    fn id(&self) -> TimerId;

    /// Current `TCCRnA` / `TCCRnB`.
    fn control(&self) -> ControlBytes;

    /// Write `TCCRnA`, then `TCCRnB`.
    fn write_control(&self, control: ControlBytes);

    fn interrupt_mask(&self) -> u8;

    fn write_interrupt_mask(&self, mask: u8);

    /// Clear pending flags in `TIFRn`. Flags are cleared by writing a one.
    fn clear_interrupt_flags(&self, flags: u8);

    /// Write `OCRnA`, truncated to the counter width.
    fn set_compare_a(&self, value: u16);

    /// Write `TCNTn`, truncated to the counter width.
    fn set_counter(&self, value: u16);

    /// Mask the overflow and compare A/B interrupts before reconfiguring.
    /// Other enable bits in `TIMSKn` are kept.
    fn begin_setup(&self) {
        let mask = self.interrupt_mask();
        self.write_interrupt_mask(mask & !bits::SETUP_INTERRUPT_MASK);
    }

    fn setup(&self, config: &TimerConfig) {
        self.write_control(config.control_bytes(self.id()));
    }

    /// Drop stale pending flags for `selection`, then enable exactly those
    /// interrupts. Global interrupts still have to be enabled separately.
    fn set_interrupts(&self, selection: InterruptSelection) {
        self.clear_interrupt_flags(selection.bits());
        self.write_interrupt_mask(selection.bits());
    }
}

/// An operation run on whichever concrete timer a [`TimerBank`] resolves.
pub trait TimerOp {
    type Output;

    fn run<T: TimerRegisters>(self, timer: &T) -> Self::Output;
}

/// The set of timers a chip has, addressed by [`TimerId`].
///
/// Operations on a timer the chip does not have are skipped.
pub trait TimerBank {
    /// Run `op` on timer `id`, `None` if the chip does not have it.
    fn with<O: TimerOp>(&self, id: TimerId, op: O) -> Option<O::Output>;

    fn has(&self, id: TimerId) -> bool {
        self.with(id, Present).is_some()
    }

    fn begin_setup(&self, id: TimerId) {
        self.with(id, BeginSetup);
    }

    fn setup(&self, id: TimerId, config: &TimerConfig) {
        self.with(id, Setup(config));
    }

    fn set_interrupts(&self, id: TimerId, selection: InterruptSelection) {
        self.with(id, SetInterrupts(selection));
    }

    fn set_compare_a(&self, id: TimerId, value: u16) {
        self.with(id, CompareA(value));
    }

    fn reset_counter(&self, id: TimerId) {
        self.with(id, Counter(0));
    }

    fn control(&self, id: TimerId) -> Option<ControlBytes> {
        self.with(id, Control)
    }
}

struct Present;
struct BeginSetup;
struct Setup<'a>(&'a TimerConfig);
struct SetInterrupts(InterruptSelection);
struct CompareA(u16);
struct Counter(u16);
struct Control;

impl TimerOp for Present {
    type Output = ();

    fn run<T: TimerRegisters>(self, _timer: &T) {}
}

impl TimerOp for BeginSetup {
    type Output = ();

    fn run<T: TimerRegisters>(self, timer: &T) {
        timer.begin_setup();
    }
}

impl TimerOp for Setup<'_> {
    type Output = ();

    fn run<T: TimerRegisters>(self, timer: &T) {
        timer.setup(self.0);
    }
}

impl TimerOp for SetInterrupts {
    type Output = ();

    fn run<T: TimerRegisters>(self, timer: &T) {
        timer.set_interrupts(self.0);
    }
}

impl TimerOp for CompareA {
    type Output = ();

    fn run<T: TimerRegisters>(self, timer: &T) {
        timer.set_compare_a(self.0);
    }
}

impl TimerOp for Counter {
    type Output = ();

    fn run<T: TimerRegisters>(self, timer: &T) {
        timer.set_counter(self.0);
    }
}

impl TimerOp for Control {
    type Output = ControlBytes;

    fn run<T: TimerRegisters>(self, timer: &T) -> ControlBytes {
        timer.control()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::WaveformMode;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Access {
        Control(ControlBytes),
        Mask(u8),
        Flags(u8),
        CompareA(u16),
        Counter(u16),
    }

    /// Register block recording every write, with TIMSKn readable.
    struct FakeTimer {
        id: TimerId,
        control: RefCell<ControlBytes>,
        mask: RefCell<u8>,
        log: RefCell<Vec<Access>>,
    }

    impl FakeTimer {
        fn new(id: TimerId) -> Self {
            Self {
                id,
                control: RefCell::new(ControlBytes::default()),
                mask: RefCell::new(0),
                log: RefCell::new(Vec::new()),
            }
        }

        fn with_mask(self, mask: u8) -> Self {
            *self.mask.borrow_mut() = mask;
            self
        }

        fn writes(&self) -> Vec<Access> {
            self.log.borrow().clone()
        }
    }

    impl TimerRegisters for FakeTimer {
        fn id(&self) -> TimerId {
            self.id
        }

        fn control(&self) -> ControlBytes {
            *self.control.borrow()
        }

        fn write_control(&self, control: ControlBytes) {
            *self.control.borrow_mut() = control;
            self.log.borrow_mut().push(Access::Control(control));
        }

        fn interrupt_mask(&self) -> u8 {
            *self.mask.borrow()
        }

        fn write_interrupt_mask(&self, mask: u8) {
            *self.mask.borrow_mut() = mask;
            self.log.borrow_mut().push(Access::Mask(mask));
        }

        fn clear_interrupt_flags(&self, flags: u8) {
            self.log.borrow_mut().push(Access::Flags(flags));
        }

        fn set_compare_a(&self, value: u16) {
            self.log.borrow_mut().push(Access::CompareA(value));
        }

        fn set_counter(&self, value: u16) {
            self.log.borrow_mut().push(Access::Counter(value));
        }
    }

    /// A chip with Timers 0-2 only.
    struct SmallChip {
        tc0: FakeTimer,
        tc1: FakeTimer,
        tc2: FakeTimer,
    }

    impl SmallChip {
        fn new() -> Self {
            Self {
                tc0: FakeTimer::new(TimerId::Timer0),
                tc1: FakeTimer::new(TimerId::Timer1),
                tc2: FakeTimer::new(TimerId::Timer2),
            }
        }

        fn all_writes(&self) -> Vec<Access> {
            let mut writes = self.tc0.writes();
            writes.extend(self.tc1.writes());
            writes.extend(self.tc2.writes());
            writes
        }
    }

    impl TimerBank for SmallChip {
        fn with<O: TimerOp>(&self, id: TimerId, op: O) -> Option<O::Output> {
            match id {
                TimerId::Timer0 => Some(op.run(&self.tc0)),
                TimerId::Timer1 => Some(op.run(&self.tc1)),
                TimerId::Timer2 => Some(op.run(&self.tc2)),
                _ => None,
            }
        }
    }

    #[test]
    fn begin_setup_keeps_other_enables() {
        // ICIEn (bit 5) plus overflow and both compare interrupts.
        let timer = FakeTimer::new(TimerId::Timer1).with_mask(0b0010_0111);
        timer.begin_setup();

        assert_eq!(timer.writes(), vec![Access::Mask(0b0010_0000)]);
    }

    #[test]
    fn set_interrupts_clears_flags_first() {
        let timer = FakeTimer::new(TimerId::Timer2).with_mask(0b0000_0001);
        timer.set_interrupts(InterruptSelection::COMPARE_A);

        assert_eq!(
            timer.writes(),
            vec![Access::Flags(0b010), Access::Mask(0b010)]
        );
    }

    #[test]
    fn setup_writes_packed_control() {
        let timer = FakeTimer::new(TimerId::Timer2);
        timer.setup(&TimerConfig::new(WaveformMode::CTC, 64));

        assert_eq!(
            timer.writes(),
            vec![Access::Control(ControlBytes { a: 0x02, b: 0x04 })]
        );
    }

    #[test]
    fn blink_sequence() {
        let chip = SmallChip::new();
        let id = TimerId::Timer2;

        chip.begin_setup(id);
        chip.setup(id, &TimerConfig::new(WaveformMode::CTC, 64));
        chip.set_compare_a(id, 3);
        chip.reset_counter(id);
        chip.set_interrupts(id, InterruptSelection::COMPARE_A);

        assert_eq!(
            chip.tc2.writes(),
            vec![
                Access::Mask(0),
                Access::Control(ControlBytes { a: 0x02, b: 0x04 }),
                Access::CompareA(3),
                Access::Counter(0),
                Access::Flags(0b010),
                Access::Mask(0b010),
            ]
        );
        assert_eq!(chip.control(id), Some(ControlBytes { a: 0x02, b: 0x04 }));
        assert!(chip.tc0.writes().is_empty());
        assert!(chip.tc1.writes().is_empty());
    }

    #[test]
    fn missing_timers_are_skipped() {
        let chip = SmallChip::new();

        for id in [TimerId::Timer3, TimerId::Timer4, TimerId::Timer5] {
            assert!(!chip.has(id));
            chip.begin_setup(id);
            chip.setup(id, &TimerConfig::new(WaveformMode::CTC_OCRA_16BIT, 256));
            chip.set_compare_a(id, 62_499);
            chip.reset_counter(id);
            chip.set_interrupts(id, InterruptSelection::OVERFLOW);
            assert_eq!(chip.control(id), None);
        }

        assert!(chip.has(TimerId::Timer0));
        assert!(chip.all_writes().is_empty());
    }
}
