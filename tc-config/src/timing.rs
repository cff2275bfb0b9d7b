//! Compare values for CTC mode.
//!
//! In CTC mode the counter runs from 0 up to the compare value and is then
//! cleared, so an interrupt fires every `top + 1` timer counts.

/// Compare value making a CTC timer interrupt at `rate_hz`.
///
/// Returns `None` when the rate is zero or faster than one interrupt per
/// timer count. The caller still has to check that the value fits the
/// counter width.
#[must_use]
pub const fn ctc_top(clock_hz: u32, prescale: u32, rate_hz: u32) -> Option<u32> {
    if prescale == 0 || rate_hz == 0 {
        return None;
    }

    let counts = clock_hz / prescale / rate_hz;
    if counts == 0 { None } else { Some(counts - 1) }
}

/// Interrupt rate of a CTC timer with the given compare value.
///
/// Zero for a stopped timer or a `top` no counter can reach.
#[must_use]
pub const fn interrupt_rate(clock_hz: u32, prescale: u32, top: u32) -> u32 {
    if prescale == 0 {
        return 0;
    }
    match top.checked_add(1) {
        Some(counts) => clock_hz / prescale / counts,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_microsecond_tick() {
        // 16 MHz / 64 = 4 us per count, 4 counts per interrupt.
        assert_eq!(ctc_top(16_000_000, 64, 62_500), Some(3));
        assert_eq!(interrupt_rate(16_000_000, 64, 3), 62_500);
    }

    #[test]
    fn one_second_on_sixteen_bit_timer() {
        assert_eq!(ctc_top(16_000_000, 256, 1), Some(62_499));
        assert_eq!(ctc_top(8_000_000, 256, 1), Some(31_249));
    }

    #[test]
    fn unreachable_rates() {
        assert_eq!(ctc_top(16_000_000, 0, 1), None);
        assert_eq!(ctc_top(16_000_000, 64, 0), None);
        assert_eq!(ctc_top(16_000_000, 1024, 1_000_000), None);
        assert_eq!(interrupt_rate(16_000_000, 0, 3), 0);
    }

    #[test]
    fn widest_top() {
        assert_eq!(interrupt_rate(16_000_000, 64, u32::MAX), 0);
        assert_eq!(interrupt_rate(16_000_000, 1, u32::MAX - 1), 0);
        assert_eq!(interrupt_rate(16_000_000, 1, u16::MAX as u32), 244);
    }
}
