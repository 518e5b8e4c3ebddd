/// Channel scheduler — deterministic hop sequence for the capture radio.
///
/// The scheduler is a pure counter over a fixed plan; it never blocks
/// and has no failure mode. If the underlying radio fails to switch,
/// the observation source reports that, not this component. The caller
/// drives `advance()` on a fixed wall-clock cadence, independent of how
/// much traffic the previous channel produced.

/// 2.4 GHz WiFi channels to cycle through.
pub const WIFI_CHANNELS: &[u8] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

/// Single-entry plan for sources with no channel concept (BLE, USB).
pub const SINGLE_CHANNEL: &[u8] = &[0];

/// Dwell time per channel in milliseconds. 120ms ensures reliable
/// beacon capture (beacons broadcast every ~100ms); a full WiFi cycle
/// is 13 × 120ms = 1.56s.
pub const DEFAULT_DWELL_MS: u64 = 120;

/// Cycles sequentially through a fixed, ordered channel plan.
#[derive(Debug, Clone)]
pub struct Scheduler {
    plan: &'static [u8],
    next: usize,
}

impl Scheduler {
    /// A scheduler over the given plan. The plan must be non-empty.
    pub const fn new(plan: &'static [u8]) -> Self {
        Self { plan, next: 0 }
    }

    pub const fn wifi() -> Self {
        Self::new(WIFI_CHANNELS)
    }

    /// Return the next channel to observe and advance, wrapping to the
    /// first entry after the last.
    pub fn advance(&mut self) -> u8 {
        let ch = self.plan[self.next];
        self.next = (self.next + 1) % self.plan.len();
        ch
    }

    /// The channel `advance()` will return next, without advancing.
    pub fn peek(&self) -> u8 {
        self.plan[self.next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_plan_in_order() {
        let mut s = Scheduler::wifi();
        for &expected in WIFI_CHANNELS {
            assert_eq!(s.advance(), expected);
        }
    }

    #[test]
    fn wraps_to_first_channel_after_last() {
        let mut s = Scheduler::wifi();
        for _ in 0..WIFI_CHANNELS.len() {
            s.advance();
        }
        assert_eq!(s.advance(), WIFI_CHANNELS[0]);
    }

    #[test]
    fn two_full_cycles_are_identical() {
        let mut s = Scheduler::wifi();
        let first: [u8; 13] = core::array::from_fn(|_| s.advance());
        let second: [u8; 13] = core::array::from_fn(|_| s.advance());
        assert_eq!(first, second);
    }

    #[test]
    fn single_channel_plan_is_a_no_op_cycle() {
        let mut s = Scheduler::new(SINGLE_CHANNEL);
        assert_eq!(s.advance(), 0);
        assert_eq!(s.advance(), 0);
        assert_eq!(s.peek(), 0);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut s = Scheduler::wifi();
        assert_eq!(s.peek(), 1);
        assert_eq!(s.peek(), 1);
        assert_eq!(s.advance(), 1);
        assert_eq!(s.peek(), 2);
    }
}
