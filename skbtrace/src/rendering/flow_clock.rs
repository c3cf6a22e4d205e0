//! Per-skb timestamp bookkeeping for relative timestamps

use std::collections::HashMap;

use super::TimestampMode;
use crate::domain::FlowKey;

/// Last timestamp seen for every skb
///
/// Owned by the single consuming task. Entries are never evicted: one per
/// distinct skb address for the lifetime of the process.
#[derive(Debug, Default)]
pub struct FlowClock {
    last_seen: HashMap<FlowKey, u64>,
}

impl FlowClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the TIMESTAMP column, then remember `timestamp` for `flow`
    ///
    /// Returns `None` in [`TimestampMode::None`]. The clock is updated in
    /// every mode.
    pub fn observe(&mut self, mode: TimestampMode, flow: FlowKey, timestamp: u64) -> Option<u64> {
        let previous = self.last_seen.insert(flow, timestamp);

        match mode {
            TimestampMode::None => None,
            TimestampMode::Absolute => Some(timestamp),
            TimestampMode::Relative => {
                Some(previous.map_or(0, |last| timestamp.saturating_sub(last)))
            }
        }
    }

    /// Number of distinct flows seen so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_first_event_is_zero() {
        let mut clock = FlowClock::new();
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(0xAB), 100), Some(0));
    }

    #[test]
    fn test_relative_deltas() {
        let mut clock = FlowClock::new();
        let flow = FlowKey(0xAB);

        let rendered: Vec<_> = [100, 150, 400]
            .into_iter()
            .map(|ts| clock.observe(TimestampMode::Relative, flow, ts))
            .collect();

        assert_eq!(rendered, vec![Some(0), Some(50), Some(250)]);
    }

    #[test]
    fn test_relative_flows_are_independent() {
        let mut clock = FlowClock::new();

        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(1), 100), Some(0));
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(2), 130), Some(0));
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(1), 170), Some(70));
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(2), 135), Some(5));
        assert_eq!(clock.len(), 2);
    }

    #[test]
    fn test_relative_never_negative() {
        let mut clock = FlowClock::new();
        clock.observe(TimestampMode::Relative, FlowKey(1), 500);
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(1), 400), Some(0));
    }

    #[test]
    fn test_absolute_and_none() {
        let mut clock = FlowClock::new();

        assert_eq!(clock.observe(TimestampMode::Absolute, FlowKey(1), 100), Some(100));
        assert_eq!(clock.observe(TimestampMode::None, FlowKey(1), 150), None);
    }

    #[test]
    fn test_clock_updated_in_every_mode() {
        let mut clock = FlowClock::new();

        clock.observe(TimestampMode::None, FlowKey(1), 100);
        clock.observe(TimestampMode::Absolute, FlowKey(1), 150);
        assert_eq!(clock.observe(TimestampMode::Relative, FlowKey(1), 180), Some(30));
    }
}
