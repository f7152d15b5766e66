use std::collections::HashMap;

use crate::FrequencyConfig;
use crate::PartPos;

/// Per-channel adaptive re-check bookkeeping.
///
/// Two sparse tables, both with absence-means-default semantics:
/// - `next_ticks`: the tick a position is next due at. Absent, or holding a
///   value at or below the current tick, means due now.
/// - `intervals`: the position's current interval. Absent means the
///   configured maximum.
///
/// A freshly tracked position therefore costs nothing until it deviates from
/// the defaults, and a position that settles back to the defaults costs
/// nothing again.
pub struct FrequencyTracker {
    next_ticks: HashMap<PartPos, u64>,
    intervals: HashMap<PartPos, u64>,
}

impl FrequencyTracker {
    pub fn new() -> Self {
        Self {
            next_ticks: HashMap::new(),
            intervals: HashMap::new(),
        }
    }

    pub fn is_due(
        &self,
        pos: &PartPos,
        current_tick: u64,
    ) -> bool {
        self.next_ticks.get(pos).map_or(true, |due| *due <= current_tick)
    }

    /// Adapt after a completed (non-skipped) observation of `pos`.
    ///
    /// A changed position backs off toward `frequency_min` by the decrease
    /// factor; a quiet one drifts toward `frequency_max` by the increase
    /// factor. Both clamp at their bound. The tables are rewritten only when
    /// the stored value would differ from its default: an interval of 1
    /// keeps no next-tick entry (due every tick) and an interval at the
    /// maximum keeps no interval entry.
    ///
    /// Returns the effective interval.
    pub fn on_observed(
        &mut self,
        pos: PartPos,
        current_tick: u64,
        has_changes: bool,
        config: &FrequencyConfig,
    ) -> u64 {
        let mut interval = self.intervals.get(&pos).copied().unwrap_or(config.frequency_max);
        let mut interval_changed = false;

        if has_changes && interval > config.frequency_min {
            interval = interval
                .saturating_sub(config.frequency_decrease_factor)
                .max(config.frequency_min);
            interval_changed = true;
        }
        if !has_changes && interval < config.frequency_max {
            interval = (interval + config.frequency_increase_factor).min(config.frequency_max);
            interval_changed = true;
        }

        if interval != 1 {
            self.next_ticks.insert(pos, current_tick + interval);
        } else {
            self.next_ticks.remove(&pos);
        }

        if interval_changed {
            if interval != config.frequency_max {
                self.intervals.insert(pos, interval);
            } else {
                self.intervals.remove(&pos);
            }
        }

        interval
    }

    /// Drop all bookkeeping for a position that left the network.
    pub fn forget(
        &mut self,
        pos: &PartPos,
    ) {
        self.next_ticks.remove(pos);
        self.intervals.remove(pos);
    }

    pub fn interval(
        &self,
        pos: &PartPos,
    ) -> Option<u64> {
        self.intervals.get(pos).copied()
    }

    pub fn next_tick(
        &self,
        pos: &PartPos,
    ) -> Option<u64> {
        self.next_ticks.get(pos).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.next_ticks.is_empty() && self.intervals.is_empty()
    }
}

impl Default for FrequencyTracker {
    fn default() -> Self {
        Self::new()
    }
}
