// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Periodic value reporting
//!
//! Two modes: with a period of zero a value event is emitted whenever the
//! conditioned value differs from the last reported one; with a non-zero
//! period an event is emitted every `period` ticks, changed or not.

/// Value reporter driven once per tick
#[derive(Debug, Clone, Default)]
pub struct PeriodicReporter {
    period_ticks: u32,
    ticks_since_last_report: u32,
    last_reported: i32,
}

impl PeriodicReporter {
    /// Create a reporter with the given period
    pub fn new(period_ticks: u32) -> Self {
        Self {
            period_ticks,
            ticks_since_last_report: 0,
            last_reported: 0,
        }
    }

    /// Evaluate one conditioned value, returning it when an event must fire
    pub fn evaluate(&mut self, value: i32) -> Option<i32> {
        if self.period_ticks == 0 {
            if value == self.last_reported {
                return None;
            }
        } else {
            self.ticks_since_last_report += 1;
            if self.ticks_since_last_report < self.period_ticks {
                return None;
            }
            self.ticks_since_last_report = 0;
        }

        self.last_reported = value;
        Some(value)
    }

    /// Current period in ticks (0 = on change)
    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    /// Replace the period and restart the tick count
    pub fn set_period_ticks(&mut self, ticks: u32) {
        self.period_ticks = ticks;
        self.ticks_since_last_report = 0;
    }

    /// Last value handed out in an event
    pub fn last_reported(&self) -> i32 {
        self.last_reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_change_fires_once_for_repeated_value() {
        let mut reporter = PeriodicReporter::new(0);
        let fires = (0..5).filter_map(|_| reporter.evaluate(42)).count();
        assert_eq!(fires, 1);
        assert_eq!(reporter.last_reported(), 42);
    }

    #[test]
    fn test_on_change_silent_when_already_equal() {
        let mut reporter = PeriodicReporter::new(0);
        let fires = (0..5).filter_map(|_| reporter.evaluate(0)).count();
        assert_eq!(fires, 0);
    }

    #[test]
    fn test_on_change_tracks_every_divergence() {
        let mut reporter = PeriodicReporter::new(0);
        let values = [1, 1, 2, 2, 1, 3];
        let fired: Vec<i32> = values.iter().filter_map(|&v| reporter.evaluate(v)).collect();
        assert_eq!(fired, vec![1, 2, 1, 3]);
    }

    #[test]
    fn test_period_fires_regardless_of_change() {
        let mut reporter = PeriodicReporter::new(3);
        let fired: Vec<usize> = (1..=9)
            .filter(|_| reporter.evaluate(7).is_some())
            .collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[test]
    fn test_period_one_fires_every_tick() {
        let mut reporter = PeriodicReporter::new(1);
        for v in 0..10 {
            assert_eq!(reporter.evaluate(v), Some(v));
        }
    }

    #[test]
    fn test_set_period_restarts_count() {
        let mut reporter = PeriodicReporter::new(5);
        reporter.evaluate(1);
        reporter.evaluate(1);
        reporter.set_period_ticks(2);
        assert_eq!(reporter.evaluate(1), None);
        assert_eq!(reporter.evaluate(1), Some(1));
    }
}
