//! Metrics collection for the measurement loop
//!
//! This module counts ticks, skipped ticks and emitted events so that a
//! host can tell how often the sensor was unavailable and how chatty the
//! callback configuration is.

/// Counters maintained by the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetrics {
    /// Ticks that completed a measurement cycle
    pub ticks: u64,
    /// Ticks skipped because no raw sample could be acquired
    pub skipped_ticks: u64,
    /// Value events handed to the channel
    pub value_events: u64,
    /// Threshold events handed to the channel
    pub threshold_events: u64,
    /// Events the channel refused
    pub channel_failures: u64,
    /// Filter reinitializations caused by window resizes
    pub window_resets: u64,
}

impl DeviceMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed cycle
    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Record a cycle skipped for lack of a sample
    pub fn record_skipped_tick(&mut self) {
        self.skipped_ticks += 1;
    }

    /// Record a published value event
    pub fn record_value_event(&mut self) {
        self.value_events += 1;
    }

    /// Record a published threshold event
    pub fn record_threshold_event(&mut self) {
        self.threshold_events += 1;
    }

    /// Record an event the channel rejected
    pub fn record_channel_failure(&mut self) {
        self.channel_failures += 1;
    }

    /// Record a window reinitialization
    pub fn record_window_reset(&mut self) {
        self.window_resets += 1;
    }

    /// Total scheduler ticks seen, completed or skipped
    pub fn total_ticks(&self) -> u64 {
        self.ticks + self.skipped_ticks
    }

    /// Fraction of ticks that produced a measurement (0.0 - 1.0)
    pub fn availability(&self) -> f64 {
        let total = self.total_ticks();
        if total == 0 {
            return 1.0;
        }
        self.ticks as f64 / total as f64
    }

    /// Events published per completed tick
    pub fn events_per_tick(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        (self.value_events + self.threshold_events) as f64 / self.ticks as f64
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Gas Detector Metrics ===\n\n");

        report.push_str(&format!("Ticks completed: {}\n", self.ticks));
        report.push_str(&format!("Ticks skipped: {}\n", self.skipped_ticks));
        report.push_str(&format!(
            "Sensor availability: {:.1}%\n",
            self.availability() * 100.0
        ));
        report.push_str(&format!("Value events: {}\n", self.value_events));
        report.push_str(&format!("Threshold events: {}\n", self.threshold_events));
        report.push_str(&format!(
            "Events per tick: {:.3}\n",
            self.events_per_tick()
        ));
        report.push_str(&format!("Channel failures: {}\n", self.channel_failures));
        report.push_str(&format!("Window resets: {}\n", self.window_resets));

        report
    }
}
