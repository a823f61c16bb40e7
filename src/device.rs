// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Device context and measurement cycle
//!
//! [`Device`] owns the complete state of the single measurement channel:
//! the moving-average filter, the threshold evaluator, the periodic reporter,
//! and the three external collaborators (sampler, event channel, peripheral).
//! Every mutation goes through [`Device::tick`] or one of the setters.
//!
//! # Example
//!
//! ```rust
//! use gas_detector::{Device, DeviceConfig, Event, MemoryChannel, MemoryPeripheral, ScriptedSampler};
//!
//! let sampler = ScriptedSampler::from_samples([100, 100, 104]);
//! let mut device = Device::new(
//!     DeviceConfig::pass_through(),
//!     sampler,
//!     MemoryChannel::new(),
//!     MemoryPeripheral::new(),
//! )
//! .unwrap();
//!
//! device.tick();
//! device.tick();
//! assert_eq!(device.value(), 104);
//! assert_eq!(
//!     device.channel_mut().drain(),
//!     vec![Event::Value(100), Event::Value(104)]
//! );
//! ```

use log::{debug, trace, warn};

use crate::channel::EventChannel;
use crate::config::DeviceConfig;
use crate::error::{Result, SampleError};
use crate::filter::MovingAverage;
use crate::metrics::DeviceMetrics;
use crate::periodic::PeriodicReporter;
use crate::peripheral::Peripheral;
use crate::protocol::Event;
use crate::sampler::Sampler;
use crate::threshold::{Threshold, ThresholdEvaluator};

/// Result of one scheduler tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A sample was conditioned; `events` lists what was handed to the
    /// channel, value event first
    Measured { value: i32, events: Vec<Event> },
    /// No sample could be acquired; nothing was updated
    Skipped(SampleError),
}

impl TickOutcome {
    /// Conditioned value of a measured tick
    pub fn value(&self) -> Option<i32> {
        match self {
            TickOutcome::Measured { value, .. } => Some(*value),
            TickOutcome::Skipped(_) => None,
        }
    }

    /// Events decided during the tick
    pub fn events(&self) -> &[Event] {
        match self {
            TickOutcome::Measured { events, .. } => events,
            TickOutcome::Skipped(_) => &[],
        }
    }

    /// Check if the tick was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped(_))
    }
}

/// Single-channel gas detector
pub struct Device<S, C, P> {
    sampler: S,
    channel: C,
    peripheral: P,
    filter: MovingAverage,
    threshold: ThresholdEvaluator,
    reporter: PeriodicReporter,
    /// Last conditioned value
    value: i32,
    metrics: DeviceMetrics,
}

impl<S, C, P> Device<S, C, P>
where
    S: Sampler,
    C: EventChannel,
    P: Peripheral,
{
    /// Bring up the device
    ///
    /// The filter window is filled with the first raw sample, so the first
    /// conditioned value equals that sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial raw sample cannot be acquired.
    pub fn new(config: DeviceConfig, mut sampler: S, channel: C, mut peripheral: P) -> Result<Self> {
        let initial = sampler.sample()?;
        let filter = MovingAverage::new(config.moving_average, initial);

        if let Some(detector_type) = config.detector_type {
            peripheral.set_detector_type(detector_type);
        }
        peripheral.set_heater(config.heater);

        debug!(
            "device up: initial sample {}, window {}, period {}, debounce {}, threshold {:?}",
            initial,
            filter.length(),
            config.callback_period,
            config.debounce_period,
            config.threshold
        );

        Ok(Self {
            sampler,
            channel,
            peripheral,
            value: filter.value(),
            filter,
            threshold: ThresholdEvaluator::new(config.threshold, config.debounce_period),
            reporter: PeriodicReporter::new(config.callback_period),
            metrics: DeviceMetrics::new(),
        })
    }

    /// Run one measurement cycle
    ///
    /// Acquires a raw sample, conditions it, evaluates both reporting
    /// policies and publishes the resulting events. When the sampler fails
    /// the whole cycle is skipped and retried on the next tick.
    pub fn tick(&mut self) -> TickOutcome {
        let raw = match self.sampler.sample() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping tick: {}", e);
                self.metrics.record_skipped_tick();
                return TickOutcome::Skipped(e);
            }
        };

        let value = self.filter.update(raw);
        self.value = value;
        self.metrics.record_tick();
        trace!("raw {} -> conditioned {}", raw, value);

        let threshold_hit = self.threshold.evaluate(value);
        let periodic_hit = self.reporter.evaluate(value);

        let mut events = Vec::with_capacity(2);
        if let Some(v) = periodic_hit {
            events.push(Event::Value(v));
        }
        if let Some(v) = threshold_hit {
            events.push(Event::ValueReached(v));
        }

        for event in &events {
            self.publish(*event);
        }

        TickOutcome::Measured { value, events }
    }

    fn publish(&mut self, event: Event) {
        match self.channel.publish(event) {
            Ok(()) => match event {
                Event::Value(_) => self.metrics.record_value_event(),
                Event::ValueReached(_) => self.metrics.record_threshold_event(),
            },
            Err(e) => {
                warn!("dropping {}: {}", event, e);
                self.metrics.record_channel_failure();
            }
        }
    }

    /// Current conditioned value
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Moving-average window length
    pub fn moving_average(&self) -> u8 {
        self.filter.length()
    }

    /// Resize the moving-average window
    ///
    /// The length is clamped to `1..=100`. If the clamped length differs
    /// from the current one the filter history is discarded and the window
    /// refilled with a freshly acquired raw sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the refill sample cannot be acquired; the filter
    /// is left untouched in that case.
    pub fn set_moving_average(&mut self, length: u8) -> Result<()> {
        if !self.filter.needs_resize(length) {
            return Ok(());
        }

        let raw = self.sampler.sample().map_err(|e| {
            warn!("window resize to {} aborted: {}", length, e);
            e
        })?;
        self.filter.reinitialize(length, raw);
        self.value = self.filter.value();
        self.metrics.record_window_reset();

        debug!(
            "moving average window set to {} (refilled with {})",
            self.filter.length(),
            raw
        );
        Ok(())
    }

    /// Value callback period in ticks (0 = on change)
    pub fn callback_period(&self) -> u32 {
        self.reporter.period_ticks()
    }

    /// Set the value callback period
    pub fn set_callback_period(&mut self, ticks: u32) {
        debug!("value callback period set to {}", ticks);
        self.reporter.set_period_ticks(ticks);
    }

    /// Threshold callback configuration
    pub fn threshold(&self) -> Threshold {
        self.threshold.threshold()
    }

    /// Replace the threshold callback configuration
    pub fn set_threshold(&mut self, threshold: Threshold) {
        debug!(
            "threshold set to '{}' [{}, {}]",
            threshold.option, threshold.min, threshold.max
        );
        self.threshold.set_threshold(threshold);
    }

    /// Debounce period in ticks
    pub fn debounce_period(&self) -> u32 {
        self.threshold.debounce_ticks()
    }

    /// Set the debounce period
    pub fn set_debounce_period(&mut self, ticks: u32) {
        debug!("debounce period set to {}", ticks);
        self.threshold.set_debounce_ticks(ticks);
    }

    /// Detector type reported by the peripheral
    pub fn detector_type(&self) -> u8 {
        self.peripheral.detector_type()
    }

    /// Select the detector type
    pub fn set_detector_type(&mut self, detector_type: u8) {
        self.peripheral.set_detector_type(detector_type);
    }

    /// Check if the heater is on
    pub fn is_heater_on(&self) -> bool {
        self.peripheral.is_heater_on()
    }

    /// Switch the heater
    pub fn set_heater(&mut self, on: bool) {
        self.peripheral.set_heater(on);
    }

    /// Loop counters
    pub fn metrics(&self) -> &DeviceMetrics {
        &self.metrics
    }

    /// Filter state
    pub fn filter(&self) -> &MovingAverage {
        &self.filter
    }

    /// Event channel
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutable access to the event channel (e.g. to drain it)
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Mutable access to the sampler
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    /// Peripheral
    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Tear the device down into its collaborators
    pub fn into_parts(self) -> (S, C, P) {
        (self.sampler, self.channel, self.peripheral)
    }
}

impl<S, C, P> std::fmt::Debug for Device<S, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("value", &self.value)
            .field("moving_average", &self.filter.length())
            .field("callback_period", &self.reporter.period_ticks())
            .field("threshold", &self.threshold.threshold())
            .field("debounce_period", &self.threshold.debounce_ticks())
            .field("metrics", &self.metrics)
            .finish()
    }
}
