// Gas Detector Exporter - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for detector monitoring.
//!
//! This module defines all Prometheus metrics exposed by the exporter
//! and provides functions to update them from device state.

use gas_detector::{
    Device, DeviceMetrics, Event, EventChannel, Peripheral, Sampler, TickOutcome,
};
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Encoder, Gauge,
    IntCounter, TextEncoder,
};

lazy_static! {
    // ============================================================
    // Measurement
    // ============================================================

    /// Conditioned (moving-average) value.
    pub static ref VALUE: Gauge = register_gauge!(
        "gas_detector_value",
        "Conditioned detector value in ADC counts"
    ).expect("register gas_detector_value");

    /// Events published, labeled by kind.
    pub static ref EVENTS_TOTAL: CounterVec = register_counter_vec!(
        "gas_detector_events_total",
        "Callback events published by the device",
        &["event"]
    ).expect("register gas_detector_events_total");

    /// Value carried by the last threshold event.
    pub static ref LAST_THRESHOLD_VALUE: Gauge = register_gauge!(
        "gas_detector_last_threshold_value",
        "Value carried by the most recent threshold event"
    ).expect("register gas_detector_last_threshold_value");

    /// Completed measurement cycles.
    pub static ref TICKS_TOTAL: IntCounter = register_int_counter!(
        "gas_detector_ticks_total",
        "Measurement cycles completed"
    ).expect("register gas_detector_ticks_total");

    /// Cycles skipped because no sample was available.
    pub static ref SKIPPED_TICKS_TOTAL: IntCounter = register_int_counter!(
        "gas_detector_skipped_ticks_total",
        "Measurement cycles skipped for lack of a raw sample"
    ).expect("register gas_detector_skipped_ticks_total");

    /// Fraction of ticks that produced a measurement.
    pub static ref AVAILABILITY: Gauge = register_gauge!(
        "gas_detector_sensor_availability",
        "Fraction of ticks with a raw sample (0-1)"
    ).expect("register gas_detector_sensor_availability");

    /// Events the channel refused.
    pub static ref CHANNEL_FAILURES: Gauge = register_gauge!(
        "gas_detector_channel_failures",
        "Events refused by the event channel"
    ).expect("register gas_detector_channel_failures");

    // ============================================================
    // Configuration
    // ============================================================

    /// Moving-average window length.
    pub static ref MOVING_AVERAGE: Gauge = register_gauge!(
        "gas_detector_moving_average_length",
        "Moving-average window length in samples"
    ).expect("register gas_detector_moving_average_length");

    /// Value callback period.
    pub static ref CALLBACK_PERIOD: Gauge = register_gauge!(
        "gas_detector_callback_period_ticks",
        "Value callback period in ticks (0 = on change)"
    ).expect("register gas_detector_callback_period_ticks");

    /// Debounce period.
    pub static ref DEBOUNCE_PERIOD: Gauge = register_gauge!(
        "gas_detector_debounce_period_ticks",
        "Minimum ticks between threshold evaluations"
    ).expect("register gas_detector_debounce_period_ticks");

    /// Heater state.
    pub static ref HEATER_ON: Gauge = register_gauge!(
        "gas_detector_heater_on",
        "Heater state (1=on, 0=off)"
    ).expect("register gas_detector_heater_on");

    /// Detector type.
    pub static ref DETECTOR_TYPE: Gauge = register_gauge!(
        "gas_detector_detector_type",
        "Selected detector type"
    ).expect("register gas_detector_detector_type");

    // ============================================================
    // Exporter Metrics
    // ============================================================

    /// Current replay position (sample index).
    pub static ref REPLAY_POSITION: Gauge = register_gauge!(
        "gas_detector_exporter_replay_position",
        "Current replay position (sample index)"
    ).expect("register gas_detector_exporter_replay_position");

    /// Total samples in the replay dataset.
    pub static ref REPLAY_TOTAL_SAMPLES: Gauge = register_gauge!(
        "gas_detector_exporter_replay_total_samples",
        "Total samples in the replay dataset"
    ).expect("register gas_detector_exporter_replay_total_samples");

    /// Replay speed multiplier.
    pub static ref REPLAY_SPEED: Gauge = register_gauge!(
        "gas_detector_exporter_replay_speed",
        "Replay speed multiplier"
    ).expect("register gas_detector_exporter_replay_speed");
}

/// Label for an event kind.
pub fn event_label(event: &Event) -> &'static str {
    match event {
        Event::Value(_) => "value",
        Event::ValueReached(_) => "value_reached",
    }
}

/// Record a published event.
pub fn record_event(event: &Event) {
    EVENTS_TOTAL.with_label_values(&[event_label(event)]).inc();
    if let Event::ValueReached(value) = event {
        LAST_THRESHOLD_VALUE.set(f64::from(*value));
    }
}

/// Record the outcome of one tick.
pub fn record_tick(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Measured { value, .. } => {
            TICKS_TOTAL.inc();
            VALUE.set(f64::from(*value));
        }
        TickOutcome::Skipped(_) => SKIPPED_TICKS_TOTAL.inc(),
    }
}

/// Update gauges derived from the device counters.
pub fn update_device_metrics(metrics: &DeviceMetrics) {
    AVAILABILITY.set(metrics.availability());
    CHANNEL_FAILURES.set(metrics.channel_failures as f64);
}

/// Update configuration gauges from the device.
pub fn update_config_metrics<S, C, P>(device: &Device<S, C, P>)
where
    S: Sampler,
    C: EventChannel,
    P: Peripheral,
{
    VALUE.set(f64::from(device.value()));
    MOVING_AVERAGE.set(f64::from(device.moving_average()));
    CALLBACK_PERIOD.set(f64::from(device.callback_period()));
    DEBOUNCE_PERIOD.set(f64::from(device.debounce_period()));
    HEATER_ON.set(if device.is_heater_on() { 1.0 } else { 0.0 });
    DETECTOR_TYPE.set(f64::from(device.detector_type()));
}

/// Update replay position metrics.
pub fn update_replay_metrics(position: usize, total: usize, speed: f64) {
    REPLAY_POSITION.set(position as f64);
    REPLAY_TOTAL_SAMPLES.set(total as f64);
    REPLAY_SPEED.set(speed);
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
