// Gas Detector Testdata - Sensor fault injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sensing-element and converter faults.
//!
//! A fault is active over a [`FaultWindow`] of ticks. Faults that drop the
//! reading produce missing samples, which a replaying sampler turns into
//! acquisition failures.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Fault affecting the raw reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFault {
    /// Offset added on the first faulty tick only.
    Glitch { offset: f64 },
    /// Reading frozen at its value on the first faulty tick.
    Frozen,
    /// Offset growing by a fixed amount every faulty tick.
    Drift { counts_per_tick: f64 },
    /// No reading.
    Dropout,
    /// Converter pinned at `level`, usually full scale.
    Saturated { level: f64 },
    /// Each reading is lost with probability `miss_probability`.
    Flaky { miss_probability: f64 },
}

impl SensorFault {
    /// Whether the fault can make samples go missing.
    pub fn drops_samples(&self) -> bool {
        matches!(self, SensorFault::Dropout | SensorFault::Flaky { .. })
    }
}

/// Fault and the ticks it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultWindow {
    pub fault: SensorFault,
    /// First faulty tick.
    pub first_tick: usize,
    /// Number of faulty ticks; `None` lasts until the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<usize>,
}

impl FaultWindow {
    /// Fault starting at `first_tick` and never clearing.
    pub fn starting_at(fault: SensorFault, first_tick: usize) -> Self {
        Self {
            fault,
            first_tick,
            ticks: None,
        }
    }

    /// Limit the fault to `ticks` ticks.
    pub fn lasting(mut self, ticks: usize) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Ticks elapsed since the fault started, or `None` outside the window.
    pub fn elapsed(&self, tick: usize) -> Option<usize> {
        let elapsed = tick.checked_sub(self.first_tick)?;
        match self.ticks {
            Some(ticks) if elapsed >= ticks => None,
            _ => Some(elapsed),
        }
    }
}

/// Place a fault relative to the length of a run.
///
/// `start` and `length` are fractions of `total_ticks`.
pub fn fault_over(
    total_ticks: usize,
    start: f64,
    length: Option<f64>,
    fault: SensorFault,
) -> FaultWindow {
    let ticks_at = |fraction: f64| (total_ticks as f64 * fraction).round() as usize;
    FaultWindow {
        fault,
        first_tick: ticks_at(start),
        ticks: length.map(ticks_at),
    }
}

/// Per-window memory of a fault (frozen reading, accumulated drift).
#[derive(Debug, Clone, Default)]
pub struct FaultState {
    frozen_at: Option<f64>,
    drift: f64,
}

impl FaultState {
    /// Distort `value`; `None` is a missing sample.
    pub fn inject(
        &mut self,
        fault: &SensorFault,
        value: f64,
        elapsed: usize,
        rng: &mut (impl Rng + ?Sized),
    ) -> Option<f64> {
        match fault {
            SensorFault::Glitch { offset } if elapsed == 0 => Some(value + offset),
            SensorFault::Glitch { .. } => Some(value),
            SensorFault::Frozen => Some(*self.frozen_at.get_or_insert(value)),
            SensorFault::Drift { counts_per_tick } => {
                self.drift += counts_per_tick;
                Some(value + self.drift)
            }
            SensorFault::Dropout => None,
            SensorFault::Saturated { level } => Some(*level),
            SensorFault::Flaky { miss_probability } => {
                (rng.gen::<f64>() >= *miss_probability).then_some(value)
            }
        }
    }
}
