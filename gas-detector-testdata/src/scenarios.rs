// Gas Detector Testdata - Detector scenarios
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Preset signal configurations for typical detector situations.
//!
//! Levels are 12-bit ADC counts. Clean air sits around 800 counts; a gas
//! plume drives the reading toward 3000.

use crate::faults::{fault_over, FaultWindow, SensorFault};
use crate::generator::SignalConfig;
use crate::patterns::SignalPattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clean-air baseline reading.
pub const CLEAN_AIR_BASELINE: f64 = 800.0;

/// Reading at the peak of a gas plume.
pub const PLUME_PEAK: f64 = 3000.0;

/// Baseline noise of the sensing element.
const BASELINE_NOISE_STD: f64 = 8.0;

/// Detector scenario types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorScenario {
    /// Steady clean air.
    CleanAir,
    /// Heater switched on at start; reading settles to the baseline.
    HeaterWarmup,
    /// Gas plume over the middle third of the run.
    GasLeak,
    /// Sensor stops delivering samples for a while.
    SensorFailure,
    /// Slow drift of the sensing element.
    SlowDrift,
    /// Converter pinned at full scale.
    Saturation,
}

impl DetectorScenario {
    /// All scenarios.
    pub const ALL: [DetectorScenario; 6] = [
        DetectorScenario::CleanAir,
        DetectorScenario::HeaterWarmup,
        DetectorScenario::GasLeak,
        DetectorScenario::SensorFailure,
        DetectorScenario::SlowDrift,
        DetectorScenario::Saturation,
    ];

    /// Kebab-case name.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorScenario::CleanAir => "clean-air",
            DetectorScenario::HeaterWarmup => "heater-warmup",
            DetectorScenario::GasLeak => "gas-leak",
            DetectorScenario::SensorFailure => "sensor-failure",
            DetectorScenario::SlowDrift => "slow-drift",
            DetectorScenario::Saturation => "saturation",
        }
    }
}

impl fmt::Display for DetectorScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DetectorScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetectorScenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| format!("unknown scenario '{}'", s))
    }
}

/// Create the signal configuration for a scenario spanning `num_samples` ticks.
pub fn create_detector_signal(scenario: DetectorScenario, num_samples: usize) -> SignalConfig {
    let n = num_samples as u64;
    let baseline = SignalPattern::Constant {
        value: CLEAN_AIR_BASELINE,
    };

    let signal = match scenario {
        DetectorScenario::CleanAir => SignalConfig::new(baseline),

        DetectorScenario::HeaterWarmup => SignalConfig::new(SignalPattern::heater_warmup(
            0.0,
            CLEAN_AIR_BASELINE,
            (num_samples as f64 / 8.0).max(1.0),
        )),

        DetectorScenario::GasLeak => SignalConfig::new(SignalPattern::gas_plume(
            CLEAN_AIR_BASELINE,
            PLUME_PEAK,
            n / 3,
            2 * n / 3,
        )),

        DetectorScenario::SensorFailure => SignalConfig::new(baseline).with_fault(fault_over(
            num_samples,
            0.4,
            Some(0.1),
            SensorFault::Dropout,
        )),

        DetectorScenario::SlowDrift => SignalConfig::new(baseline).with_fault(fault_over(
            num_samples,
            0.25,
            None,
            SensorFault::Drift {
                counts_per_tick: 1000.0 / num_samples.max(1) as f64,
            },
        )),

        DetectorScenario::Saturation => SignalConfig::new(baseline).with_fault(
            FaultWindow::starting_at(SensorFault::Saturated { level: 4095.0 }, num_samples / 2)
                .lasting(num_samples / 10),
        ),
    };

    signal.with_noise(BASELINE_NOISE_STD)
}
