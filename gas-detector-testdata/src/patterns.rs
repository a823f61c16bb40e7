// Gas Detector Testdata - Signal patterns
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Signal patterns for synthetic detector readings.
//!
//! Patterns are evaluated per sample index and produce values in ADC counts.
//! Quantization and clamping to the converter range happen in the generator.

use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Signal pattern definition.
///
/// Patterns can be combined using `Composite` to create complex behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalPattern {
    /// Constant level.
    Constant { value: f64 },

    /// Sinusoidal wave.
    ///
    /// `value = offset + amplitude * sin(2*PI*n/period_samples + phase)`
    Sine {
        amplitude: f64,
        period_samples: u64,
        phase: f64,
        offset: f64,
    },

    /// Linear trend.
    ///
    /// `value = start + slope_per_sample * n`
    Linear { start: f64, slope_per_sample: f64 },

    /// Step function with predefined level changes.
    ///
    /// Levels are (sample_index, value) pairs. The value persists
    /// until the next index.
    Step { levels: Vec<(u64, f64)> },

    /// Exponential approach toward target, e.g. heater warm-up.
    ///
    /// `value = start + (target - start) * (1 - exp(-n/tau_samples))`
    Growth {
        start: f64,
        target: f64,
        tau_samples: f64,
    },

    /// Exponential decay toward target, e.g. gas clearing.
    ///
    /// `value = target + (start - target) * exp(-n/tau_samples)`
    Decay {
        start: f64,
        target: f64,
        tau_samples: f64,
    },

    /// Sawtooth wave (linear ramp with reset).
    Sawtooth {
        min: f64,
        max: f64,
        period_samples: u64,
        ascending: bool,
    },

    /// Random walk. Stateless evaluation only adds one step of noise.
    RandomWalk { start: f64, step_std: f64 },

    /// Composite: sum of multiple patterns.
    Composite(Vec<SignalPattern>),
}

impl SignalPattern {
    /// Evaluate the pattern at a given sample index.
    ///
    /// For patterns that need state (RandomWalk), use [`PatternState::evaluate`].
    pub fn evaluate(&self, n: u64, rng: &mut (impl Rng + ?Sized)) -> f64 {
        match self {
            SignalPattern::Constant { value } => *value,

            SignalPattern::Sine {
                amplitude,
                period_samples,
                phase,
                offset,
            } => {
                if *period_samples == 0 {
                    return *offset;
                }
                let t = n as f64;
                let period = *period_samples as f64;
                offset + amplitude * (2.0 * PI * t / period + phase).sin()
            }

            SignalPattern::Linear {
                start,
                slope_per_sample,
            } => start + slope_per_sample * n as f64,

            SignalPattern::Step { levels } => {
                let mut current = levels.first().map(|(_, v)| *v).unwrap_or(0.0);
                for (at, value) in levels {
                    if n >= *at {
                        current = *value;
                    } else {
                        break;
                    }
                }
                current
            }

            SignalPattern::Growth {
                start,
                target,
                tau_samples,
            } => {
                if *tau_samples <= 0.0 {
                    return *target;
                }
                start + (target - start) * (1.0 - (-(n as f64) / tau_samples).exp())
            }

            SignalPattern::Decay {
                start,
                target,
                tau_samples,
            } => {
                if *tau_samples <= 0.0 {
                    return *target;
                }
                target + (start - target) * (-(n as f64) / tau_samples).exp()
            }

            SignalPattern::Sawtooth {
                min,
                max,
                period_samples,
                ascending,
            } => {
                if *period_samples == 0 {
                    return *min;
                }
                let fraction = (n % period_samples) as f64 / *period_samples as f64;
                if *ascending {
                    min + (max - min) * fraction
                } else {
                    max - (max - min) * fraction
                }
            }

            SignalPattern::RandomWalk { start, step_std } => start + gaussian(*step_std, rng),

            SignalPattern::Composite(patterns) => {
                patterns.iter().map(|p| p.evaluate(n, rng)).sum()
            }
        }
    }

    /// Heater warm-up from a cold reading to the clean-air baseline.
    pub fn heater_warmup(cold: f64, baseline: f64, tau_samples: f64) -> Self {
        SignalPattern::Growth {
            start: cold,
            target: baseline,
            tau_samples,
        }
    }

    /// Baseline reading with a gas plume arriving at `onset` and clearing at `clear`.
    pub fn gas_plume(baseline: f64, peak: f64, onset: u64, clear: u64) -> Self {
        SignalPattern::Step {
            levels: vec![(0, baseline), (onset, peak), (clear, baseline)],
        }
    }
}

/// Zero-mean gaussian sample, or 0.0 for a non-positive or invalid deviation.
pub(crate) fn gaussian(std_dev: f64, rng: &mut (impl Rng + ?Sized)) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    Normal::new(0.0, std_dev)
        .map(|dist| dist.sample(rng))
        .unwrap_or(0.0)
}

/// State for patterns that need history.
#[derive(Debug, Clone, Default)]
pub struct PatternState {
    /// Current value for random walk.
    pub random_walk_value: f64,
}

impl PatternState {
    /// Create state initialized for a pattern.
    pub fn for_pattern(pattern: &SignalPattern) -> Self {
        match pattern {
            SignalPattern::RandomWalk { start, .. } => Self {
                random_walk_value: *start,
            },
            _ => Self::default(),
        }
    }

    /// Evaluate pattern with state update.
    pub fn evaluate(
        &mut self,
        pattern: &SignalPattern,
        n: u64,
        rng: &mut (impl Rng + ?Sized),
    ) -> f64 {
        match pattern {
            SignalPattern::RandomWalk { step_std, .. } => {
                self.random_walk_value += gaussian(*step_std, rng);
                self.random_walk_value
            }
            _ => pattern.evaluate(n, rng),
        }
    }
}
