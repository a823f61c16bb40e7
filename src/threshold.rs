// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Debounced threshold evaluation
//!
//! Decides whether a conditioned value must raise a threshold event. The
//! debounce counter enforces a minimum spacing between evaluations, whatever
//! their outcome, so a value oscillating around a bound cannot flood the
//! event channel.

use std::fmt;

/// Threshold option, as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ThresholdOption {
    /// Threshold callbacks disabled
    #[default]
    Off = b'x',
    /// Fire while `min <= value <= max`
    Inside = b'i',
    /// Fire while `value < min` or `value > max`
    Outside = b'o',
    /// Fire while `value > min`
    Greater = b'>',
    /// Fire while `value < max`
    Smaller = b'<',
}

impl ThresholdOption {
    /// Decode a wire character; unknown characters map to `Off`
    pub fn from_u8(value: u8) -> Self {
        match value {
            b'i' => ThresholdOption::Inside,
            b'o' => ThresholdOption::Outside,
            b'>' => ThresholdOption::Greater,
            b'<' => ThresholdOption::Smaller,
            _ => ThresholdOption::Off,
        }
    }

    /// Wire character for this option
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Check whether `value` satisfies this option for the given bounds
    pub fn matches(&self, value: i32, min: i32, max: i32) -> bool {
        match self {
            ThresholdOption::Off => false,
            ThresholdOption::Inside => min <= value && value <= max,
            ThresholdOption::Outside => value < min || value > max,
            ThresholdOption::Greater => value > min,
            ThresholdOption::Smaller => value < max,
        }
    }
}

impl From<char> for ThresholdOption {
    fn from(c: char) -> Self {
        u8::try_from(c).map_or(ThresholdOption::Off, Self::from_u8)
    }
}

impl fmt::Display for ThresholdOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8() as char)
    }
}

/// Threshold option and bounds, replaced as a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Threshold {
    /// Comparison applied to each evaluated value
    pub option: ThresholdOption,
    /// Lower bound
    pub min: i32,
    /// Upper bound
    pub max: i32,
}

impl Threshold {
    /// Create a new threshold
    pub fn new(option: ThresholdOption, min: i32, max: i32) -> Self {
        Self { option, min, max }
    }

    /// Threshold that never fires
    pub fn off() -> Self {
        Self::default()
    }

    /// Check whether `value` satisfies the threshold
    pub fn matches(&self, value: i32) -> bool {
        self.option.matches(value, self.min, self.max)
    }
}

/// Threshold evaluator with debounce
#[derive(Debug, Clone, Default)]
pub struct ThresholdEvaluator {
    threshold: Threshold,
    debounce_ticks: u32,
    ticks_since_last_evaluation: u32,
}

impl ThresholdEvaluator {
    /// Create an evaluator
    pub fn new(threshold: Threshold, debounce_ticks: u32) -> Self {
        Self {
            threshold,
            debounce_ticks,
            ticks_since_last_evaluation: 0,
        }
    }

    /// Evaluate one conditioned value
    ///
    /// Returns the value when a threshold event must fire. While the debounce
    /// interval has not elapsed the counter advances and nothing fires; once it
    /// has, the counter restarts and the option is applied.
    pub fn evaluate(&mut self, value: i32) -> Option<i32> {
        if self.ticks_since_last_evaluation < self.debounce_ticks {
            self.ticks_since_last_evaluation += 1;
            return None;
        }

        self.ticks_since_last_evaluation = 0;
        self.threshold.matches(value).then_some(value)
    }

    /// Current threshold
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Replace option and bounds
    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }

    /// Current debounce period in ticks
    pub fn debounce_ticks(&self) -> u32 {
        self.debounce_ticks
    }

    /// Replace the debounce period, keeping the running counter
    pub fn set_debounce_ticks(&mut self, ticks: u32) {
        self.debounce_ticks = ticks;
    }

    /// Ticks counted since the last evaluation
    pub fn ticks_since_last_evaluation(&self) -> u32 {
        self.ticks_since_last_evaluation
    }
}
