//! Configuration types for the gas detector

use crate::filter::{MovingAverage, MAX_MOVING_AVERAGE};
use crate::threshold::{Threshold, ThresholdOption};

/// Default debounce period in ticks
pub const DEFAULT_DEBOUNCE_TICKS: u32 = 100;

/// Device start-up configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Moving-average window length, clamped to 1..=100 (default: 100)
    pub moving_average: u8,

    /// Value callback period in ticks, 0 = on change (default: 0)
    pub callback_period: u32,

    /// Minimum ticks between threshold evaluations (default: 100)
    pub debounce_period: u32,

    /// Threshold callback configuration (default: off)
    pub threshold: Threshold,

    /// Detector type written to the peripheral at start-up; `None` keeps
    /// the stored one (default: None)
    pub detector_type: Option<u8>,

    /// Heater state applied at start-up (default: on)
    pub heater: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            moving_average: MAX_MOVING_AVERAGE,
            callback_period: 0,
            debounce_period: DEFAULT_DEBOUNCE_TICKS,
            threshold: Threshold::off(),
            detector_type: None,
            heater: true,
        }
    }
}

impl DeviceConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that passes raw samples straight through and reports every tick
    pub fn pass_through() -> Self {
        Self {
            moving_average: 1,
            callback_period: 1,
            debounce_period: 0,
            ..Default::default()
        }
    }

    /// Set the moving-average window length
    pub fn with_moving_average(mut self, length: u8) -> Self {
        self.moving_average = length;
        self
    }

    /// Set the value callback period
    pub fn with_callback_period(mut self, ticks: u32) -> Self {
        self.callback_period = ticks;
        self
    }

    /// Set the debounce period
    pub fn with_debounce_period(mut self, ticks: u32) -> Self {
        self.debounce_period = ticks;
        self
    }

    /// Set the threshold callback
    pub fn with_threshold(mut self, option: ThresholdOption, min: i32, max: i32) -> Self {
        self.threshold = Threshold::new(option, min, max);
        self
    }

    /// Write a detector type at start-up
    pub fn with_detector_type(mut self, detector_type: u8) -> Self {
        self.detector_type = Some(detector_type);
        self
    }

    /// Set the heater state applied at start-up
    pub fn with_heater(mut self, on: bool) -> Self {
        self.heater = on;
        self
    }

    /// Window length actually used after clamping
    pub fn effective_moving_average(&self) -> u8 {
        MovingAverage::clamp_length(self.moving_average)
    }
}
