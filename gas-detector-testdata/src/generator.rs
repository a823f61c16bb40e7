// Gas Detector Testdata - Core generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Core dataset generation logic.
//!
//! A signal pattern is evaluated per tick, gaussian noise is added, sensor
//! faults are injected, and the result is quantized to the converter range.

use crate::faults::{FaultState, FaultWindow};
use crate::dataset::{Dataset, DatasetMetadata};
use crate::patterns::{gaussian, PatternState, SignalPattern};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Default converter resolution.
pub const DEFAULT_ADC_BITS: u8 = 12;

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of samples to generate.
    pub num_samples: usize,
    /// Interval between ticks in milliseconds, recorded in metadata.
    pub tick_interval_ms: u64,
    /// Converter resolution in bits (1..=16).
    pub adc_bits: u8,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_samples: 1000,
            tick_interval_ms: 1,
            adc_bits: DEFAULT_ADC_BITS,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of samples.
    pub fn with_num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    /// Set tick interval.
    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    /// Set duration in seconds (calculates num_samples from interval).
    pub fn with_duration_secs(mut self, secs: f64) -> Self {
        let interval = self.tick_interval_ms.max(1) as f64;
        self.num_samples = (secs * 1000.0 / interval).ceil() as usize;
        self
    }

    /// Set converter resolution.
    pub fn with_adc_bits(mut self, bits: u8) -> Self {
        self.adc_bits = bits;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Largest converter reading.
    pub fn adc_max(&self) -> u16 {
        match self.adc_bits.clamp(1, 16) {
            16 => u16::MAX,
            bits => (1u16 << bits) - 1,
        }
    }
}

/// Signal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Signal pattern in ADC counts.
    pub pattern: SignalPattern,
    /// Standard deviation of added noise in ADC counts.
    pub noise_std: f64,
    /// Sensor faults, injected in order.
    #[serde(default)]
    pub faults: Vec<FaultWindow>,
}

impl SignalConfig {
    /// Create a new signal config.
    pub fn new(pattern: SignalPattern) -> Self {
        Self {
            pattern,
            noise_std: 0.0,
            faults: Vec::new(),
        }
    }

    /// Add noise to the signal.
    pub fn with_noise(mut self, std: f64) -> Self {
        self.noise_std = std;
        self
    }

    /// Add a sensor fault.
    pub fn with_fault(mut self, fault: FaultWindow) -> Self {
        self.faults.push(fault);
        self
    }
}

/// Generate a dataset from configuration.
pub fn generate_dataset(config: &GeneratorConfig, signal: &SignalConfig) -> Dataset {
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let adc_max = f64::from(config.adc_max());
    let mut pattern_state = PatternState::for_pattern(&signal.pattern);
    let mut fault_states = vec![FaultState::default(); signal.faults.len()];

    let mut dataset = Dataset::new().with_metadata(DatasetMetadata {
        name: None,
        description: None,
        seed: config.seed,
        tick_interval_ms: Some(config.tick_interval_ms),
        adc_bits: Some(config.adc_bits),
    });

    for i in 0..config.num_samples {
        let mut value = pattern_state.evaluate(&signal.pattern, i as u64, &mut rng);
        value += gaussian(signal.noise_std, &mut rng);

        let mut sample = Some(value);
        for (window, state) in signal.faults.iter().zip(fault_states.iter_mut()) {
            if let Some(elapsed) = window.elapsed(i) {
                sample = sample.and_then(|v| state.inject(&window.fault, v, elapsed, &mut rng));
            }
        }

        dataset.push(sample.map(|v| quantize(v, adc_max)));
    }

    dataset
}

/// Round to the nearest count and clamp to the converter range.
fn quantize(value: f64, adc_max: f64) -> u16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, adc_max) as u16
}

/// Builder for creating named datasets.
pub struct DatasetBuilder {
    config: GeneratorConfig,
    signal: SignalConfig,
    name: Option<String>,
    description: Option<String>,
}

impl DatasetBuilder {
    /// Create a new dataset builder.
    pub fn new(signal: SignalConfig) -> Self {
        Self {
            config: GeneratorConfig::default(),
            signal,
            name: None,
            description: None,
        }
    }

    /// Set generator configuration.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set dataset name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Build the dataset.
    pub fn build(self) -> Dataset {
        let mut dataset = generate_dataset(&self.config, &self.signal);
        dataset.metadata.name = self.name;
        dataset.metadata.description = self.description;
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::SensorFault;

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert_eq!(config.num_samples, 1000);
        assert_eq!(config.adc_max(), 4095);
    }

    #[test]
    fn test_adc_max() {
        assert_eq!(GeneratorConfig::new().with_adc_bits(10).adc_max(), 1023);
        assert_eq!(GeneratorConfig::new().with_adc_bits(16).adc_max(), u16::MAX);
        assert_eq!(GeneratorConfig::new().with_adc_bits(40).adc_max(), u16::MAX);
        assert_eq!(GeneratorConfig::new().with_adc_bits(0).adc_max(), 1);
    }

    #[test]
    fn test_generator_config_duration() {
        let config = GeneratorConfig::new()
            .with_tick_interval_ms(10)
            .with_duration_secs(60.0);

        assert_eq!(config.num_samples, 6000);
    }

    #[test]
    fn test_generate_constant() {
        let config = GeneratorConfig::new().with_num_samples(10).with_seed(42);
        let signal = SignalConfig::new(SignalPattern::Constant { value: 1234.4 });

        let dataset = generate_dataset(&config, &signal);

        assert_eq!(dataset.len(), 10);
        assert!(dataset.samples().iter().all(|s| *s == Some(1234)));
        assert_eq!(dataset.metadata.seed, Some(42));
    }

    #[test]
    fn test_generate_clamps_to_adc_range() {
        let config = GeneratorConfig::new().with_num_samples(3).with_adc_bits(10);
        let constant = |value| SignalConfig::new(SignalPattern::Constant { value });
        let high = generate_dataset(&config, &constant(5000.0));
        let low = generate_dataset(&config, &constant(-20.0));

        assert!(high.present().all(|s| s == 1023));
        assert!(low.present().all(|s| s == 0));
    }

    #[test]
    fn test_generate_with_noise() {
        let config = GeneratorConfig::new().with_num_samples(500).with_seed(42);
        let signal =
            SignalConfig::new(SignalPattern::Constant { value: 2000.0 }).with_noise(20.0);

        let stats = generate_dataset(&config, &signal).stats().unwrap();

        assert!((stats.mean - 2000.0).abs() < 5.0);
        assert!(stats.std_dev > 10.0);
    }

    #[test]
    fn test_generate_with_dropout() {
        let config = GeneratorConfig::new().with_num_samples(100).with_seed(1);
        let signal = SignalConfig::new(SignalPattern::Constant { value: 500.0 })
            .with_fault(FaultWindow::starting_at(SensorFault::Dropout, 40).lasting(10));

        let dataset = generate_dataset(&config, &signal);

        assert_eq!(dataset.missing(), 10);
        assert_eq!(dataset.samples()[39], Some(500));
        assert_eq!(dataset.samples()[40], None);
        assert_eq!(dataset.samples()[50], Some(500));
    }

    #[test]
    fn test_generate_with_frozen_reading() {
        let config = GeneratorConfig::new().with_num_samples(100).with_seed(42);
        let signal = SignalConfig::new(SignalPattern::Linear {
            start: 100.0,
            slope_per_sample: 2.0,
        })
        .with_fault(FaultWindow::starting_at(SensorFault::Frozen, 50).lasting(30));

        let samples = generate_dataset(&config, &signal).samples;

        assert!(samples[49] > samples[0]);
        assert_eq!(samples[50], samples[60]);
        assert_eq!(samples[50], Some(200));
        assert_eq!(samples[80], Some(260));
    }

    #[test]
    fn test_dataset_builder() {
        let signal = SignalConfig::new(SignalPattern::Constant { value: 1.0 });
        let dataset = DatasetBuilder::new(signal)
            .with_config(GeneratorConfig::new().with_num_samples(10).with_seed(42))
            .with_name("flat")
            .with_description("flat line")
            .build();

        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.metadata.name, Some("flat".to_string()));
        assert_eq!(dataset.metadata.adc_bits, Some(12));
    }

    #[test]
    fn test_reproducibility() {
        let config = GeneratorConfig::new().with_num_samples(50).with_seed(12345);
        let signal = SignalConfig::new(SignalPattern::RandomWalk {
            start: 2000.0,
            step_std: 10.0,
        })
        .with_noise(5.0);

        assert_eq!(
            generate_dataset(&config, &signal),
            generate_dataset(&config, &signal)
        );
    }
}
