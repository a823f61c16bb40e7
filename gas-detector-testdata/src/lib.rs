// Gas Detector Testdata - Synthetic detector readings
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Gas Detector Testdata
//!
//! Synthetic raw-sample generator for the gas detector pipeline.
//!
//! This crate produces realistic ADC sample streams, with support for:
//!
//! - **Signal patterns**: Constant, sine, steps, heater warm-up, random walk, etc.
//! - **Fault injection**: Glitches, frozen readings, drift, dropouts, saturation
//! - **Scenario presets**: Clean air, gas leak, sensor failure, and more
//! - **Replay**: A [`DatasetSampler`] that feeds a dataset into a device
//!
//! ## Quick Start
//!
//! ```rust
//! use gas_detector_testdata::{
//!     create_detector_signal, generate_dataset, DetectorScenario, GeneratorConfig,
//! };
//!
//! let config = GeneratorConfig::new().with_num_samples(600).with_seed(42);
//! let signal = create_detector_signal(DetectorScenario::GasLeak, config.num_samples);
//! let dataset = generate_dataset(&config, &signal);
//!
//! assert_eq!(dataset.len(), 600);
//! ```
//!
//! ## Fault Injection
//!
//! ```rust
//! use gas_detector_testdata::{FaultWindow, SensorFault};
//!
//! let dropout = FaultWindow::starting_at(SensorFault::Dropout, 500).lasting(20);
//! assert_eq!(dropout.elapsed(510), Some(10));
//! assert_eq!(dropout.elapsed(520), None);
//! ```

pub mod dataset;
pub mod faults;
pub mod generator;
pub mod patterns;
pub mod sampler;
pub mod scenarios;

// Re-exports for convenience
pub use dataset::{Dataset, DatasetError, DatasetMetadata, SampleStats};
pub use faults::{fault_over, FaultState, FaultWindow, SensorFault};
pub use generator::{generate_dataset, DatasetBuilder, GeneratorConfig, SignalConfig};
pub use patterns::SignalPattern;
pub use sampler::DatasetSampler;
pub use scenarios::{create_detector_signal, DetectorScenario};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
