//! # Gas Detector - Measurement pipeline
//!
//! Firmware-side logic of a gas detector module: raw sensor samples are
//! smoothed by a moving average, reported to a host either periodically or on
//! change, and compared against a configurable threshold with debouncing.
//!
//! ## Key Features
//!
//! - **Moving average**: Integer window of up to 100 samples, rounded to nearest
//! - **Value callback**: Periodic or on-change reporting of the conditioned value
//! - **Threshold callback**: Five options (off, inside, outside, greater, smaller)
//! - **Debounce**: Minimum spacing between threshold evaluations
//! - **Request dispatch**: Function-id based getters and setters with error codes
//!
//! ## Quick Start
//!
//! ```rust
//! use gas_detector::{
//!     Device, DeviceConfig, Event, MemoryChannel, MemoryPeripheral, ScriptedSampler,
//!     ThresholdOption,
//! };
//!
//! let config = DeviceConfig::new()
//!     .with_moving_average(1)
//!     .with_debounce_period(0)
//!     .with_threshold(ThresholdOption::Greater, 1000, 0);
//!
//! let sampler = ScriptedSampler::from_samples([900, 1200]);
//! let mut device =
//!     Device::new(config, sampler, MemoryChannel::new(), MemoryPeripheral::new()).unwrap();
//!
//! let outcome = device.tick();
//! assert_eq!(outcome.value(), Some(1200));
//! assert_eq!(
//!     device.channel_mut().drain(),
//!     vec![Event::Value(1200), Event::ValueReached(1200)]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: Moving-average filter
//! - [`threshold`]: Threshold options and debounced evaluation
//! - [`periodic`]: Periodic and on-change value reporting
//! - [`device`]: Device context and measurement cycle
//! - [`dispatch`]: Request handling
//! - [`protocol`]: Function ids, error codes, payload layout
//! - [`channel`]: Event channel abstraction
//! - [`sampler`]: Raw sample sources
//! - [`peripheral`]: Heater and detector type
//! - [`metrics`]: Device counters

// Modules
pub mod channel;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod periodic;
pub mod peripheral;
pub mod protocol;
pub mod sampler;
pub mod threshold;

// Re-exports for convenient access
pub use channel::{ChannelMetrics, EventChannel, MemoryChannel};
pub use config::{DeviceConfig, DEFAULT_DEBOUNCE_TICKS};
pub use device::{Device, TickOutcome};
pub use error::{ChannelError, DeviceError, ProtocolError, Result, SampleError};
pub use filter::{MovingAverage, RawSample, MAX_MOVING_AVERAGE};
pub use metrics::DeviceMetrics;
pub use periodic::PeriodicReporter;
pub use peripheral::{MemoryPeripheral, Peripheral};
pub use protocol::{ErrorCode, Event, FunctionId, Reply, Request, Response};
pub use sampler::{Sampler, ScriptedSampler};
pub use threshold::{Threshold, ThresholdEvaluator, ThresholdOption};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Device identifier reported to hosts
pub const DEVICE_IDENTIFIER: u16 = 252;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_cycle() {
        let sampler = ScriptedSampler::from_samples([500, 500, 700]);
        let mut device = Device::new(
            DeviceConfig::new().with_moving_average(2),
            sampler,
            MemoryChannel::new(),
            MemoryPeripheral::new(),
        )
        .unwrap();

        device.tick();
        device.tick();

        assert_eq!(device.value(), 600);
        assert_eq!(device.metrics().ticks, 2);
    }
}
