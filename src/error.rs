//! Error types for the gas detector
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Main error type for device operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Raw sample acquisition failed
    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    /// Event channel error
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Request decoding error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors raised by a raw sample provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// Conversion has not completed yet
    #[error("ADC conversion not ready")]
    NotReady,

    /// The provider has no more samples to deliver
    #[error("No sample available")]
    Unavailable,

    /// Hardware fault reported by the provider
    #[error("Hardware fault: {0}")]
    Hardware(String),
}

/// Errors related to the outbound event channel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// Disconnected
    #[error("Disconnected: {reason}")]
    Disconnected { reason: String },

    /// Buffer full
    #[error("Event buffer full")]
    BufferFull,
}

/// Errors while decoding a request payload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Function id not handled by this device
    #[error("Unknown function id: {0}")]
    UnknownFunction(u8),

    /// Payload shorter than the function requires
    #[error("Payload too short for function {function_id}: need {needed} bytes, got {available}")]
    PayloadTooShort {
        function_id: u8,
        needed: usize,
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeviceError::Protocol(ProtocolError::PayloadTooShort {
            function_id: 4,
            needed: 9,
            available: 3,
        });
        let msg = format!("{}", err);
        assert!(msg.contains("too short"));
        assert!(msg.contains("need 9"));
    }

    #[test]
    fn test_error_conversion() {
        let sample_err = SampleError::Hardware("ADC overrun".to_string());
        let device_err: DeviceError = sample_err.into();
        assert!(matches!(device_err, DeviceError::Sample(_)));
    }
}
