//! Protocol definitions for the gas detector
//!
//! This module defines the request/response surface of the device:
//! - Function ids and transport error codes
//! - Decoded requests and their replies
//! - Outbound events
//!
//! Framing (header, uid, sequence number) is handled by the transport; this
//! module only deals with payloads, which are packed little-endian fields.

use crate::error::ProtocolError;
use crate::threshold::{Threshold, ThresholdOption};
use std::fmt;

/// Function ids understood by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionId {
    GetValue = 1,
    SetValueCallbackPeriod = 2,
    GetValueCallbackPeriod = 3,
    SetValueCallbackThreshold = 4,
    GetValueCallbackThreshold = 5,
    SetDebouncePeriod = 6,
    GetDebouncePeriod = 7,
    SetMovingAverage = 8,
    GetMovingAverage = 9,
    SetDetectorType = 10,
    GetDetectorType = 11,
    HeaterOn = 12,
    HeaterOff = 13,
    IsHeaterOn = 14,
    /// Value callback
    Value = 15,
    /// Threshold callback
    ValueReached = 16,
}

impl FunctionId {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(FunctionId::GetValue),
            2 => Some(FunctionId::SetValueCallbackPeriod),
            3 => Some(FunctionId::GetValueCallbackPeriod),
            4 => Some(FunctionId::SetValueCallbackThreshold),
            5 => Some(FunctionId::GetValueCallbackThreshold),
            6 => Some(FunctionId::SetDebouncePeriod),
            7 => Some(FunctionId::GetDebouncePeriod),
            8 => Some(FunctionId::SetMovingAverage),
            9 => Some(FunctionId::GetMovingAverage),
            10 => Some(FunctionId::SetDetectorType),
            11 => Some(FunctionId::GetDetectorType),
            12 => Some(FunctionId::HeaterOn),
            13 => Some(FunctionId::HeaterOff),
            14 => Some(FunctionId::IsHeaterOn),
            15 => Some(FunctionId::Value),
            16 => Some(FunctionId::ValueReached),
            _ => None,
        }
    }

    /// Check if this id names an outbound callback rather than a request
    pub fn is_callback(&self) -> bool {
        matches!(self, FunctionId::Value | FunctionId::ValueReached)
    }
}

/// Error codes returned to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    Ok = 0,
    InvalidParameter = 1,
    NotSupported = 2,
    Unknown = 3,
}

impl ErrorCode {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ErrorCode::Ok),
            1 => Some(ErrorCode::InvalidParameter),
            2 => Some(ErrorCode::NotSupported),
            3 => Some(ErrorCode::Unknown),
            _ => None,
        }
    }
}

impl From<&ProtocolError> for ErrorCode {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownFunction(_) => ErrorCode::NotSupported,
            ProtocolError::PayloadTooShort { .. } => ErrorCode::InvalidParameter,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Ok => write!(f, "OK"),
            ErrorCode::InvalidParameter => write!(f, "INVALID_PARAMETER"),
            ErrorCode::NotSupported => write!(f, "NOT_SUPPORTED"),
            ErrorCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A decoded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    GetValue,
    SetValueCallbackPeriod(u32),
    GetValueCallbackPeriod,
    SetValueCallbackThreshold(Threshold),
    GetValueCallbackThreshold,
    SetDebouncePeriod(u32),
    GetDebouncePeriod,
    SetMovingAverage(u8),
    GetMovingAverage,
    SetDetectorType(u8),
    GetDetectorType,
    HeaterOn,
    HeaterOff,
    IsHeaterOn,
}

impl Request {
    /// Decode a request from its function id and payload
    ///
    /// Trailing bytes beyond the expected payload are ignored. Callback ids
    /// and unknown ids are rejected as unknown functions.
    pub fn decode(function_id: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let fid = FunctionId::from_u8(function_id)
            .filter(|fid| !fid.is_callback())
            .ok_or(ProtocolError::UnknownFunction(function_id))?;
        let mut reader = PayloadReader::new(function_id, payload);

        let request = match fid {
            FunctionId::GetValue => Request::GetValue,
            FunctionId::SetValueCallbackPeriod => {
                Request::SetValueCallbackPeriod(reader.read_u32()?)
            }
            FunctionId::GetValueCallbackPeriod => Request::GetValueCallbackPeriod,
            FunctionId::SetValueCallbackThreshold => {
                reader.require(9)?;
                let option = ThresholdOption::from_u8(reader.read_u8()?);
                let min = reader.read_i32()?;
                let max = reader.read_i32()?;
                Request::SetValueCallbackThreshold(Threshold::new(option, min, max))
            }
            FunctionId::GetValueCallbackThreshold => Request::GetValueCallbackThreshold,
            FunctionId::SetDebouncePeriod => Request::SetDebouncePeriod(reader.read_u32()?),
            FunctionId::GetDebouncePeriod => Request::GetDebouncePeriod,
            FunctionId::SetMovingAverage => Request::SetMovingAverage(reader.read_u8()?),
            FunctionId::GetMovingAverage => Request::GetMovingAverage,
            FunctionId::SetDetectorType => Request::SetDetectorType(reader.read_u8()?),
            FunctionId::GetDetectorType => Request::GetDetectorType,
            FunctionId::HeaterOn => Request::HeaterOn,
            FunctionId::HeaterOff => Request::HeaterOff,
            FunctionId::IsHeaterOn => Request::IsHeaterOn,
            FunctionId::Value | FunctionId::ValueReached => {
                return Err(ProtocolError::UnknownFunction(function_id))
            }
        };

        Ok(request)
    }

    /// Function id of this request
    pub fn function_id(&self) -> FunctionId {
        match self {
            Request::GetValue => FunctionId::GetValue,
            Request::SetValueCallbackPeriod(_) => FunctionId::SetValueCallbackPeriod,
            Request::GetValueCallbackPeriod => FunctionId::GetValueCallbackPeriod,
            Request::SetValueCallbackThreshold(_) => FunctionId::SetValueCallbackThreshold,
            Request::GetValueCallbackThreshold => FunctionId::GetValueCallbackThreshold,
            Request::SetDebouncePeriod(_) => FunctionId::SetDebouncePeriod,
            Request::GetDebouncePeriod => FunctionId::GetDebouncePeriod,
            Request::SetMovingAverage(_) => FunctionId::SetMovingAverage,
            Request::GetMovingAverage => FunctionId::GetMovingAverage,
            Request::SetDetectorType(_) => FunctionId::SetDetectorType,
            Request::GetDetectorType => FunctionId::GetDetectorType,
            Request::HeaterOn => FunctionId::HeaterOn,
            Request::HeaterOff => FunctionId::HeaterOff,
            Request::IsHeaterOn => FunctionId::IsHeaterOn,
        }
    }

    /// Encode the request payload (controller side)
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Request::SetValueCallbackPeriod(ticks) | Request::SetDebouncePeriod(ticks) => {
                ticks.to_le_bytes().to_vec()
            }
            Request::SetValueCallbackThreshold(threshold) => encode_threshold(threshold),
            Request::SetMovingAverage(value) | Request::SetDetectorType(value) => vec![*value],
            _ => Vec::new(),
        }
    }
}

/// Reply to a successfully decoded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Setter acknowledgement, empty payload
    Ack,
    Value(i32),
    CallbackPeriod(u32),
    CallbackThreshold(Threshold),
    DebouncePeriod(u32),
    MovingAverage(u8),
    DetectorType(u8),
    Heater(bool),
}

impl Response {
    /// Encode the response payload
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Response::Ack => Vec::new(),
            Response::Value(value) => value.to_le_bytes().to_vec(),
            Response::CallbackPeriod(ticks) | Response::DebouncePeriod(ticks) => {
                ticks.to_le_bytes().to_vec()
            }
            Response::CallbackThreshold(threshold) => encode_threshold(threshold),
            Response::MovingAverage(value) | Response::DetectorType(value) => vec![*value],
            Response::Heater(on) => vec![u8::from(*on)],
        }
    }
}

/// Error code plus payload, as handed back to the transport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub error_code: ErrorCode,
    pub payload: Vec<u8>,
}

impl Reply {
    /// Successful reply carrying an encoded response
    pub fn ok(response: &Response) -> Self {
        Self {
            error_code: ErrorCode::Ok,
            payload: response.encode_payload(),
        }
    }

    /// Error reply with an empty payload
    pub fn error(error_code: ErrorCode) -> Self {
        Self {
            error_code,
            payload: Vec::new(),
        }
    }

    /// Check if the reply reports success
    pub fn is_ok(&self) -> bool {
        self.error_code == ErrorCode::Ok
    }
}

/// Outbound callback event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Periodic or on-change value report
    Value(i32),
    /// Threshold condition met
    ValueReached(i32),
}

impl Event {
    /// Function id used for this callback
    pub fn function_id(&self) -> FunctionId {
        match self {
            Event::Value(_) => FunctionId::Value,
            Event::ValueReached(_) => FunctionId::ValueReached,
        }
    }

    /// Value carried by the event
    pub fn value(&self) -> i32 {
        match self {
            Event::Value(value) | Event::ValueReached(value) => *value,
        }
    }

    /// Encode the event payload
    pub fn encode_payload(&self) -> [u8; 4] {
        self.value().to_le_bytes()
    }

    /// Decode an event from its function id and payload
    pub fn decode(function_id: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = PayloadReader::new(function_id, payload);
        match FunctionId::from_u8(function_id) {
            Some(FunctionId::Value) => Ok(Event::Value(reader.read_i32()?)),
            Some(FunctionId::ValueReached) => Ok(Event::ValueReached(reader.read_i32()?)),
            _ => Err(ProtocolError::UnknownFunction(function_id)),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Value(value) => write!(f, "VALUE({})", value),
            Event::ValueReached(value) => write!(f, "VALUE_REACHED({})", value),
        }
    }
}

fn encode_threshold(threshold: &Threshold) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(9);
    bytes.push(threshold.option.as_u8());
    bytes.extend_from_slice(&threshold.min.to_le_bytes());
    bytes.extend_from_slice(&threshold.max.to_le_bytes());
    bytes
}

/// Cursor over a little-endian payload
struct PayloadReader<'a> {
    function_id: u8,
    payload: &'a [u8],
    offset: usize,
}

impl<'a> PayloadReader<'a> {
    fn new(function_id: u8, payload: &'a [u8]) -> Self {
        Self {
            function_id,
            payload,
            offset: 0,
        }
    }

    fn require(&self, needed: usize) -> Result<(), ProtocolError> {
        let available = self.payload.len().saturating_sub(self.offset);
        if available < needed {
            return Err(ProtocolError::PayloadTooShort {
                function_id: self.function_id,
                needed: self.offset + needed,
                available: self.payload.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.require(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.payload[self.offset..self.offset + N]);
        self.offset += N;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_le_bytes(self.take()?))
    }
}
