// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Request dispatch
//!
//! Maps decoded [`Request`]s onto device operations. The mapping is pure:
//! it never touches the measurement cycle beyond what the addressed setter
//! does.

use log::debug;

use crate::channel::EventChannel;
use crate::device::Device;
use crate::error::{DeviceError, Result};
use crate::peripheral::Peripheral;
use crate::protocol::{ErrorCode, Reply, Request, Response};
use crate::sampler::Sampler;

impl<S, C, P> Device<S, C, P>
where
    S: Sampler,
    C: EventChannel,
    P: Peripheral,
{
    /// Execute a decoded request
    ///
    /// # Errors
    ///
    /// Only a window resize can fail, when its refill sample cannot be
    /// acquired.
    pub fn handle(&mut self, request: Request) -> Result<Response> {
        let response = match request {
            Request::GetValue => Response::Value(self.value()),
            Request::SetValueCallbackPeriod(ticks) => {
                self.set_callback_period(ticks);
                Response::Ack
            }
            Request::GetValueCallbackPeriod => Response::CallbackPeriod(self.callback_period()),
            Request::SetValueCallbackThreshold(threshold) => {
                self.set_threshold(threshold);
                Response::Ack
            }
            Request::GetValueCallbackThreshold => Response::CallbackThreshold(self.threshold()),
            Request::SetDebouncePeriod(ticks) => {
                self.set_debounce_period(ticks);
                Response::Ack
            }
            Request::GetDebouncePeriod => Response::DebouncePeriod(self.debounce_period()),
            Request::SetMovingAverage(length) => {
                self.set_moving_average(length)?;
                Response::Ack
            }
            Request::GetMovingAverage => Response::MovingAverage(self.moving_average()),
            Request::SetDetectorType(detector_type) => {
                self.set_detector_type(detector_type);
                Response::Ack
            }
            Request::GetDetectorType => Response::DetectorType(self.detector_type()),
            Request::HeaterOn => {
                self.set_heater(true);
                Response::Ack
            }
            Request::HeaterOff => {
                self.set_heater(false);
                Response::Ack
            }
            Request::IsHeaterOn => Response::Heater(self.is_heater_on()),
        };

        Ok(response)
    }

    /// Decode and execute a raw request, producing the transport reply
    ///
    /// Unknown function ids yield [`ErrorCode::NotSupported`] and leave the
    /// device untouched; short payloads yield [`ErrorCode::InvalidParameter`].
    pub fn invoke(&mut self, function_id: u8, payload: &[u8]) -> Reply {
        let request = match Request::decode(function_id, payload) {
            Ok(request) => request,
            Err(e) => {
                debug!("rejecting request: {}", e);
                return Reply::error(ErrorCode::from(&e));
            }
        };

        match self.handle(request) {
            Ok(response) => Reply::ok(&response),
            Err(e) => {
                debug!("request {:?} failed: {}", request.function_id(), e);
                Reply::error(error_code(&e))
            }
        }
    }
}

fn error_code(err: &DeviceError) -> ErrorCode {
    match err {
        DeviceError::Protocol(e) => ErrorCode::from(e),
        DeviceError::Sample(_) | DeviceError::Channel(_) => ErrorCode::Unknown,
    }
}
