//! Integration tests for request dispatch through raw function ids

use gas_detector::*;

type TestDevice = Device<ScriptedSampler, MemoryChannel, MemoryPeripheral>;

fn device() -> TestDevice {
    Device::new(
        DeviceConfig::new(),
        ScriptedSampler::from_samples([2000]).hold_last(),
        MemoryChannel::new(),
        MemoryPeripheral::new(),
    )
    .unwrap()
}

fn get(device: &mut TestDevice, fid: FunctionId) -> Vec<u8> {
    let reply = device.invoke(fid as u8, &[]);
    assert_eq!(reply.error_code, ErrorCode::Ok, "{:?}", fid);
    reply.payload
}

#[test]
fn test_defaults_over_the_wire() {
    let mut device = device();

    assert_eq!(get(&mut device, FunctionId::GetValue), 2000i32.to_le_bytes());
    assert_eq!(get(&mut device, FunctionId::GetValueCallbackPeriod), 0u32.to_le_bytes());
    assert_eq!(get(&mut device, FunctionId::GetDebouncePeriod), 100u32.to_le_bytes());
    assert_eq!(get(&mut device, FunctionId::GetMovingAverage), vec![100]);
    assert_eq!(get(&mut device, FunctionId::GetDetectorType), vec![0]);
    assert_eq!(get(&mut device, FunctionId::IsHeaterOn), vec![1]);

    let mut threshold = vec![b'x'];
    threshold.extend_from_slice(&0i32.to_le_bytes());
    threshold.extend_from_slice(&0i32.to_le_bytes());
    assert_eq!(get(&mut device, FunctionId::GetValueCallbackThreshold), threshold);
}

#[test]
fn test_setters_roundtrip_through_getters() {
    let mut device = device();

    let threshold = Threshold::new(ThresholdOption::Inside, -5, 300);
    let request = Request::SetValueCallbackThreshold(threshold);
    let reply = device.invoke(request.function_id() as u8, &request.encode_payload());
    assert!(reply.is_ok());
    assert!(reply.payload.is_empty());
    assert_eq!(
        get(&mut device, FunctionId::GetValueCallbackThreshold),
        request.encode_payload()
    );

    let reply = device.invoke(FunctionId::SetValueCallbackPeriod as u8, &250u32.to_le_bytes());
    assert!(reply.is_ok());
    assert_eq!(device.callback_period(), 250);

    let reply = device.invoke(FunctionId::SetDetectorType as u8, &[1]);
    assert!(reply.is_ok());
    assert_eq!(get(&mut device, FunctionId::GetDetectorType), vec![1]);

    device.invoke(FunctionId::HeaterOff as u8, &[]);
    assert_eq!(get(&mut device, FunctionId::IsHeaterOn), vec![0]);
}

#[test]
fn test_unknown_threshold_option_reads_back_off() {
    let mut device = device();
    let mut payload = vec![b'?'];
    payload.extend_from_slice(&1i32.to_le_bytes());
    payload.extend_from_slice(&2i32.to_le_bytes());

    assert!(device.invoke(FunctionId::SetValueCallbackThreshold as u8, &payload).is_ok());
    assert_eq!(device.threshold().option, ThresholdOption::Off);
}

#[test]
fn test_moving_average_is_clamped() {
    let mut device = device();

    device.invoke(FunctionId::SetMovingAverage as u8, &[0]);
    assert_eq!(get(&mut device, FunctionId::GetMovingAverage), vec![1]);

    device.invoke(FunctionId::SetMovingAverage as u8, &[255]);
    assert_eq!(get(&mut device, FunctionId::GetMovingAverage), vec![100]);
}

#[test]
fn test_unsupported_function_ids() {
    let mut device = device();

    for fid in [0u8, 17, 200, 255] {
        assert_eq!(device.invoke(fid, &[]).error_code, ErrorCode::NotSupported);
    }

    // Event ids are outbound only
    assert_eq!(
        device.invoke(FunctionId::Value as u8, &[0; 4]).error_code,
        ErrorCode::NotSupported
    );
    assert_eq!(
        device.invoke(FunctionId::ValueReached as u8, &[0; 4]).error_code,
        ErrorCode::NotSupported
    );
}

#[test]
fn test_truncated_payloads_are_rejected() {
    let mut device = device();

    let cases: [(FunctionId, &[u8]); 4] = [
        (FunctionId::SetValueCallbackPeriod, &[1, 0, 0]),
        (FunctionId::SetValueCallbackThreshold, &[b'>', 1, 0, 0, 0, 2, 0, 0]),
        (FunctionId::SetMovingAverage, &[]),
        (FunctionId::SetDetectorType, &[]),
    ];

    for (fid, payload) in cases {
        let reply = device.invoke(fid as u8, payload);
        assert_eq!(reply, Reply::error(ErrorCode::InvalidParameter), "{:?}", fid);
    }

    assert_eq!(device.callback_period(), 0);
    assert_eq!(device.threshold(), Threshold::off());
    assert_eq!(device.moving_average(), 100);
}

#[test]
fn test_event_frames() {
    let mut device = Device::new(
        DeviceConfig::pass_through(),
        ScriptedSampler::from_samples([0, 777]),
        MemoryChannel::new(),
        MemoryPeripheral::new(),
    )
    .unwrap();

    device.tick();
    let event = device.channel_mut().pop().unwrap();

    assert_eq!(event.function_id(), FunctionId::Value);
    assert_eq!(
        Event::decode(event.function_id() as u8, &event.encode_payload()),
        Ok(event)
    );
    assert_eq!(event.to_string(), "VALUE(777)");
}
