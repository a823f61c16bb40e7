//! Stress tests for the measurement pipeline
//!
//! Run with: cargo test --release stress -- --ignored

use gas_detector::*;
use rand::Rng;
use std::time::Instant;

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_tick_rate() {
    let iterations = 1_000_000;
    let mut sampler = ScriptedSampler::new();
    sampler.push_repeated(2048, iterations + 1);

    let mut device = Device::new(
        DeviceConfig::default(),
        sampler,
        MemoryChannel::new(),
        MemoryPeripheral::new(),
    )
    .unwrap();

    let start = Instant::now();
    for _ in 0..iterations {
        device.tick();
    }
    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Ran {} ticks in {:?}", iterations, elapsed);
    println!("Rate: {:.0} ticks/second", rate);

    assert_eq!(device.metrics().ticks, iterations as u64);
    assert!(
        rate > 1_000_000.0,
        "Should run at least 1M ticks/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_random_reconfiguration() {
    let mut rng = rand::thread_rng();
    let mut device = Device::new(
        DeviceConfig::default(),
        ScriptedSampler::from_samples([0]).hold_last(),
        MemoryChannel::with_buffer_size(100),
        MemoryPeripheral::new(),
    )
    .unwrap();

    for i in 0..200_000u32 {
        device.sampler_mut().push(rng.gen_range(0..4096));

        if i % 97 == 0 {
            let length: u8 = rng.gen();
            device.set_moving_average(length).unwrap();
            assert_eq!(device.moving_average(), length.clamp(1, MAX_MOVING_AVERAGE));
        } else if i % 89 == 0 {
            let options = [
                ThresholdOption::Off,
                ThresholdOption::Inside,
                ThresholdOption::Outside,
                ThresholdOption::Greater,
                ThresholdOption::Smaller,
            ];
            let option = options[rng.gen_range(0..options.len())];
            let min = rng.gen_range(0..2048);
            let max = rng.gen_range(2048..4096);
            device.set_threshold(Threshold::new(option, min, max));
            device.set_debounce_period(rng.gen_range(0..10));
            device.set_callback_period(rng.gen_range(0..5));
        } else {
            device.tick();
        }

        let filter = device.filter();
        let sum: u32 = filter.samples().iter().map(|&s| s as u32).sum();
        assert_eq!(filter.sum(), sum, "sum drifted at iteration {}", i);
        assert!((0..4096).contains(&device.value()));

        device.channel_mut().drain();
    }

    println!("{}", device.metrics().report());
}

#[test]
#[ignore]
fn stress_test_channel_backpressure() {
    let iterations = 100_000usize;
    let mut sampler = ScriptedSampler::new();
    for i in 0..=iterations {
        sampler.push((i % 4096) as RawSample);
    }

    let mut device = Device::new(
        DeviceConfig::pass_through(),
        sampler,
        MemoryChannel::with_buffer_size(1000),
        MemoryPeripheral::new(),
    )
    .unwrap();

    for _ in 0..iterations {
        device.tick();
    }

    let metrics = device.metrics();
    assert_eq!(metrics.value_events, 1000);
    assert_eq!(metrics.channel_failures, (iterations - 1000) as u64);
    assert_eq!(device.channel().pending(), 1000);
}
