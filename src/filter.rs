// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Moving-average filter module
//!
//! A running-sum moving average over a fixed-capacity ring buffer. The active
//! window can be resized at runtime; a resize discards all history and refills
//! the window with a single sample.

/// Capacity of the ring buffer (maximum window length)
pub const MAX_MOVING_AVERAGE: u8 = 100;

/// Raw ADC sample type
pub type RawSample = u16;

/// Moving-average filter over the most recent raw samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovingAverage {
    /// Ring buffer, only `window[..length]` is active
    window: [RawSample; MAX_MOVING_AVERAGE as usize],
    /// Active window length, 1..=MAX_MOVING_AVERAGE
    length: u8,
    /// Next slot to overwrite, always < length
    write_index: u8,
    /// Sum of the active slots
    sum: u32,
}

impl MovingAverage {
    /// Create a filter of the given length, filled with `initial`
    ///
    /// The length is clamped to `1..=MAX_MOVING_AVERAGE`, so the first output
    /// is `initial` and never zero.
    pub fn new(length: u8, initial: RawSample) -> Self {
        let mut filter = Self {
            window: [0; MAX_MOVING_AVERAGE as usize],
            length: 1,
            write_index: 0,
            sum: 0,
        };
        filter.reinitialize(length, initial);
        filter
    }

    /// Clamp a requested window length into the valid range
    pub fn clamp_length(length: u8) -> u8 {
        length.clamp(1, MAX_MOVING_AVERAGE)
    }

    /// Feed one raw sample and return the conditioned value
    pub fn update(&mut self, sample: RawSample) -> i32 {
        let slot = &mut self.window[self.write_index as usize];
        self.sum = self.sum - u32::from(*slot) + u32::from(sample);
        *slot = sample;
        self.write_index = (self.write_index + 1) % self.length;

        self.value()
    }

    /// Current conditioned value (round half up)
    pub fn value(&self) -> i32 {
        let length = u32::from(self.length);
        ((self.sum + length / 2) / length) as i32
    }

    /// Active window length
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Running sum of the active window
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Index of the next slot to be overwritten
    pub fn write_index(&self) -> u8 {
        self.write_index
    }

    /// Active window contents in storage order
    pub fn samples(&self) -> &[RawSample] {
        &self.window[..self.length as usize]
    }

    /// Whether a resize request would change the active length
    pub fn needs_resize(&self, requested: u8) -> bool {
        Self::clamp_length(requested) != self.length
    }

    /// Discard history and fill the (clamped) window with `sample`
    pub fn reinitialize(&mut self, length: u8, sample: RawSample) {
        self.length = Self::clamp_length(length);
        self.window[..self.length as usize].fill(sample);
        self.write_index = 0;
        self.sum = u32::from(sample) * u32::from(self.length);
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(MAX_MOVING_AVERAGE, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_first_output_is_initial_sample() {
        let mut filter = MovingAverage::new(10, 1234);
        assert_eq!(filter.value(), 1234);
        assert_eq!(filter.update(1234), 1234);
    }

    #[test]
    fn test_constant_stream_converges() {
        let mut filter = MovingAverage::new(8, 0);
        let mut value = 0;
        for _ in 0..8 {
            value = filter.update(500);
        }
        assert_eq!(value, 500);
    }

    #[test]
    fn test_round_half_up() {
        // sum = 10 over a window of 4: (10 + 2) / 4 = 3
        let mut filter = MovingAverage::new(4, 0);
        filter.update(1);
        filter.update(2);
        filter.update(3);
        let value = filter.update(4);
        assert_eq!(filter.sum(), 10);
        assert_eq!(value, 3);

        // sum = 9 over 4: (9 + 2) / 4 = 2, plain truncation would also give 2
        let mut filter = MovingAverage::new(4, 0);
        for sample in [3, 2, 2, 2] {
            filter.update(sample);
        }
        assert_eq!(filter.value(), 2);

        // sum = 6 over 4 is exactly 1.5: rounds up to 2
        let mut filter = MovingAverage::new(4, 0);
        for sample in [3, 3, 0, 0] {
            filter.update(sample);
        }
        assert_eq!(filter.value(), 2);
    }

    #[test]
    fn test_ring_wraps() {
        let mut filter = MovingAverage::new(3, 0);
        filter.update(3);
        filter.update(6);
        filter.update(9);
        assert_eq!(filter.write_index(), 0);

        // Evicts the 3
        assert_eq!(filter.update(12), 9);
        assert_eq!(filter.samples(), &[12, 6, 9]);
    }

    #[test]
    fn test_length_clamped() {
        assert_eq!(MovingAverage::new(0, 7).length(), 1);
        assert_eq!(MovingAverage::new(255, 7).length(), MAX_MOVING_AVERAGE);
        assert_eq!(MovingAverage::clamp_length(42), 42);
    }

    #[test]
    fn test_length_one_is_pass_through() {
        let mut filter = MovingAverage::new(1, 0);
        for sample in [5, 4000, 17, 0, 65535] {
            assert_eq!(filter.update(sample), i32::from(sample));
        }
    }

    #[test]
    fn test_reinitialize_discards_history() {
        let mut filter = MovingAverage::new(MAX_MOVING_AVERAGE, 0);
        for _ in 0..50 {
            filter.update(10);
        }
        filter.reinitialize(5, 20);
        assert_eq!(filter.length(), 5);
        assert_eq!(filter.write_index(), 0);
        assert_eq!(filter.sum(), 100);
        assert_eq!(filter.update(20), 20);
    }

    #[test]
    fn test_needs_resize_compares_clamped_length() {
        let filter = MovingAverage::new(MAX_MOVING_AVERAGE, 0);
        assert!(!filter.needs_resize(200));
        assert!(filter.needs_resize(99));

        let filter = MovingAverage::new(1, 0);
        assert!(!filter.needs_resize(0));
    }

    #[test]
    fn test_sum_invariant_random_stream() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut filter = MovingAverage::new(17, 2048);

        for i in 0..2000 {
            let sample: u16 = rng.gen_range(0..4096);
            filter.update(sample);

            let expected: u32 = filter.samples().iter().map(|&s| u32::from(s)).sum();
            assert_eq!(filter.sum(), expected, "sum drifted at update {}", i);

            if i % 250 == 0 {
                let length = rng.gen_range(0..=120);
                filter.reinitialize(length, sample);
            }
        }
    }

    #[test]
    fn test_full_scale_does_not_overflow() {
        let mut filter = MovingAverage::new(MAX_MOVING_AVERAGE, u16::MAX);
        assert_eq!(filter.update(u16::MAX), i32::from(u16::MAX));
    }
}
