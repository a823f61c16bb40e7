// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Raw sample acquisition
//!
//! The device pulls exactly one raw sample per tick (and one more whenever the
//! filter window is resized) through the [`Sampler`] trait.

use crate::error::SampleError;
use crate::filter::RawSample;
use std::collections::VecDeque;

/// Source of raw ADC samples
pub trait Sampler {
    /// Acquire one raw sample
    fn sample(&mut self) -> Result<RawSample, SampleError>;
}

impl<F> Sampler for F
where
    F: FnMut() -> Result<RawSample, SampleError>,
{
    fn sample(&mut self) -> Result<RawSample, SampleError> {
        self()
    }
}

/// Sampler replaying a scripted sequence of readings and failures
///
/// Once the script is exhausted every call fails with
/// [`SampleError::Unavailable`], unless the sampler was told to hold the
/// last successful reading.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSampler {
    script: VecDeque<Result<RawSample, SampleError>>,
    hold_last: bool,
    last: Option<RawSample>,
    delivered: u64,
}

impl ScriptedSampler {
    /// Create an empty sampler
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sampler from a sequence of readings
    pub fn from_samples(samples: impl IntoIterator<Item = RawSample>) -> Self {
        let mut sampler = Self::new();
        sampler.extend(samples);
        sampler
    }

    /// Keep returning the last reading once the script runs out
    pub fn hold_last(mut self) -> Self {
        self.hold_last = true;
        self
    }

    /// Queue one reading
    pub fn push(&mut self, sample: RawSample) {
        self.script.push_back(Ok(sample));
    }

    /// Queue a reading `count` times
    pub fn push_repeated(&mut self, sample: RawSample, count: usize) {
        self.script.extend(std::iter::repeat(Ok(sample)).take(count));
    }

    /// Queue a failed acquisition
    pub fn push_failure(&mut self, error: SampleError) {
        self.script.push_back(Err(error));
    }

    /// Queue several readings
    pub fn extend(&mut self, samples: impl IntoIterator<Item = RawSample>) {
        self.script.extend(samples.into_iter().map(Ok));
    }

    /// Entries left in the script
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Successful readings handed out so far
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> Result<RawSample, SampleError> {
        let next = match self.script.pop_front() {
            Some(entry) => entry,
            None => match (self.hold_last, self.last) {
                (true, Some(last)) => Ok(last),
                _ => Err(SampleError::Unavailable),
            },
        };

        if let Ok(sample) = next {
            self.last = Some(sample);
            self.delivered += 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_sampler_order() {
        let mut sampler = ScriptedSampler::from_samples([1, 2, 3]);
        assert_eq!(sampler.sample(), Ok(1));
        assert_eq!(sampler.sample(), Ok(2));
        assert_eq!(sampler.sample(), Ok(3));
        assert_eq!(sampler.sample(), Err(SampleError::Unavailable));
        assert_eq!(sampler.delivered(), 3);
    }

    #[test]
    fn test_scripted_sampler_failures() {
        let mut sampler = ScriptedSampler::new();
        sampler.push(10);
        sampler.push_failure(SampleError::NotReady);
        sampler.push(11);

        assert_eq!(sampler.sample(), Ok(10));
        assert_eq!(sampler.sample(), Err(SampleError::NotReady));
        assert_eq!(sampler.sample(), Ok(11));
        assert_eq!(sampler.delivered(), 2);
    }

    #[test]
    fn test_scripted_sampler_hold_last() {
        let mut sampler = ScriptedSampler::from_samples([7]).hold_last();
        assert_eq!(sampler.sample(), Ok(7));
        assert_eq!(sampler.sample(), Ok(7));
        assert_eq!(sampler.remaining(), 0);
    }

    #[test]
    fn test_closure_sampler() {
        let mut next = 0u16;
        let mut sampler = move || {
            next += 5;
            Ok::<RawSample, SampleError>(next)
        };
        assert_eq!(Sampler::sample(&mut sampler), Ok(5));
        assert_eq!(Sampler::sample(&mut sampler), Ok(10));
    }
}
