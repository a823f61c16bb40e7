// Gas Detector Testdata - Dataset replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Replay a dataset into a device as its sample source.

use crate::dataset::Dataset;
use gas_detector::{RawSample, SampleError, Sampler};

/// Sampler replaying dataset samples in order.
///
/// Missing samples fail with [`SampleError::NotReady`]. Once the dataset is
/// exhausted every call fails with [`SampleError::Unavailable`], unless the
/// sampler loops.
#[derive(Debug, Clone)]
pub struct DatasetSampler {
    samples: Vec<Option<RawSample>>,
    position: usize,
    looping: bool,
}

impl DatasetSampler {
    /// Create a sampler over a dataset.
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            samples: dataset.samples().to_vec(),
            position: 0,
            looping: false,
        }
    }

    /// Restart from the first sample when the end is reached.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Index of the next sample.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Samples left before the end of the dataset.
    pub fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.position)
    }

    /// Whether the dataset has been fully replayed.
    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.remaining() == 0
    }
}

impl Sampler for DatasetSampler {
    fn sample(&mut self) -> Result<RawSample, SampleError> {
        if self.position >= self.samples.len() {
            if !self.looping || self.samples.is_empty() {
                return Err(SampleError::Unavailable);
            }
            self.position = 0;
        }

        let sample = self.samples[self.position];
        self.position += 1;
        sample.ok_or(SampleError::NotReady)
    }
}
