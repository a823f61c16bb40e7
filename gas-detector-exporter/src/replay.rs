// Gas Detector Exporter - Dataset replay
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Replay raw samples through a device.
//!
//! Samples come either from a CSV file or from a synthetic scenario. Each
//! replay step runs one device tick, drains the published events and pushes
//! the results to the Prometheus metrics.

use crate::metrics;
use gas_detector::{Device, DeviceConfig, DeviceError, MemoryChannel, MemoryPeripheral};
use gas_detector_testdata::{
    create_detector_signal, generate_dataset, Dataset, DatasetError, DatasetSampler,
    DetectorScenario, GeneratorConfig,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Device driven by the exporter.
pub type ExporterDevice = Device<DatasetSampler, MemoryChannel, MemoryPeripheral>;

/// Device shared between the replay loop and the HTTP handlers.
pub type SharedDevice = Arc<Mutex<ExporterDevice>>;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Where replayed samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaySource {
    /// CSV file with a `raw` column; empty cells are missing samples.
    Csv(PathBuf),
    /// Generated detector scenario.
    Scenario {
        scenario: DetectorScenario,
        num_samples: usize,
        seed: Option<u64>,
    },
}

impl ReplaySource {
    /// Short description for logs and the status page.
    pub fn describe(&self) -> String {
        match self {
            ReplaySource::Csv(path) => path.display().to_string(),
            ReplaySource::Scenario { scenario, .. } => format!("scenario:{}", scenario),
        }
    }

    /// Load the samples.
    pub fn load(&self) -> Result<Dataset, ReplayError> {
        match self {
            ReplaySource::Csv(path) => load_csv(path),
            ReplaySource::Scenario {
                scenario,
                num_samples,
                seed,
            } => {
                let mut config = GeneratorConfig::new().with_num_samples(*num_samples);
                if let Some(seed) = seed {
                    config = config.with_seed(*seed);
                }
                let signal = create_detector_signal(*scenario, *num_samples);
                Ok(generate_dataset(&config, &signal).with_name(scenario.name()))
            }
        }
    }
}

/// Load raw samples from a CSV file.
///
/// Parsing follows [`Dataset::from_csv`], so any file the dataset generator
/// writes replays as is. A header-only file is rejected.
pub fn load_csv(path: &Path) -> Result<Dataset, ReplayError> {
    if !path.exists() {
        return Err(ReplayError::FileNotFound(path.to_path_buf()));
    }

    let mut dataset = Dataset::from_csv(path)?;
    if dataset.is_empty() {
        return Err(ReplayError::EmptyDataset);
    }

    if let Some(name) = path.file_stem() {
        dataset = dataset.with_name(&name.to_string_lossy());
    }
    Ok(dataset)
}

/// Replay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    /// Replay speed multiplier.
    pub speed: f64,
    /// Restart from the first sample at the end of the dataset.
    pub loop_replay: bool,
    /// Tick interval at speed 1.0.
    pub tick_interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            loop_replay: true,
            tick_interval_ms: 10,
        }
    }
}

impl ReplayConfig {
    /// Wall-clock time between ticks.
    pub fn tick_period(&self) -> Duration {
        let speed = if self.speed > 0.0 { self.speed } else { 1.0 };
        let micros = (self.tick_interval_ms as f64 * 1000.0 / speed).max(1.0);
        Duration::from_micros(micros as u64)
    }
}

/// Replay progress, shared with the HTTP handlers.
#[derive(Debug, Default)]
pub struct ReplayState {
    position: AtomicUsize,
    total_samples: AtomicUsize,
    ticks: AtomicU64,
    running: AtomicBool,
    paused: AtomicBool,
}

impl ReplayState {
    /// Next sample index.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    /// Samples in the dataset.
    pub fn total_samples(&self) -> usize {
        self.total_samples.load(Ordering::Relaxed)
    }

    /// Ticks run since the replay started.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Whether the replay loop is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Whether ticking is suspended.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Ask the replay loop to stop after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Suspend or resume ticking.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// Replay progress as a percentage.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_samples();
        if total == 0 {
            return 0.0;
        }
        self.position() as f64 / total as f64 * 100.0
    }
}

/// Dataset summary for the status page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatasetInfo {
    pub source: String,
    pub name: Option<String>,
    pub total_samples: usize,
    pub missing_samples: usize,
    pub min: Option<u16>,
    pub max: Option<u16>,
    pub mean: Option<f64>,
}

impl DatasetInfo {
    fn new(source: &ReplaySource, dataset: &Dataset) -> Self {
        let stats = dataset.stats();
        Self {
            source: source.describe(),
            name: dataset.metadata.name.clone(),
            total_samples: dataset.len(),
            missing_samples: dataset.missing(),
            min: stats.as_ref().map(|s| s.min),
            max: stats.as_ref().map(|s| s.max),
            mean: stats.as_ref().map(|s| s.mean),
        }
    }
}

/// Replay engine.
pub struct ReplayEngine {
    config: ReplayConfig,
    device: SharedDevice,
    state: Arc<ReplayState>,
    info: DatasetInfo,
}

impl ReplayEngine {
    /// Load the source and bring up a device over it.
    pub fn new(
        config: ReplayConfig,
        source: &ReplaySource,
        device_config: DeviceConfig,
    ) -> Result<Self, ReplayError> {
        let dataset = source.load()?;
        Self::from_dataset(config, source, &dataset, device_config)
    }

    /// Bring up a device over an already loaded dataset.
    pub fn from_dataset(
        config: ReplayConfig,
        source: &ReplaySource,
        dataset: &Dataset,
        device_config: DeviceConfig,
    ) -> Result<Self, ReplayError> {
        if dataset.is_empty() {
            return Err(ReplayError::EmptyDataset);
        }

        let mut sampler = DatasetSampler::new(dataset);
        if config.loop_replay {
            sampler = sampler.looping();
        }
        let device = Device::new(
            device_config,
            sampler,
            MemoryChannel::new(),
            MemoryPeripheral::new(),
        )?;

        let info = DatasetInfo::new(source, dataset);
        info!(
            "Loaded {} samples from {} ({} missing)",
            info.total_samples, info.source, info.missing_samples
        );

        let state = Arc::new(ReplayState::default());
        state.total_samples.store(dataset.len(), Ordering::Relaxed);
        state.position.store(1, Ordering::Relaxed);

        metrics::update_config_metrics(&device);
        metrics::update_replay_metrics(1, dataset.len(), config.speed);

        Ok(Self {
            config,
            device: Arc::new(Mutex::new(device)),
            state,
            info,
        })
    }

    /// Shared device handle.
    pub fn device(&self) -> SharedDevice {
        Arc::clone(&self.device)
    }

    /// Shared replay state.
    pub fn state(&self) -> Arc<ReplayState> {
        Arc::clone(&self.state)
    }

    /// Dataset summary.
    pub fn dataset_info(&self) -> &DatasetInfo {
        &self.info
    }

    /// Replay configuration.
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Run one tick. Returns `false` once a non-looping dataset is exhausted.
    pub async fn step(&self) -> bool {
        let mut device = self.device.lock().await;
        if device.sampler_mut().is_exhausted() {
            return false;
        }

        let outcome = device.tick();
        metrics::record_tick(&outcome);
        for event in device.channel_mut().drain() {
            debug!("event {}", event);
            metrics::record_event(&event);
        }
        metrics::update_device_metrics(device.metrics());

        let position = device.sampler_mut().position();
        self.state.position.store(position, Ordering::Relaxed);
        self.state.ticks.fetch_add(1, Ordering::Relaxed);
        metrics::update_replay_metrics(position, self.info.total_samples, self.config.speed);

        true
    }

    /// Tick until stopped or, without looping, until the dataset runs out.
    pub async fn run(&self) {
        self.state.running.store(true, Ordering::Relaxed);
        let period = self.config.tick_period();
        info!(
            "Starting replay: {:?} per tick (speed {}x, loop {})",
            period, self.config.speed, self.config.loop_replay
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while self.state.is_running() {
            interval.tick().await;
            if self.state.is_paused() {
                continue;
            }
            if !self.step().await {
                warn!("Replay finished after {} ticks", self.state.ticks());
                break;
            }
        }

        self.state.running.store(false, Ordering::Relaxed);
        info!("Replay stopped");
    }
}
