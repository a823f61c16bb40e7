// Gas Detector Testdata - Dataset structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Dataset structures and I/O operations.
//!
//! A dataset is a sequence of raw ADC samples, one per tick. Missing samples
//! (`None`) stand for failed acquisitions.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Dataset error types.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Empty dataset")]
    Empty,
}

/// Dataset metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Dataset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generation seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Tick interval in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_interval_ms: Option<u64>,
    /// Converter resolution in bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adc_bits: Option<u8>,
}

/// A sequence of raw detector samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Raw samples in tick order.
    pub samples: Vec<Option<u16>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: DatasetMetadata,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from present samples.
    pub fn from_samples(samples: impl IntoIterator<Item = u16>) -> Self {
        Self {
            samples: samples.into_iter().map(Some).collect(),
            metadata: DatasetMetadata::default(),
        }
    }

    /// Append a sample.
    pub fn push(&mut self, sample: Option<u16>) {
        self.samples.push(sample);
    }

    /// Get all samples.
    pub fn samples(&self) -> &[Option<u16>] {
        &self.samples
    }

    /// Get number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of missing samples.
    pub fn missing(&self) -> usize {
        self.samples.iter().filter(|s| s.is_none()).count()
    }

    /// Present samples only.
    pub fn present(&self) -> impl Iterator<Item = u16> + '_ {
        self.samples.iter().flatten().copied()
    }

    /// Set metadata.
    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.metadata.name = Some(name.to_string());
        self
    }

    /// Set description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.metadata.description = Some(description.to_string());
        self
    }

    /// Export to CSV file (`tick,raw`, empty `raw` for missing samples).
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["tick", "raw"])?;
        for (tick, sample) in self.samples.iter().enumerate() {
            let raw = sample.map(|r| r.to_string()).unwrap_or_default();
            writer.write_record([tick.to_string(), raw])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Import from CSV file.
    ///
    /// Headers are matched case-insensitively and cells are trimmed. Rows are
    /// taken in file order; a `tick` column, when present, must hold
    /// non-negative integers but is otherwise ignored. An empty `raw` cell is
    /// a missing sample. Blank lines are skipped.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(DatasetError::Empty);
        }
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let raw_column =
            column("raw").ok_or_else(|| DatasetError::MissingColumn("raw".to_string()))?;
        let tick_column = column("tick");

        let mut dataset = Dataset::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(index + 2);

            if let Some(tick) = tick_column {
                record
                    .get(tick)
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or_else(|| DatasetError::CsvParse {
                        line,
                        message: "Invalid tick".to_string(),
                    })?;
            }

            let sample = match record.get(raw_column).unwrap_or("") {
                "" => None,
                s => Some(s.parse().map_err(|_| DatasetError::CsvParse {
                    line,
                    message: format!("Invalid raw sample '{}'", s),
                })?),
            };

            dataset.samples.push(sample);
        }

        Ok(dataset)
    }

    /// Export to JSON file.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset = serde_json::from_reader(reader)?;
        Ok(dataset)
    }

    /// Calculate basic statistics over present samples.
    pub fn stats(&self) -> Option<SampleStats> {
        let values: Vec<f64> = self.present().map(f64::from).collect();

        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(SampleStats {
            count,
            missing: self.missing(),
            mean,
            std_dev: variance.sqrt(),
            min: self.present().min().unwrap_or(0),
            max: self.present().max().unwrap_or(0),
        })
    }
}

/// Basic statistics for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u16,
    pub max: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::from_samples([1, 2, 3]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.missing(), 0);
        assert!(!dataset.is_empty());
        assert!(Dataset::new().is_empty());
    }

    #[test]
    fn test_csv_roundtrip_with_missing() {
        let mut dataset = Dataset::from_samples([2048, 2050]);
        dataset.push(None);
        dataset.push(Some(4095));

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        dataset.to_csv(path).unwrap();
        let loaded = Dataset::from_csv(path).unwrap();

        assert_eq!(loaded.samples(), dataset.samples());
        assert_eq!(loaded.missing(), 1);
    }

    #[test]
    fn test_csv_raw_column_lookup() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "raw,tick").unwrap();
        writeln!(file, "17,0").unwrap();
        writeln!(file, ",1").unwrap();
        writeln!(file).unwrap();

        let loaded = Dataset::from_csv(file.path()).unwrap();
        assert_eq!(loaded.samples(), &[Some(17), None]);
    }

    #[test]
    fn test_csv_headers_case_insensitive() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Tick, RAW ").unwrap();
        writeln!(file, "0, 812").unwrap();
        writeln!(file, "1,").unwrap();

        let loaded = Dataset::from_csv(file.path()).unwrap();
        assert_eq!(loaded.samples(), &[Some(812), None]);
    }

    #[test]
    fn test_csv_invalid_tick() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tick,raw").unwrap();
        writeln!(file, "0,5").unwrap();
        writeln!(file, "x,6").unwrap();

        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(DatasetError::CsvParse { line: 3, .. })
        ));
    }

    #[test]
    fn test_csv_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tick,value").unwrap();
        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(DatasetError::MissingColumn(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "tick,raw").unwrap();
        writeln!(file, "0,70000").unwrap();
        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(DatasetError::CsvParse { line: 2, .. })
        ));

        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            Dataset::from_csv(file.path()),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let dataset = Dataset::from_samples([10, 20])
            .with_name("test")
            .with_description("two samples");

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        dataset.to_json(path).unwrap();
        let loaded = Dataset::from_json(path).unwrap();

        assert_eq!(loaded, dataset);
    }

    #[test]
    fn test_stats() {
        let mut dataset = Dataset::from_samples([10, 20, 30]);
        dataset.push(None);

        let stats = dataset.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 30);

        assert!(Dataset::new().stats().is_none());
    }
}
