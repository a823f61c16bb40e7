// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Board peripherals outside the measurement path
//!
//! The detector type selects the sensing element variant and is meant to be
//! persisted by the board (EEPROM); the heater is a plain GPIO output. Neither
//! takes part in signal conditioning.

/// Heater and detector-type control
pub trait Peripheral {
    /// Select the detector type
    fn set_detector_type(&mut self, detector_type: u8);

    /// Currently selected detector type
    fn detector_type(&self) -> u8;

    /// Switch the heater on or off
    fn set_heater(&mut self, on: bool);

    /// Check if the heater is on
    fn is_heater_on(&self) -> bool;
}

/// In-memory peripheral standing in for GPIO and non-volatile storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPeripheral {
    detector_type: u8,
    heater: bool,
    /// Number of detector-type writes, i.e. storage writes on real hardware
    detector_type_writes: u32,
}

impl MemoryPeripheral {
    /// Create a peripheral with detector type 0 and the heater off
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of detector-type writes performed
    pub fn detector_type_writes(&self) -> u32 {
        self.detector_type_writes
    }
}

impl Peripheral for MemoryPeripheral {
    fn set_detector_type(&mut self, detector_type: u8) {
        self.detector_type = detector_type;
        self.detector_type_writes += 1;
    }

    fn detector_type(&self) -> u8 {
        self.detector_type
    }

    fn set_heater(&mut self, on: bool) {
        self.heater = on;
    }

    fn is_heater_on(&self) -> bool {
        self.heater
    }
}
