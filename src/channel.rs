// Gas Detector - Measurement pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Event channel abstraction module
//!
//! This module provides the trait through which the device publishes its
//! callback events, and an in-memory implementation for tests and host-side
//! simulation.

use crate::error::{ChannelError, Result};
use crate::protocol::Event;
use std::collections::VecDeque;

/// Statistics about channel usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMetrics {
    /// Total events published
    pub events_published: u64,
    /// Total payload bytes published
    pub bytes_published: u64,
    /// Events rejected (closed channel or full buffer)
    pub events_rejected: u64,
}

/// Trait for outbound event channels
pub trait EventChannel {
    /// Publish one event
    fn publish(&mut self, event: Event) -> Result<()>;

    /// Check if the channel accepts events
    fn is_available(&self) -> bool;

    /// Get channel metrics
    fn metrics(&self) -> ChannelMetrics;

    /// Close the channel
    fn close(&mut self);
}

/// A simple in-memory event channel
#[derive(Debug)]
pub struct MemoryChannel {
    /// Published events, oldest first
    buffer: VecDeque<Event>,
    /// Maximum buffer size
    max_buffer_size: usize,
    /// Whether the channel is open
    is_open: bool,
    /// Metrics
    metrics: ChannelMetrics,
}

impl MemoryChannel {
    /// Create a new memory channel
    pub fn new() -> Self {
        Self::with_buffer_size(1000)
    }

    /// Create with custom buffer size
    pub fn with_buffer_size(max_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(max_size.min(1024)),
            max_buffer_size: max_size,
            is_open: true,
            metrics: ChannelMetrics::default(),
        }
    }

    /// Pop the oldest published event
    pub fn pop(&mut self) -> Option<Event> {
        self.buffer.pop_front()
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<Event> {
        self.buffer.drain(..).collect()
    }

    /// Number of pending events
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Pending events, oldest first
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.buffer.iter()
    }

    /// Reopen a closed channel
    pub fn reopen(&mut self) {
        self.is_open = true;
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel for MemoryChannel {
    fn publish(&mut self, event: Event) -> Result<()> {
        if !self.is_open {
            self.metrics.events_rejected += 1;
            return Err(ChannelError::Disconnected {
                reason: "Channel is closed".to_string(),
            }
            .into());
        }

        if self.buffer.len() >= self.max_buffer_size {
            self.metrics.events_rejected += 1;
            return Err(ChannelError::BufferFull.into());
        }

        self.metrics.bytes_published += event.encode_payload().len() as u64;
        self.metrics.events_published += 1;
        self.buffer.push_back(event);

        Ok(())
    }

    fn is_available(&self) -> bool {
        self.is_open
    }

    fn metrics(&self) -> ChannelMetrics {
        self.metrics.clone()
    }

    fn close(&mut self) {
        self.is_open = false;
    }
}
