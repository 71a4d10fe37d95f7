// crates/hexatrack-adapters/src/jsonl.rs
// ============================================================================
// Module: JSON Lines Adapter
// Description: Outgoing sink writing one JSON record per final track.
// Purpose: Mirror stage C output to stdout or a file for offline analysis.
// Dependencies: hexatrack-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Each FinalCalcTrackData is serialized with `serde_json` and written as a
//! single newline-terminated line, then the writer is flushed.
//! Invariants:
//! - A write failure is reported as [`PortError::Sink`].
//! - `written_count` only counts records that were fully written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use hexatrack_core::FinalCalcTrackData;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;
use hexatrack_core::WireMessage;

use crate::adapter::Adapter;
use crate::error::AdapterError;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter name.
pub const JSON_LINES_ADAPTER_NAME: &str = "FinalCalcTrackData-JsonLines-OutAdapter";

/// Outgoing adapter writing FinalCalcTrackData as JSON lines.
pub struct JsonLinesAdapter<W> {
    /// Destination writer.
    writer: Mutex<W>,
    /// Set between `start` and `stop`.
    running: AtomicBool,
    /// Records written.
    written: AtomicU64,
}

impl<W: Write + Send> JsonLinesAdapter<W> {
    /// Creates a stopped adapter writing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            running: AtomicBool::new(false),
            written: AtomicU64::new(0),
        }
    }

    /// Returns how many records were written.
    #[must_use]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Writes one record and flushes.
    fn write_record(&self, message: &FinalCalcTrackData) -> Result<(), PortError> {
        let mut line = serde_json::to_vec(message).map_err(|err| PortError::Sink(err.to_string()))?;
        line.push(b'\n');
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line).map_err(|err| PortError::Sink(err.to_string()))?;
        writer.flush().map_err(|err| PortError::Sink(err.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send + 'static> Adapter for JsonLinesAdapter<W> {
    fn name(&self) -> &str {
        JSON_LINES_ADAPTER_NAME
    }

    async fn start(&self) -> Result<(), AdapterError> {
        if !self.running.swap(true, Ordering::AcqRel) {
            tracing::info!(adapter = JSON_LINES_ADAPTER_NAME, "adapter started");
        }
        Ok(())
    }

    async fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        let flushed = self.writer.lock().unwrap_or_else(PoisonError::into_inner).flush();
        if let Err(err) = flushed {
            tracing::error!(adapter = JSON_LINES_ADAPTER_NAME, error = %err, "final flush failed");
        }
        tracing::info!(adapter = JSON_LINES_ADAPTER_NAME, written = self.written_count(), "adapter stopped");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<W: Write + Send + 'static> OutgoingPort<FinalCalcTrackData> for JsonLinesAdapter<W> {
    async fn send(&self, message: &FinalCalcTrackData) -> Result<(), PortError> {
        if !self.running.load(Ordering::Acquire) {
            return Err(PortError::NotRunning);
        }
        message.validate()?;
        self.write_record(message)?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
