// crates/hexatrack-adapters/tests/adapters/jsonl_tests.rs
// ============================================================================
// Module: JSON Lines Adapter Tests
// Description: Record format and sink error handling.
// Purpose: Validate one JSON object per line and typed failures.
// Dependencies: hexatrack-adapters, hexatrack-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_adapters::JsonLinesAdapter`].

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use hexatrack_adapters::Adapter;
use hexatrack_adapters::JsonLinesAdapter;
use hexatrack_core::OutgoingPort;
use hexatrack_core::PortError;
use serde_json::Value;

use super::common::FailingWriter;
use super::common::SharedBuffer;
use super::common::sample_final;

/// Tests each record is written as one JSON object per line.
#[tokio::test]
async fn writes_one_record_per_line() {
    let buffer = SharedBuffer::default();
    let adapter = JsonLinesAdapter::new(buffer.clone());
    adapter.start().await.expect("start");

    adapter.send(&sample_final(1001)).await.expect("send");
    adapter.send(&sample_final(1002)).await.expect("send");

    let output = buffer.to_string_lossy();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).expect("json");
    assert_eq!(first["track_id"], 1001);
    assert_eq!(first["first_hop_delay_time"], 400);
    assert_eq!(first["second_hop_delay_time"], 600);
    assert_eq!(first["total_delay_time"], 1000);
    let second: Value = serde_json::from_str(lines[1]).expect("json");
    assert_eq!(second["track_id"], 1002);
    assert_eq!(adapter.written_count(), 2);
    adapter.stop().await;
}

/// Tests nothing is written while stopped.
#[tokio::test]
async fn rejects_sends_while_stopped() {
    let buffer = SharedBuffer::default();
    let adapter = JsonLinesAdapter::new(buffer.clone());

    assert!(!adapter.is_ready());
    assert_eq!(adapter.send(&sample_final(1)).await, Err(PortError::NotRunning));
    assert!(buffer.to_string_lossy().is_empty());
}

/// Tests writer failures surface as sink errors.
#[tokio::test]
async fn writer_failure_maps_to_sink_error() {
    let adapter = JsonLinesAdapter::new(FailingWriter);
    adapter.start().await.expect("start");

    let result = adapter.send(&sample_final(1)).await;

    assert!(matches!(result, Err(PortError::Sink(message)) if message.contains("simulated write failure")));
    assert_eq!(adapter.written_count(), 0);
    adapter.stop().await;
}

/// Tests invalid records are rejected before writing.
#[tokio::test]
async fn rejects_invalid_record() {
    let buffer = SharedBuffer::default();
    let adapter = JsonLinesAdapter::new(buffer.clone());
    adapter.start().await.expect("start");

    let mut record = sample_final(1);
    record.position.x = f64::NAN;

    assert!(matches!(adapter.send(&record).await, Err(PortError::Invalid(_))));
    assert!(buffer.to_string_lossy().is_empty());
    adapter.stop().await;
}
