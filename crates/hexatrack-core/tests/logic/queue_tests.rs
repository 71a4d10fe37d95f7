// crates/hexatrack-core/tests/logic/queue_tests.rs
// ============================================================================
// Module: Event Queue Tests
// Description: Worker lifecycle and drop-oldest behavior.
// Purpose: Validate FIFO delivery, eviction, and stop semantics.
// Dependencies: hexatrack-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`hexatrack_core::logic::EventQueue`].

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

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hexatrack_core::LogicError;
use hexatrack_core::logic::EventQueue;
use hexatrack_core::logic::MAX_QUEUE_SIZE;
use hexatrack_core::logic::PushOutcome;
use hexatrack_core::logic::QueueHandler;
use tokio::sync::Semaphore;

use super::common::wait_until;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Handler recording message order, optionally gated by a semaphore.
struct Collector {
    handled: Mutex<Vec<u32>>,
    gate: Option<Semaphore>,
}

impl Collector {
    fn open() -> Arc<Self> {
        Arc::new(Self {
            handled: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn gated() -> Arc<Self> {
        Arc::new(Self {
            handled: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        })
    }

    fn handled(&self) -> Vec<u32> {
        self.handled.lock().unwrap().clone()
    }

    fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }
}

#[async_trait]
impl QueueHandler<u32> for Collector {
    async fn handle(&self, message: u32) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.handled.lock().unwrap().push(message);
    }
}

fn queue(capacity: usize) -> EventQueue<u32> {
    EventQueue::new("test", capacity, Duration::from_millis(20)).expect("queue")
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Tests zero capacity is rejected.
#[test]
fn zero_capacity_is_rejected() {
    let result = EventQueue::<u32>::new("test", 0, Duration::from_millis(20));
    assert!(matches!(result, Err(LogicError::InvalidCapacity(_))));
}

/// Tests a new queue is stopped and empty.
#[test]
fn new_queue_is_stopped() {
    let queue = EventQueue::<u32>::new("fresh", MAX_QUEUE_SIZE, Duration::ZERO).expect("queue");
    assert!(!queue.is_running());
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), 500);
    assert_eq!(queue.name(), "fresh");
}

/// Tests pushes are refused while stopped.
#[test]
fn push_while_stopped_is_refused() {
    let queue = queue(4);
    assert_eq!(queue.push(1), PushOutcome::Stopped);
    assert!(queue.is_empty());
}

// ============================================================================
// SECTION: Delivery
// ============================================================================

/// Tests messages reach the handler in FIFO order.
#[tokio::test]
async fn worker_handles_messages_in_order() {
    let queue = queue(16);
    let collector = Collector::open();
    assert!(queue.start(collector.clone()));

    for value in 1 ..= 5 {
        assert_eq!(queue.push(value), PushOutcome::Enqueued);
    }

    assert!(wait_until(Duration::from_secs(2), || collector.handled().len() == 5).await);
    assert_eq!(collector.handled(), vec![1, 2, 3, 4, 5]);
    queue.stop().await;
}

/// Tests a full queue evicts the oldest pending message.
#[tokio::test]
async fn full_queue_evicts_oldest() {
    let queue = queue(2);
    let collector = Collector::gated();
    queue.start(collector.clone());

    queue.push(1);
    assert!(wait_until(Duration::from_secs(2), || queue.is_empty()).await);

    assert_eq!(queue.push(2), PushOutcome::Enqueued);
    assert_eq!(queue.push(3), PushOutcome::Enqueued);
    assert_eq!(queue.push(4), PushOutcome::EvictedOldest);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.evicted_count(), 1);

    collector.release(8);
    assert!(wait_until(Duration::from_secs(2), || collector.handled().len() == 3).await);
    assert_eq!(collector.handled(), vec![1, 3, 4]);
    queue.stop().await;
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Tests start reports false when already running.
#[tokio::test]
async fn start_is_idempotent() {
    let queue = queue(4);
    assert!(queue.start(Collector::open()));
    assert!(!queue.start(Collector::open()));
    queue.stop().await;
    queue.stop().await;
    assert!(!queue.is_running());
}

/// Tests stop discards pending messages.
#[tokio::test]
async fn stop_discards_pending_messages() {
    let queue = queue(8);
    let collector = Collector::gated();
    queue.start(collector.clone());

    queue.push(1);
    assert!(wait_until(Duration::from_secs(2), || queue.is_empty()).await);
    queue.push(2);
    queue.push(3);
    assert_eq!(queue.len(), 2);

    collector.release(1);
    queue.stop().await;

    assert!(queue.is_empty());
    assert_eq!(collector.handled(), vec![1]);
    assert_eq!(queue.push(4), PushOutcome::Stopped);
}

/// Tests a stopped queue can be restarted.
#[tokio::test]
async fn queue_can_restart() {
    let queue = queue(4);
    queue.start(Collector::open());
    queue.stop().await;

    let collector = Collector::open();
    assert!(queue.start(collector.clone()));
    queue.push(9);
    assert!(wait_until(Duration::from_secs(2), || collector.handled() == vec![9]).await);
    queue.stop().await;
}
