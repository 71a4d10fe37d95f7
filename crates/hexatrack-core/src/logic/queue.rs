// crates/hexatrack-core/src/logic/queue.rs
// ============================================================================
// Module: Event Queue
// Description: Bounded drop-oldest queue drained by a dedicated worker task.
// Purpose: Decouple receive loops from domain processing latency.
// Dependencies: async-trait, tokio, tracing
// ============================================================================

//! ## Overview
//! Producers push without blocking; a single worker task pops messages in
//! FIFO order and hands them to a [`QueueHandler`]. When the queue is full the
//! oldest message is evicted so fresh track state always wins.
//! Invariants:
//! - The queue never holds more than `capacity` messages.
//! - Messages are handled outside the queue lock, one at a time.
//! - The worker re-checks the running flag at least every `wait` interval.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::LogicError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default queue capacity.
pub const MAX_QUEUE_SIZE: usize = 500;
/// Default worker wait before re-checking the running flag.
pub const QUEUE_WAIT_TIMEOUT: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Processes messages popped by the queue worker.
#[async_trait]
pub trait QueueHandler<M>: Send + Sync {
    /// Handles one message.
    async fn handle(&self, message: M);
}

/// Result of pushing onto an [`EventQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Message was enqueued.
    Enqueued,
    /// Message was enqueued after evicting the oldest entry.
    EvictedOldest,
    /// Queue is stopped; the message was discarded.
    Stopped,
}

// ============================================================================
// SECTION: Event Queue
// ============================================================================

/// State shared between producers and the worker task.
struct Shared<M> {
    /// Pending messages, oldest first.
    queue: Mutex<VecDeque<M>>,
    /// Wakes the worker on push and stop.
    notify: Notify,
    /// Worker keeps draining while set.
    running: AtomicBool,
    /// Maximum number of pending messages.
    capacity: usize,
    /// Worker idle wait.
    wait: Duration,
    /// Messages evicted because the queue was full.
    evicted: AtomicU64,
}

impl<M> Shared<M> {
    /// Pops the oldest pending message.
    fn pop(&self) -> Option<M> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }
}

/// Bounded drop-oldest queue with a dedicated worker task.
pub struct EventQueue<M> {
    /// Name used in log records.
    name: String,
    /// Producer/worker shared state.
    shared: Arc<Shared<M>>,
    /// Worker task handle while running.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<M: Send + 'static> EventQueue<M> {
    /// Creates a stopped queue.
    ///
    /// # Errors
    ///
    /// Returns [`LogicError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(name: impl Into<String>, capacity: usize, wait: Duration) -> Result<Self, LogicError> {
        if capacity == 0 {
            return Err(LogicError::InvalidCapacity("event queue"));
        }
        Ok(Self {
            name: name.into(),
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::with_capacity(capacity)),
                notify: Notify::new(),
                running: AtomicBool::new(false),
                capacity,
                wait: if wait.is_zero() { QUEUE_WAIT_TIMEOUT } else { wait },
                evicted: AtomicU64::new(0),
            }),
            worker: Mutex::new(None),
        })
    }

    /// Starts the worker task. Returns false if it was already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, handler: Arc<dyn QueueHandler<M>>) -> bool {
        if self.shared.running.swap(true, Ordering::AcqRel) {
            tracing::warn!(queue = %self.name, "event queue already running");
            return false;
        }
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        let handle = tokio::spawn(async move {
            tracing::debug!(queue = %name, "event queue worker started");
            while shared.running.load(Ordering::Acquire) {
                match shared.pop() {
                    Some(message) => handler.handle(message).await,
                    None => {
                        let _ = tokio::time::timeout(shared.wait, shared.notify.notified()).await;
                    }
                }
            }
            tracing::debug!(queue = %name, "event queue worker stopped");
        });
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        tracing::info!(queue = %self.name, capacity = self.shared.capacity, "event queue started");
        true
    }

    /// Stops the worker, waits for it to exit, and discards pending messages.
    pub async fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.shared.notify.notify_one();
        let handle = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::error!(queue = %self.name, error = %err, "event queue worker failed");
            }
        }
        self.shared.queue.lock().unwrap_or_else(PoisonError::into_inner).clear();
        tracing::info!(queue = %self.name, "event queue stopped");
    }

    /// Enqueues a message, evicting the oldest entry when full.
    pub fn push(&self, message: M) -> PushOutcome {
        if !self.is_running() {
            return PushOutcome::Stopped;
        }
        let outcome = {
            let mut queue = self.shared.queue.lock().unwrap_or_else(PoisonError::into_inner);
            let outcome = if queue.len() >= self.shared.capacity {
                queue.pop_front();
                self.shared.evicted.fetch_add(1, Ordering::Relaxed);
                PushOutcome::EvictedOldest
            } else {
                PushOutcome::Enqueued
            };
            queue.push_back(message);
            outcome
        };
        self.shared.notify.notify_one();
        outcome
    }

    /// Returns true while the worker is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Returns the number of pending messages.
    pub fn len(&self) -> usize {
        self.shared.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns how many messages were evicted because the queue was full.
    pub fn evicted_count(&self) -> u64 {
        self.shared.evicted.load(Ordering::Relaxed)
    }

    /// Returns the queue name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
