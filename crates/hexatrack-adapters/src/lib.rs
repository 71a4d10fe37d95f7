// crates/hexatrack-adapters/src/lib.rs
// ============================================================================
// Module: Hexatrack Adapters Library
// Description: Adapters binding domain ports to sockets and local sinks.
// Purpose: Run stage pipelines with a uniform start/stop lifecycle.
// Dependencies: hexatrack-core, hexatrack-transport, serde_json, tokio
// ============================================================================

//! ## Overview
//! Every adapter implements [`Adapter`]. Incoming adapters own a receive
//! task that decodes messages and submits them to an incoming port;
//! outgoing adapters implement [`hexatrack_core::OutgoingPort`] so domain
//! services can emit through them directly. [`MessagePipeline`] pairs one of
//! each and [`AdapterManager`] drives every pipeline of a stage.
//! Invariants:
//! - Outgoing adapters reject sends while stopped.
//! - A stopped socket adapter cannot be restarted; its socket is closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod error;
pub mod incoming;
pub mod jsonl;
pub mod outgoing;
pub mod pipeline;
pub mod statistics;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::Adapter;
pub use error::AdapterError;
pub use incoming::DishIncomingAdapter;
pub use jsonl::JsonLinesAdapter;
pub use outgoing::RadioOutgoingAdapter;
pub use pipeline::AdapterManager;
pub use pipeline::MessagePipeline;
pub use statistics::DelayStatisticsAdapter;
pub use statistics::MovingAverage;
