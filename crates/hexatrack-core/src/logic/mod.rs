// crates/hexatrack-core/src/logic/mod.rs
// ============================================================================
// Module: Hexatrack Domain Logic
// Description: Stage services for the A, B, and C hexagons.
// Purpose: Group the latency pipeline computations behind port traits.
// Dependencies: async-trait, tokio, tracing
// ============================================================================

//! ## Overview
//! One service per stage, plus the shared [`EventQueue`] used by the queued
//! services. Services depend only on ports, clocks, and metrics sinks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod calculator;
pub mod extrapolator;
pub mod final_calc;
pub mod process_track;
pub mod queue;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use calculator::CalculatorService;
pub use calculator::DelayCalculator;
pub use calculator::time_delta;
pub use extrapolator::ExtrapolationSchedule;
pub use extrapolator::TrackDataExtrapolator;
pub use extrapolator::extrapolate_at;
pub use final_calc::FinalCalculationService;
pub use final_calc::TargetStatisticService;
pub use process_track::ProcessTrackUseCase;
pub use queue::EventQueue;
pub use queue::MAX_QUEUE_SIZE;
pub use queue::PushOutcome;
pub use queue::QUEUE_WAIT_TIMEOUT;
pub use queue::QueueHandler;
