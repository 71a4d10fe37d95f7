// crates/hexatrack-core/src/model.rs
// ============================================================================
// Module: Legacy Model Path
// Description: Compatibility re-exports of the canonical track messages.
// Purpose: Keep `hexatrack_core::model::*` imports compiling.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Track messages used to live under `model`. Their canonical home is now
//! [`crate::ports`]; this module forwards to it so both paths name the same
//! types.

pub use crate::ports::DelayCalcTrackData;
pub use crate::ports::Ecef;
pub use crate::ports::ExtrapTrackData;
pub use crate::ports::FinalCalcTrackData;
pub use crate::ports::TrackData;
