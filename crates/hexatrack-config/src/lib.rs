// crates/hexatrack-config/src/lib.rs
// ============================================================================
// Module: Hexatrack Config Library
// Description: Canonical config model, profiles, and validation.
// Purpose: Single source of truth for hexatrack.toml semantics.
// Dependencies: hexatrack-transport, serde, toml
// ============================================================================

//! ## Overview
//! `hexatrack-config` defines the configuration shared by every pipeline
//! stage: logging, socket tuning, pipeline rates and queue sizes, and the
//! four message channels. Unset channels resolve from the selected network
//! profile (development unicast or production multicast).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
