// crates/hexatrack-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example spells out every setting with its default value, using the
//! production multicast profile.

/// Returns a canonical example `hexatrack.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"environment = "production"

[logging]
level = "info"
format = "text"

[network]
receive_timeout_ms = 100
linger_ms = 0
receive_buffer = 1000

[pipeline]
queue_capacity = 500
queue_wait_ms = 100
input_frequency_hz = 8.0
output_frequency_hz = 100.0
emit_interval_ms = 10
moving_average_window = 100
statistics_queue_capacity = 200

[channels.track_data]
endpoint = "udp://239.1.1.1:9000"
group = "TrackData"

[channels.extrap_track_data]
endpoint = "udp://239.1.1.2:9001"
group = "ExtrapTrackData"

[channels.delay_calc_track_data]
endpoint = "udp://239.1.1.5:9595"
group = "DelayCalcTrackData"

[channels.final_calc_track_data]
endpoint = "udp://239.1.1.5:9597"
group = "FinalCalcTrackData"
"#,
    )
}
