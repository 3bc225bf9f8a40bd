use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// Tunables shared by the event recorder and the playback loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_interval: f64,   // s, playback step used by drivers
    pub liftoff_delay: f64,   // s after ignition, capped at burnout
    pub ejection_delay: f64,  // s after apogee, capped at landing
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: 0.1,
            liftoff_delay: 0.2,
            ejection_delay: 0.3,
        }
    }
}
