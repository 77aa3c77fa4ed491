//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunable engine parameters. Every field has a default, so partial JSON
/// documents deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Length of the master volume ramp used by `set_volume`.
    pub volume_ramp_ms: f64,
    /// Step duration used when a sequence is started without one.
    pub default_step_ms: u64,
    /// Amplitude modulation depth of the pulse modulator [0, 1].
    pub pulse_depth: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 44100.0,
            volume_ramp_ms: 100.0,
            default_step_ms: 5000,
            pulse_depth: 0.8,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        EngineConfig {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn default_step(&self) -> Duration {
        Duration::from_millis(self.default_step_ms)
    }

    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
