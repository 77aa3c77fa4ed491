//! Output graph — sample rate, master bus and frame clock.

use crate::config::EngineConfig;
use crate::error::EngineError;

use super::mixer::Mixer;

/// Lowest sample rate an output graph accepts, in Hz.
pub const MIN_SAMPLE_RATE: f64 = 3000.0;
/// Highest sample rate an output graph accepts, in Hz.
pub const MAX_SAMPLE_RATE: f64 = 768000.0;

/// The audio destination the engine renders into.
#[derive(Debug, Clone)]
pub struct OutputGraph {
    sample_rate: f64,
    pub mixer: Mixer,
    /// Frames rendered since the graph was acquired.
    frame: u64,
}

impl OutputGraph {
    /// Acquire a graph for the configured sample rate. The master gain
    /// starts at unity, like a fresh gain node.
    pub fn acquire(config: &EngineConfig) -> Result<Self, EngineError> {
        let sr = config.sample_rate;
        if !sr.is_finite() || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sr) {
            return Err(EngineError::UnsupportedSampleRate(sr));
        }
        Ok(OutputGraph {
            sample_rate: sr,
            mixer: Mixer::new(1.0),
            frame: 0,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current position of the frame clock.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Convert milliseconds to a frame count, rounding to the nearest frame.
    pub fn ms_to_frames(&self, ms: f64) -> u64 {
        (ms.max(0.0) * self.sample_rate / 1000.0).round() as u64
    }

    /// Close the current frame on the master bus and advance the clock.
    pub fn take_frame(&mut self) -> (f32, f32) {
        self.frame += 1;
        self.mixer.take_frame()
    }
}
