//! Mixer — stereo master bus with a ramped master gain.

use super::param::GainParam;

/// Accumulates one stereo frame at a time and applies the master gain.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: GainParam,
    left: f64,
    right: f64,
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain: GainParam::new(master_gain),
            left: 0.0,
            right: 0.0,
        }
    }

    /// Add a stereo contribution to the current frame.
    pub fn add(&mut self, left: f64, right: f64) {
        self.left += left;
        self.right += right;
    }

    /// Finish the current frame: apply master gain, limit, and reset.
    ///
    /// The master gain advances even when nothing was added, so ramps keep
    /// time while the bus is silent.
    pub fn take_frame(&mut self) -> (f32, f32) {
        let gain = self.master_gain.next_sample();
        let frame = (
            hard_clip(self.left * gain) as f32,
            hard_clip(self.right * gain) as f32,
        );
        self.left = 0.0;
        self.right = 0.0;
        frame
    }
}

/// Limit to the [-1, 1] range of the output device.
fn hard_clip(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}
