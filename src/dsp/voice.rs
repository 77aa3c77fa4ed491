//! Voice — one sounding sine, optionally panned — and the pulse modulator.

use crate::error::GeneratorError;

use super::oscillator::Oscillator;
use super::panner::Panner;

/// A single sine generator routed either through a pan node or straight to
/// the master bus (up-mixed to both channels).
#[derive(Debug, Clone)]
pub struct Voice {
    pub oscillator: Oscillator,
    pub panner: Option<Panner>,
}

/// Observable snapshot of a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    pub frequency: f64,
    /// `None` for an unpanned (centered, up-mixed) voice.
    pub pan: Option<f64>,
}

impl Voice {
    pub fn centered(frequency: f64, sample_rate: f64) -> Self {
        Voice {
            oscillator: Oscillator::new(frequency, sample_rate),
            panner: None,
        }
    }

    pub fn panned(frequency: f64, pan: f64, sample_rate: f64) -> Self {
        Voice {
            oscillator: Oscillator::new(frequency, sample_rate),
            panner: Some(Panner::new(pan)),
        }
    }

    /// Generate the next stereo frame.
    pub fn next_frame(&mut self) -> (f64, f64) {
        let s = self.oscillator.next_sample();
        match &self.panner {
            Some(p) => p.process(s),
            None => (s, s),
        }
    }

    pub fn stop(&mut self) -> Result<(), GeneratorError> {
        self.oscillator.stop()
    }

    pub fn info(&self) -> VoiceInfo {
        VoiceInfo {
            frequency: self.oscillator.frequency,
            pan: self.panner.map(|p| p.pan()),
        }
    }
}

/// Low-frequency sine driving the amplitude of the carrier path.
///
/// Gain is `1 - depth * (1 - lfo) / 2`, so it swings between `1 - depth`
/// and 1 at the modulator rate.
#[derive(Debug, Clone)]
pub struct PulseModulator {
    lfo: Oscillator,
    depth: f64,
}

/// Observable snapshot of the pulse modulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseInfo {
    pub frequency: f64,
    pub depth: f64,
}

impl PulseModulator {
    pub fn new(frequency: f64, depth: f64, sample_rate: f64) -> Self {
        PulseModulator {
            lfo: Oscillator::new(frequency, sample_rate),
            depth: depth.clamp(0.0, 1.0),
        }
    }

    /// Gain to apply to the current carrier sample.
    pub fn next_gain(&mut self) -> f64 {
        let lfo = self.lfo.next_sample();
        1.0 - self.depth * (1.0 - lfo) / 2.0
    }

    pub fn stop(&mut self) -> Result<(), GeneratorError> {
        self.lfo.stop()
    }

    pub fn info(&self) -> PulseInfo {
        PulseInfo {
            frequency: self.lfo.frequency,
            depth: self.depth,
        }
    }
}
