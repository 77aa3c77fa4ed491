//! Sine tone generator.

use std::f64::consts::PI;

use crate::error::GeneratorError;

/// A phase-accumulating sine oscillator that can be stopped exactly once.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub frequency: f64,
    phase: f64,
    sample_rate: f64,
    running: bool,
}

impl Oscillator {
    pub fn new(frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            frequency,
            phase: 0.0,
            sample_rate,
            running: true,
        }
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample. A stopped oscillator is silent.
    pub fn next_sample(&mut self) -> f64 {
        if !self.running {
            return 0.0;
        }

        let sample = (2.0 * PI * self.phase).sin();

        self.phase += self.phase_inc();
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        } else if self.phase < 0.0 {
            // negative frequencies run the phase backwards
            self.phase += 1.0;
        }

        sample
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the oscillator. Stopping twice is an error the caller may ignore.
    pub fn stop(&mut self) -> Result<(), GeneratorError> {
        if !self.running {
            return Err(GeneratorError::AlreadyStopped);
        }
        self.running = false;
        Ok(())
    }
}
