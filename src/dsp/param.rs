//! Automatable gain parameter with instant sets and linear ramps.

/// A gain value that is either steady or moving linearly toward a target.
#[derive(Debug, Clone)]
pub struct GainParam {
    value: f64,
    target: f64,
    /// Per-sample increment while ramping.
    step: f64,
    /// Samples remaining in the current ramp.
    remaining: usize,
}

impl GainParam {
    pub fn new(value: f64) -> Self {
        GainParam {
            value,
            target: value,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Jump to `value` now, cancelling any ramp in progress.
    pub fn set(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Move from the current value to `target` over `samples` samples.
    pub fn ramp_to(&mut self, target: f64, samples: usize) {
        if samples == 0 {
            self.set(target);
            return;
        }
        self.target = target;
        self.step = (target - self.value) / samples as f64;
        self.remaining = samples;
    }

    /// Current value without advancing.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    /// Advance one sample and return the value to apply to it.
    pub fn next_sample(&mut self) -> f64 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.value = self.target;
            } else {
                self.value += self.step;
            }
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_immediate() {
        let mut g = GainParam::new(0.0);
        g.set(0.5);
        assert_eq!(g.next_sample(), 0.5);
        assert!(!g.is_ramping());
    }

    #[test]
    fn ramp_is_linear_and_lands_on_target() {
        let mut g = GainParam::new(0.0);
        g.ramp_to(1.0, 4);
        let values: Vec<f64> = (0..6).map(|_| g.next_sample()).collect();
        assert!((values[0] - 0.25).abs() < 1e-12);
        assert!((values[1] - 0.5).abs() < 1e-12);
        assert!((values[2] - 0.75).abs() < 1e-12);
        assert_eq!(values[3], 1.0);
        assert_eq!(values[5], 1.0);
    }

    #[test]
    fn ramp_starts_from_current_value() {
        let mut g = GainParam::new(0.0);
        g.ramp_to(1.0, 10);
        for _ in 0..5 {
            g.next_sample();
        }
        g.ramp_to(0.0, 5);
        let first = g.next_sample();
        assert!((first - 0.4).abs() < 1e-12, "got {first}");
    }

    #[test]
    fn zero_length_ramp_jumps() {
        let mut g = GainParam::new(0.2);
        g.ramp_to(0.9, 0);
        assert_eq!(g.value(), 0.9);
    }
}
