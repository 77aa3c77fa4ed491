//! Equal-power stereo panner for mono sources.

use std::f64::consts::FRAC_PI_2;

/// Hard left.
pub const LEFT: f64 = -1.0;
/// Hard right.
pub const RIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panner {
    pan: f64,
    gain_l: f64,
    gain_r: f64,
}

impl Panner {
    /// `pan` runs from -1 (left) to +1 (right); out-of-range values are clamped.
    pub fn new(pan: f64) -> Self {
        let pan = pan.clamp(LEFT, RIGHT);
        let x = (pan + 1.0) / 2.0;
        Panner {
            pan,
            gain_l: (x * FRAC_PI_2).cos(),
            gain_r: (x * FRAC_PI_2).sin(),
        }
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn process(&self, sample: f64) -> (f64, f64) {
        (sample * self.gain_l, sample * self.gain_r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_left_silences_right() {
        let (l, r) = Panner::new(LEFT).process(1.0);
        assert!((l - 1.0).abs() < 1e-12);
        assert!(r.abs() < 1e-12);
    }

    #[test]
    fn hard_right_silences_left() {
        let (l, r) = Panner::new(RIGHT).process(1.0);
        assert!(l.abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn center_is_equal_power() {
        let (l, r) = Panner::new(0.0).process(1.0);
        assert!((l - r).abs() < 1e-12);
        assert!((l * l + r * r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamps_out_of_range_pan() {
        assert_eq!(Panner::new(-3.0).pan(), LEFT);
    }
}
