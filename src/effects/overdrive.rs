use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;

/// Symmetric soft clipping
///
/// Linear below 1/3, quadratic knee up to 2/3, then saturates at ±1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverdriveEffect;

impl OverdriveEffect {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn shape(x: f32) -> f32 {
        let a = x.abs();
        if a < 1.0 / 3.0 {
            2.0 * x
        } else if a < 2.0 / 3.0 {
            x.signum() * (3.0 - (2.0 - 3.0 * a).powi(2)) / 3.0
        } else {
            x.signum()
        }
    }
}

impl Effect for OverdriveEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        signal.with_samples(signal.samples().iter().map(|&x| Self::shape(x)).collect())
    }

    fn name(&self) -> &str {
        "Overdrive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_is_continuous() {
        let below = OverdriveEffect::shape(1.0 / 3.0 - 1e-4);
        let above = OverdriveEffect::shape(1.0 / 3.0 + 1e-4);
        assert!((below - above).abs() < 1e-2);

        let below = OverdriveEffect::shape(2.0 / 3.0 - 1e-4);
        let above = OverdriveEffect::shape(2.0 / 3.0 + 1e-4);
        assert!((below - above).abs() < 1e-2);
    }

    #[test]
    fn test_output_is_bounded_and_odd() {
        for i in -100..=100 {
            let x = i as f32 / 50.0;
            let y = OverdriveEffect::shape(x);
            assert!(y.abs() <= 1.0);
            assert!((y + OverdriveEffect::shape(-x)).abs() < 1e-6);
        }
    }
}
