use std::f32::consts::PI;

use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;

/// Amplitude modulation by a cosine LFO
///
/// Parameters:
/// - frequency: modulation rate in Hz
/// - index: modulation depth (0.0 = no effect, 1.0 = full)
#[derive(Debug, Clone, PartialEq)]
pub struct TremoloEffect {
    pub frequency: f32,
    pub index: f32,
}

impl TremoloEffect {
    pub fn new(frequency: f32, index: f32) -> Self {
        Self { frequency, index }
    }
}

impl Effect for TremoloEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        let omega = 2.0 * PI * self.frequency / signal.sample_rate() as f32;

        let samples = signal
            .samples()
            .iter()
            .enumerate()
            .map(|(n, &x)| {
                let gain = 1.0 - self.index * 0.5 * (1.0 - (omega * n as f32).cos());
                x * gain
            })
            .collect();

        signal.with_samples(samples)
    }

    fn name(&self) -> &str {
        "Tremolo"
    }
}
