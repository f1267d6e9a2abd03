use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;
use crate::dsp::{BiquadFilter, SineLfo};

const STAGES: usize = 2;
const WET: f32 = 0.5;

/// Cascade of all-pass stages swept by a sine LFO, mixed with the dry signal
///
/// The notches appear where the cascade's phase shift cancels the dry path.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaserEffect {
    pub lfo_frequency: f32,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub q: f32,
}

impl PhaserEffect {
    pub fn new(lfo_frequency: f32, min_frequency: f32, max_frequency: f32, q: f32) -> Self {
        Self {
            lfo_frequency,
            min_frequency,
            max_frequency,
            q,
        }
    }
}

impl Effect for PhaserEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        let sample_rate = signal.sample_rate() as f32;
        let mut lfo = SineLfo::new(self.lfo_frequency, signal.sample_rate());
        let mut stages = vec![BiquadFilter::new(); STAGES];

        let samples = signal
            .samples()
            .iter()
            .map(|&x| {
                let centre = lfo.sweep(self.min_frequency, self.max_frequency);
                let mut wet = x;
                for stage in stages.iter_mut() {
                    stage.set_allpass(centre, self.q, sample_rate);
                    wet = stage.process_sample(wet);
                }
                (1.0 - WET) * x + WET * wet
            })
            .collect();

        signal.with_samples(samples)
    }

    fn name(&self) -> &str {
        "Phaser"
    }
}
