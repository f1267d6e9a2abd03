use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;
use crate::dsp::{BiquadFilter, SineLfo};

/// Band-pass filter whose centre frequency is swept by a sine LFO
///
/// Parameters:
/// - lfo_frequency: sweep rate in Hz
/// - min_frequency / max_frequency: sweep bounds in Hz
/// - q: band-pass quality factor
#[derive(Debug, Clone, PartialEq)]
pub struct WahWahEffect {
    pub lfo_frequency: f32,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub q: f32,
}

impl WahWahEffect {
    pub fn new(lfo_frequency: f32, min_frequency: f32, max_frequency: f32, q: f32) -> Self {
        Self {
            lfo_frequency,
            min_frequency,
            max_frequency,
            q,
        }
    }
}

impl Effect for WahWahEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        let sample_rate = signal.sample_rate() as f32;
        let mut lfo = SineLfo::new(self.lfo_frequency, signal.sample_rate());
        let mut filter = BiquadFilter::new();

        let samples = signal
            .samples()
            .iter()
            .map(|&x| {
                let centre = lfo.sweep(self.min_frequency, self.max_frequency);
                filter.set_bandpass(centre, self.q, sample_rate);
                filter.process_sample(x)
            })
            .collect();

        signal.with_samples(samples)
    }

    fn name(&self) -> &str {
        "WahWah"
    }
}
