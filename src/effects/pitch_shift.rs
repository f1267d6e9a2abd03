use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;
use crate::dsp::{resample_linear, wsola_stretch};

/// Analysis window for WSOLA, in seconds
pub(crate) const WSOLA_WINDOW_SECONDS: f32 = 0.025;

/// Even-length WSOLA window for a sample rate
pub(crate) fn wsola_window(sample_rate: u32) -> usize {
    let size = (sample_rate as f32 * WSOLA_WINDOW_SECONDS).round() as usize;
    (size.max(4) / 2) * 2
}

/// Pitch shift that keeps the duration
///
/// Stretches by `shift` with WSOLA, then resamples back to the input length,
/// so every frequency is multiplied by `shift`.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchShiftEffect {
    pub shift: f32,
}

impl PitchShiftEffect {
    pub fn new(shift: f32) -> Self {
        Self { shift }
    }
}

impl Effect for PitchShiftEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        if signal.is_empty() {
            return signal.with_samples(Vec::new());
        }

        let window = wsola_window(signal.sample_rate());
        let stretched = wsola_stretch(signal.samples(), self.shift as f64, window);
        signal.with_samples(resample_linear(&stretched, signal.len()))
    }

    fn name(&self) -> &str {
        "PitchShift"
    }
}
