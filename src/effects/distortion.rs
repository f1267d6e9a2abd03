use super::{Effect, FilteringMode};
use crate::audio::signal::peak;
use crate::audio::SignalBuffer;
use crate::dsp::BiquadFilter;

/// Cutoff of the DC blocker that follows the tube stage
const TUBE_DC_CUTOFF_HZ: f32 = 20.0;

/// Mix the shaped signal with the dry one, matching levels to the input peak
fn mix_and_normalize(dry: &[f32], shaped: Vec<f32>, mix: f32, input_peak: f32) -> Vec<f32> {
    let shaped_peak = peak(&shaped);
    let wet_scale = if shaped_peak > 0.0 { input_peak / shaped_peak } else { 0.0 };

    let mut out: Vec<f32> = dry
        .iter()
        .zip(shaped)
        .map(|(&x, z)| mix * z * wet_scale + (1.0 - mix) * x)
        .collect();

    let out_peak = peak(&out);
    if out_peak > 0.0 {
        let scale = input_peak / out_peak;
        for s in out.iter_mut() {
            *s *= scale;
        }
    }
    out
}

/// Exponential waveshaping distortion
///
/// Parameters:
/// - gain: input gain applied to the peak-normalised signal
/// - mix: 0.0 = dry only, 1.0 = distorted only
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionEffect {
    pub gain: f32,
    pub mix: f32,
}

impl DistortionEffect {
    pub fn new(gain: f32, mix: f32) -> Self {
        Self { gain, mix }
    }
}

impl Effect for DistortionEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        let input_peak = signal.peak();
        if input_peak == 0.0 {
            return signal.clone();
        }

        let shaped = signal
            .samples()
            .iter()
            .map(|&x| {
                let q = x * self.gain / input_peak;
                q.signum() * (1.0 - (-q.abs()).exp())
            })
            .collect();

        signal.with_samples(mix_and_normalize(signal.samples(), shaped, self.mix, input_peak))
    }

    fn name(&self) -> &str {
        "Distortion"
    }
}

/// Tube-style asymmetric distortion
///
/// Parameters:
/// - gain, mix: as for [`DistortionEffect`]
/// - resonance: work point of the tube curve (negative values add even harmonics)
/// - drive: curve sharpness; must be positive
#[derive(Debug, Clone, PartialEq)]
pub struct TubeDistortionEffect {
    pub gain: f32,
    pub mix: f32,
    pub resonance: f32,
    pub drive: f32,
}

impl TubeDistortionEffect {
    pub fn new(gain: f32, mix: f32, resonance: f32, drive: f32) -> Self {
        Self {
            gain,
            mix,
            resonance,
            drive,
        }
    }

    /// Tube transfer curve, with its removable singularity at z == resonance
    fn shape(&self, z: f64) -> f64 {
        let q = self.resonance as f64;
        let dist = self.drive as f64;
        let offset = if q == 0.0 { 0.0 } else { q / (1.0 - (dist * q).exp()) };

        let d = z - q;
        if d.abs() < 1e-9 {
            1.0 / dist + offset
        } else {
            d / (1.0 - (-dist * d).exp()) + offset
        }
    }
}

impl Effect for TubeDistortionEffect {
    fn apply(&self, signal: &SignalBuffer, _mode: FilteringMode) -> SignalBuffer {
        let input_peak = signal.peak();
        if input_peak == 0.0 {
            return signal.clone();
        }

        let shaped = signal
            .samples()
            .iter()
            .map(|&x| {
                let z = (x * self.gain / input_peak) as f64;
                self.shape(z) as f32
            })
            .collect();

        let mut out = mix_and_normalize(signal.samples(), shaped, self.mix, input_peak);

        // The curve's offset leaves a DC component behind
        let mut dc_block =
            BiquadFilter::highpass(TUBE_DC_CUTOFF_HZ, 0.707, signal.sample_rate() as f32);
        dc_block.process_buffer(&mut out);

        signal.with_samples(out)
    }

    fn name(&self) -> &str {
        "TubeDistortion"
    }
}
