use super::{Effect, FilteringMode};
use crate::audio::SignalBuffer;
use crate::dsp::fft_convolve;

/// Delay lines at least this long are cheaper to run through the FFT
const FFT_MIN_DELAY_SAMPLES: usize = 64;

fn delay_samples(delay_time: f32, sample_rate: u32) -> usize {
    (delay_time.max(0.0) * sample_rate as f32).round() as usize
}

/// Feedback echo: y[n] = x[n] + decay * y[n - D]
///
/// Parameters:
/// - delay_time: seconds between repeats
/// - decay: feedback gain per repeat
#[derive(Debug, Clone, PartialEq)]
pub struct EchoEffect {
    pub delay_time: f32,
    pub decay: f32,
}

impl EchoEffect {
    pub fn new(delay_time: f32, decay: f32) -> Self {
        Self { delay_time, decay }
    }
}

impl Effect for EchoEffect {
    fn apply(&self, signal: &SignalBuffer, mode: FilteringMode) -> SignalBuffer {
        if mode == FilteringMode::FrequencyDomain {
            log::debug!("Echo is recursive; running in the time domain");
        }

        // A zero-length feedback loop is undefined
        let delay = delay_samples(self.delay_time, signal.sample_rate()).max(1);
        let mut out = signal.samples().to_vec();
        for n in delay..out.len() {
            out[n] += self.decay * out[n - delay];
        }

        signal.with_samples(out)
    }

    fn name(&self) -> &str {
        "Echo"
    }
}

/// Feedforward delay: y[n] = x[n] + decay * x[n - D]
///
/// Parameters:
/// - delay_time: seconds between the dry signal and its copy
/// - decay: gain of the delayed copy
#[derive(Debug, Clone, PartialEq)]
pub struct DelayEffect {
    pub delay_time: f32,
    pub decay: f32,
}

impl DelayEffect {
    pub fn new(delay_time: f32, decay: f32) -> Self {
        Self { delay_time, decay }
    }

    fn apply_time_domain(&self, signal: &SignalBuffer, delay: usize) -> Vec<f32> {
        let x = signal.samples();
        x.iter()
            .enumerate()
            .map(|(n, &s)| {
                let delayed = if n >= delay { x[n - delay] } else { 0.0 };
                s + self.decay * delayed
            })
            .collect()
    }

    /// Caller keeps `delay` below the signal length
    fn kernel(&self, delay: usize) -> Vec<f32> {
        let mut kernel = vec![0.0f32; delay + 1];
        kernel[0] = 1.0;
        kernel[delay] += self.decay;
        kernel
    }
}

impl Effect for DelayEffect {
    fn apply(&self, signal: &SignalBuffer, mode: FilteringMode) -> SignalBuffer {
        let delay = delay_samples(self.delay_time, signal.sample_rate());

        // The delayed copy starts after the buffer ends
        if delay >= signal.len() {
            return signal.with_samples(signal.samples().to_vec());
        }

        let out = match mode.resolve(self.preferred_mode(signal.sample_rate())) {
            FilteringMode::FrequencyDomain => {
                match fft_convolve(signal.samples(), &self.kernel(delay)) {
                    Ok(out) => out,
                    Err(e) => {
                        log::warn!("FFT delay failed ({}), falling back to time domain", e);
                        self.apply_time_domain(signal, delay)
                    }
                }
            }
            _ => self.apply_time_domain(signal, delay),
        };

        signal.with_samples(out)
    }

    fn name(&self) -> &str {
        "Delay"
    }

    fn preferred_mode(&self, sample_rate: u32) -> FilteringMode {
        if delay_samples(self.delay_time, sample_rate) >= FFT_MIN_DELAY_SAMPLES {
            FilteringMode::FrequencyDomain
        } else {
            FilteringMode::TimeDomain
        }
    }
}
