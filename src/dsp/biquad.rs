use std::f32::consts::PI;

/// Biquad filter implementation (2-pole IIR filter)
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// Coefficients follow the RBJ audio EQ cookbook. The swept effects
/// (wah-wah, phaser) retune the same filter every sample, so the `set_*`
/// methods leave the delay line untouched.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Transposed direct form II state
    z1: f32,
    z2: f32,
}

impl BiquadFilter {
    /// Create a new biquad filter with unity gain (pass-through)
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Create a band-pass filter with 0 dB peak gain
    pub fn bandpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new();
        filter.set_bandpass(frequency, q, sample_rate);
        filter
    }

    /// Create a second-order all-pass filter
    pub fn allpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new();
        filter.set_allpass(frequency, q, sample_rate);
        filter
    }

    /// Create a highpass filter
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new();
        filter.set_highpass(frequency, q, sample_rate);
        filter
    }

    /// Set coefficients for a band-pass filter (constant 0 dB peak gain)
    pub fn set_bandpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let (cos_omega, alpha) = Self::prewarp(frequency, q, sample_rate);

        let a0 = 1.0 + alpha;
        self.b0 = alpha / a0;
        self.b1 = 0.0;
        self.b2 = -alpha / a0;
        self.a1 = (-2.0 * cos_omega) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Set coefficients for an all-pass filter
    pub fn set_allpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let (cos_omega, alpha) = Self::prewarp(frequency, q, sample_rate);

        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - alpha) / a0;
        self.b1 = (-2.0 * cos_omega) / a0;
        self.b2 = (1.0 + alpha) / a0;
        self.a1 = (-2.0 * cos_omega) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Set coefficients for a highpass filter
    pub fn set_highpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let (cos_omega, alpha) = Self::prewarp(frequency, q, sample_rate);

        let a0 = 1.0 + alpha;
        self.b0 = ((1.0 + cos_omega) / 2.0) / a0;
        self.b1 = -(1.0 + cos_omega) / a0;
        self.b2 = ((1.0 + cos_omega) / 2.0) / a0;
        self.a1 = (-2.0 * cos_omega) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    /// Keep the center frequency strictly inside (0, Nyquist)
    ///
    /// The 1 Hz floor gives way to the Nyquist ceiling at very low rates.
    fn prewarp(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
        let nyquist = sample_rate * 0.5;
        let frequency = frequency.max(1.0).min(nyquist * 0.99);
        let omega = 2.0 * PI * frequency / sample_rate;
        let alpha = omega.sin() / (2.0 * q.max(1e-3));
        (omega.cos(), alpha)
    }

    /// Process a single sample
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Filter a whole buffer in place
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset filter state (clear delay lines)
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

impl Default for BiquadFilter {
    fn default() -> Self {
        Self::new()
    }
}
