use std::f32::consts::PI;

/// Sine low-frequency oscillator producing values in [0, 1]
#[derive(Debug, Clone)]
pub struct SineLfo {
    phase: f32,
    increment: f32,
}

impl SineLfo {
    /// `frequency` in Hz; the first value is taken at phase 0
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            increment: frequency / sample_rate as f32,
        }
    }

    /// Current value, then advance by one sample
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let value = (self.phase * 2.0 * PI).sin() * 0.5 + 0.5;
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    /// Map the next LFO value onto [min, max]
    #[inline]
    pub fn sweep(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_value()
    }
}
