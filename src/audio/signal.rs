use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Min/max pair summarising one column of a waveform panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformPeak {
    pub min: f32,
    pub max: f32,
}

/// A complete mono recording held in memory.
///
/// Buffers are never mutated once built; effects and the time-stretch
/// operation always produce a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SignalBuffer {
    /// Create a buffer, rejecting a zero sample rate
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSignal(
                "sample rate must be positive".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a sibling buffer with the same sample rate
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value (0.0 for an empty buffer)
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }

    /// Downsample to `target_peaks` min/max columns for drawing
    pub fn waveform_overview(&self, target_peaks: usize) -> Vec<WaveformPeak> {
        if self.samples.is_empty() || target_peaks == 0 {
            return Vec::new();
        }

        let per_peak = (self.samples.len() / target_peaks).max(1);

        self.samples
            .chunks(per_peak)
            .map(|chunk| {
                let (min, max) = chunk
                    .iter()
                    .fold((0.0f32, 0.0f32), |(lo, hi), &s| (lo.min(s), hi.max(s)));
                WaveformPeak { min, max }
            })
            .collect()
    }
}

impl AsRef<[f32]> for SignalBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

pub(crate) fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}
