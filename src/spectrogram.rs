//! Short-time power spectra for the signal panels.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_FRAME_SIZE: usize = 256;
pub const DEFAULT_FFT_SIZE: usize = 256;
pub const DEFAULT_HOP_SIZE: usize = 256;

/// Time-frequency power grid, `num_frames` rows of `num_bins` values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrogram {
    num_frames: usize,
    num_bins: usize,
    power: Vec<f32>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Power spectrum of one frame
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        if index >= self.num_frames {
            return None;
        }
        let start = index * self.num_bins;
        Some(&self.power[start..start + self.num_bins])
    }

    pub fn get(&self, frame: usize, bin: usize) -> Option<f32> {
        if bin >= self.num_bins {
            return None;
        }
        self.frame(frame).map(|f| f[bin])
    }

    /// Largest value in the grid (0.0 when empty)
    pub fn max_power(&self) -> f32 {
        self.power.iter().fold(0.0f32, |acc, &p| acc.max(p))
    }
}

/// Fixed-configuration short-time Fourier transform
pub struct Stft {
    frame_size: usize,
    fft_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl Stft {
    /// `frame_size` samples are windowed and zero-padded to `fft_size`
    pub fn new(frame_size: usize, fft_size: usize, hop_size: usize) -> Result<Self> {
        if frame_size == 0 || hop_size == 0 || fft_size < frame_size {
            return Err(Error::Fft(format!(
                "invalid STFT configuration: frame {}, fft {}, hop {}",
                frame_size, fft_size, hop_size
            )));
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            frame_size,
            fft_size,
            hop_size,
            window: hann(frame_size),
            fft,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Power spectrogram of a whole buffer
    ///
    /// Frames start every `hop_size` samples; the last one is zero-padded.
    pub fn spectrogram<S: AsRef<[f32]> + ?Sized>(&self, samples: &S) -> Result<Spectrogram> {
        let x = samples.as_ref();
        let num_bins = self.fft_size / 2 + 1;
        let num_frames = (x.len() + self.hop_size - 1) / self.hop_size;

        let mut power = Vec::with_capacity(num_frames * num_bins);
        let mut frame = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut scratch = self.fft.make_scratch_vec();

        for i in 0..num_frames {
            let start = i * self.hop_size;
            let end = (start + self.frame_size).min(x.len());

            frame.iter_mut().for_each(|s| *s = 0.0);
            for (j, (&s, &w)) in x[start..end].iter().zip(&self.window).enumerate() {
                frame[j] = s * w;
            }

            self.fft
                .process_with_scratch(&mut frame, &mut spectrum, &mut scratch)
                .map_err(|e| Error::Fft(e.to_string()))?;
            power.extend(spectrum.iter().map(|c| c.norm_sqr()));
        }

        Ok(Spectrogram {
            num_frames,
            num_bins,
            power,
        })
    }
}

impl Default for Stft {
    fn default() -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            fft_size: DEFAULT_FFT_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            window: hann(DEFAULT_FRAME_SIZE),
            fft: planner.plan_fft_forward(DEFAULT_FFT_SIZE),
        }
    }
}

impl fmt::Debug for Stft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stft")
            .field("frame_size", &self.frame_size)
            .field("fft_size", &self.fft_size)
            .field("hop_size", &self.hop_size)
            .finish()
    }
}

/// Periodic Hann window
fn hann(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SignalBuffer;

    #[test]
    fn test_grid_shape() {
        let stft = Stft::default();
        let grid = stft.spectrogram(&vec![0.1f32; 44100]).unwrap();
        assert_eq!(grid.num_frames(), 173);
        assert_eq!(grid.num_bins(), 129);

        let grid = stft.spectrogram(&vec![0.1f32; 512]).unwrap();
        assert_eq!(grid.num_frames(), 2);
    }

    #[test]
    fn test_empty_input() {
        let grid = Stft::default().spectrogram(&Vec::<f32>::new()).unwrap();
        assert_eq!(grid.num_frames(), 0);
        assert!(grid.frame(0).is_none());
        assert_eq!(grid.max_power(), 0.0);
    }

    #[test]
    fn test_deterministic() {
        let samples: Vec<f32> = (0..3000).map(|i| ((i * 7919) % 1000) as f32 / 1000.0 - 0.5).collect();
        let signal = SignalBuffer::new(samples, 16000).unwrap();
        let stft = Stft::default();
        assert_eq!(stft.spectrogram(&signal).unwrap(), stft.spectrogram(&signal).unwrap());
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        // Bin 32 of a 256-point FFT at 8 kHz is 1 kHz
        let samples: Vec<f32> = (0..2048)
            .map(|n| (2.0 * PI * 1000.0 * n as f32 / 8000.0).sin())
            .collect();
        let grid = Stft::default().spectrogram(&samples).unwrap();

        let frame = grid.frame(3).unwrap();
        let peak_bin = frame
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &p)| if p > best.1 { (i, p) } else { best })
            .0;
        assert_eq!(peak_bin, 32);
        assert_eq!(grid.get(3, 32), Some(frame[32]));
        assert!(grid.get(3, 129).is_none());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Stft::new(256, 128, 256).is_err());
        assert!(Stft::new(256, 256, 0).is_err());
        assert!(Stft::new(128, 256, 64).is_ok());
    }
}
