//! Frequency-domain FIR filtering (overlap-add with realfft).

use num_complex::Complex;
use realfft::RealFftPlanner;

use crate::error::{Error, Result};

fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Convolve `signal` with `kernel`, keeping the first `signal.len()` outputs.
///
/// Matches a direct-form FIR run over the same input up to float rounding.
pub fn fft_convolve(signal: &[f32], kernel: &[f32]) -> Result<Vec<f32>> {
    let n = signal.len();
    let mut output = vec![0.0f32; n];
    if n == 0 || kernel.is_empty() {
        return Ok(output);
    }

    let m = kernel.len();
    let fft_size = next_pow2(2 * m).max(1024);
    let block = fft_size - m + 1;

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);
    let fft_err = |e: realfft::FftError| Error::Fft(e.to_string());

    // Kernel spectrum is shared by every block
    let mut kernel_buf = fft.make_input_vec();
    kernel_buf[..m].copy_from_slice(kernel);
    let mut kernel_spec = fft.make_output_vec();
    fft.process(&mut kernel_buf, &mut kernel_spec).map_err(fft_err)?;

    let mut time_buf = fft.make_input_vec();
    let mut spec: Vec<Complex<f32>> = fft.make_output_vec();
    let mut result = ifft.make_output_vec();
    let norm = 1.0 / fft_size as f32;

    for start in (0..n).step_by(block) {
        let end = (start + block).min(n);

        time_buf.fill(0.0);
        time_buf[..end - start].copy_from_slice(&signal[start..end]);
        fft.process(&mut time_buf, &mut spec).map_err(fft_err)?;

        for (x, h) in spec.iter_mut().zip(kernel_spec.iter()) {
            *x *= *h;
        }
        // DC and Nyquist bins of a real product are real
        if let Some(first) = spec.first_mut() {
            first.im = 0.0;
        }
        if let Some(last) = spec.last_mut() {
            last.im = 0.0;
        }

        ifft.process(&mut spec, &mut result).map_err(fft_err)?;

        for (i, &value) in result.iter().enumerate() {
            let idx = start + i;
            if idx >= n {
                break;
            }
            output[idx] += value * norm;
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_convolve(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
        (0..signal.len())
            .map(|i| {
                kernel
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k <= i)
                    .map(|(k, h)| h * signal[i - k])
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_matches_direct_convolution() {
        let signal: Vec<f32> = (0..5000).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();
        let mut kernel = vec![0.0f32; 300];
        kernel[0] = 1.0;
        kernel[299] = 0.5;
        kernel[17] = -0.25;

        let fast = fft_convolve(&signal, &kernel).unwrap();
        let slow = direct_convolve(&signal, &kernel);

        assert_eq!(fast.len(), signal.len());
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(fft_convolve(&[], &[1.0]).unwrap().is_empty());
    }
}
