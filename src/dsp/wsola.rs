//! Waveform-similarity overlap-add (WSOLA) time scaling.

use std::f32::consts::PI;

use super::resample::resample_linear;

/// Largest stretch factor the kernel accepts; larger factors are clamped
pub const MAX_STRETCH_FACTOR: f64 = 16.0;

/// Periodic Hann window; sums to one at 50 % overlap
fn hann_periodic(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

#[inline]
fn sample_at(x: &[f32], idx: isize) -> f32 {
    if idx < 0 {
        0.0
    } else {
        x.get(idx as usize).copied().unwrap_or(0.0)
    }
}

/// `round(len * factor)`, or `None` if it does not fit in memory
pub fn stretched_len(len: usize, factor: f64) -> Option<usize> {
    let target = (len as f64 * factor).round();
    if target.is_finite() && target >= 0.0 && target <= (isize::MAX as usize / 4) as f64 {
        Some(target as usize)
    } else {
        None
    }
}

/// Pick the analysis frame start near `nominal` that best continues the
/// frame chosen previously (`natural` = previous start + synthesis hop).
fn best_alignment(x: &[f32], nominal: isize, natural: isize, overlap: usize, tolerance: isize) -> isize {
    let max_start = x.len() as isize - 1;
    let mut best = nominal;
    let mut best_corr = f32::NEG_INFINITY;

    for offset in -tolerance..=tolerance {
        let candidate = nominal + offset;
        if candidate < 0 || candidate > max_start {
            continue;
        }
        let corr: f32 = (0..overlap as isize)
            .map(|j| sample_at(x, natural + j) * sample_at(x, candidate + j))
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best = candidate;
        }
    }

    best
}

/// Stretch `x` to `round(len * factor)` samples without changing pitch.
///
/// `window_size` is rounded up to an even length. Inputs shorter than one
/// window are rescaled by interpolation instead. `factor` is clamped to
/// `(0, MAX_STRETCH_FACTOR]`, so the output never exceeds
/// `MAX_STRETCH_FACTOR` times the input.
pub fn wsola_stretch(x: &[f32], factor: f64, window_size: usize) -> Vec<f32> {
    let n = x.len();
    let factor = if factor.is_finite() && factor > 0.0 {
        factor.min(MAX_STRETCH_FACTOR)
    } else {
        return Vec::new();
    };
    let Some(out_len) = stretched_len(n, factor) else {
        return Vec::new();
    };
    let window_size = (window_size.max(4) + 1) & !1;

    if n < window_size || out_len == 0 {
        return resample_linear(x, out_len);
    }

    let synthesis_hop = window_size / 2;
    let analysis_hop = synthesis_hop as f64 / factor;
    let tolerance = (synthesis_hop / 4) as isize;
    let window = hann_periodic(window_size);

    let mut output = vec![0.0f32; out_len.saturating_add(window_size)];
    let mut previous: Option<isize> = None;

    let mut k = 0usize;
    loop {
        let out_pos = k * synthesis_hop;
        if out_pos >= out_len {
            break;
        }

        let nominal = (k as f64 * analysis_hop).round() as isize;
        let start = match previous {
            Some(prev) => best_alignment(x, nominal, prev + synthesis_hop as isize, synthesis_hop, tolerance),
            None => nominal,
        };

        for (i, w) in window.iter().enumerate() {
            output[out_pos + i] += sample_at(x, start + i as isize) * w;
        }

        previous = Some(start);
        k += 1;
    }

    // The first half-window only received one (rising) Hann half
    for (i, sample) in output.iter_mut().take(synthesis_hop).enumerate() {
        let w = window[i];
        if w > 1e-3 {
            *sample /= w;
        }
    }

    output.truncate(out_len);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f32 / sample_rate).sin())
            .collect()
    }

    fn zero_crossings(x: &[f32]) -> usize {
        x.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count()
    }

    #[test]
    fn test_output_length_follows_factor() {
        let x = sine(220.0, 8000.0, 8000);
        assert_eq!(wsola_stretch(&x, 1.5, 200).len(), 12000);
        assert_eq!(wsola_stretch(&x, 0.5, 200).len(), 4000);
        assert_eq!(wsola_stretch(&x, 1.0, 200).len(), 8000);
    }

    #[test]
    fn test_pitch_is_preserved() {
        let x = sine(200.0, 8000.0, 8000);
        let y = wsola_stretch(&x, 2.0, 320);

        // Twice as long, same frequency -> roughly twice the crossings
        let ratio = zero_crossings(&y) as f32 / zero_crossings(&x) as f32;
        assert!((ratio - 2.0).abs() < 0.15, "crossing ratio {}", ratio);
    }

    #[test]
    fn test_huge_factor_is_clamped() {
        let x = sine(220.0, 8000.0, 1000);
        let y = wsola_stretch(&x, 1e30, 200);
        assert_eq!(y.len(), (1000.0 * MAX_STRETCH_FACTOR) as usize);
    }

    #[test]
    fn test_stretched_len() {
        assert_eq!(stretched_len(100, 1.5), Some(150));
        assert_eq!(stretched_len(usize::MAX, 2.0), None);
        assert_eq!(stretched_len(10, f64::INFINITY), None);
    }

    #[test]
    fn test_short_input_falls_back_to_interpolation() {
        let x = vec![0.0, 1.0, 0.0, -1.0];
        let y = wsola_stretch(&x, 2.0, 64);
        assert_eq!(y.len(), 8);
    }
}
