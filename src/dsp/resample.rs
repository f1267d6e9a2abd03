/// Rescale `samples` to exactly `out_len` samples using linear interpolation.
///
/// The first and last samples map onto each other, so the waveform is
/// stretched or squeezed as a whole (pitch moves with duration).
pub fn resample_linear(samples: &[f32], out_len: usize) -> Vec<f32> {
    match (samples.len(), out_len) {
        (_, 0) => Vec::new(),
        (0, _) => vec![0.0; out_len],
        (1, _) => vec![samples[0]; out_len],
        (n, 1) => vec![samples[n / 2]],
        (n, _) => {
            let step = (n - 1) as f64 / (out_len - 1) as f64;
            (0..out_len)
                .map(|i| {
                    let pos = i as f64 * step;
                    let idx = pos.floor() as usize;
                    let frac = (pos - idx as f64) as f32;
                    match samples.get(idx + 1) {
                        Some(&next) => samples[idx] * (1.0 - frac) + next * frac,
                        None => samples[n - 1],
                    }
                })
                .collect()
        }
    }
}
