//! Duration-changing operations.

use crate::audio::SignalBuffer;
use crate::dsp::{wsola_stretch, MAX_STRETCH_FACTOR};
use crate::effects::pitch_shift::wsola_window;
use crate::error::{Error, Result};

/// Stretch a signal in time without changing its pitch
///
/// The output holds `round(len * factor)` samples at the same sample rate,
/// so `factor > 1` slows the recording down and `factor < 1` speeds it up.
/// Factors above `MAX_STRETCH_FACTOR` are rejected.
pub fn time_stretch(signal: &SignalBuffer, factor: f64) -> Result<SignalBuffer> {
    if !factor.is_finite() || factor <= 0.0 || factor > MAX_STRETCH_FACTOR {
        return Err(Error::InvalidSignal(format!(
            "stretch factor must be in (0, {}], got {}",
            MAX_STRETCH_FACTOR, factor
        )));
    }

    let window = wsola_window(signal.sample_rate());
    let stretched = wsola_stretch(signal.samples(), factor, window);

    log::debug!(
        "Time stretch x{}: {} -> {} samples",
        factor,
        signal.len(),
        stretched.len()
    );

    Ok(signal.with_samples(stretched))
}
