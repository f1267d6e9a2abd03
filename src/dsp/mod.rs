pub mod biquad;
pub mod convolve;
pub mod lfo;
pub mod resample;
pub mod wsola;

pub use biquad::BiquadFilter;
pub use convolve::fft_convolve;
pub use lfo::SineLfo;
pub use resample::resample_linear;
pub use wsola::{wsola_stretch, MAX_STRETCH_FACTOR};
