use crate::audio::SignalBuffer;

/// How an effect should run its filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilteringMode {
    /// Let the effect pick its preferred domain
    #[default]
    Auto,
    /// Sample-by-sample difference equations
    TimeDomain,
    /// Block FFT processing
    FrequencyDomain,
}

impl FilteringMode {
    /// Resolve `Auto` against the effect's preference
    pub fn resolve(self, preferred: FilteringMode) -> FilteringMode {
        match self {
            FilteringMode::Auto => match preferred {
                FilteringMode::Auto => FilteringMode::TimeDomain,
                other => other,
            },
            other => other,
        }
    }
}

/// Audio effect processor trait
///
/// An effect is a bound, ready-to-run transform: parameters are fixed at
/// construction and `apply` keeps all working state (delay lines, LFO
/// phase, filter memory) local to the call. Applying the same effect twice
/// to the same buffer yields the same result.
pub trait Effect: Send {
    /// Process a whole buffer, returning a new buffer with the same sample rate
    ///
    /// # Arguments
    /// * `signal` - Input buffer (left untouched)
    /// * `mode` - Filtering domain; effects without a frequency-domain path
    ///   run in the time domain regardless
    fn apply(&self, signal: &SignalBuffer, mode: FilteringMode) -> SignalBuffer;

    /// Get the effect name
    fn name(&self) -> &str;

    /// Domain used when applied with `FilteringMode::Auto`
    fn preferred_mode(&self, _sample_rate: u32) -> FilteringMode {
        FilteringMode::TimeDomain
    }
}
