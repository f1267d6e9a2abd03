use std::path::PathBuf;

use thiserror::Error;

use crate::effects::registry::{EffectKind, Param};

/// Errors surfaced by the load / apply / play pipeline.
///
/// Every failure is terminal for the one user action that caused it; callers
/// are expected to report it and keep the session going.
#[derive(Debug, Error)]
pub enum Error {
    /// A required parameter field is missing, empty, or not a finite number
    #[error("{effect}: parameter '{param}' is not a valid number (got {text:?})")]
    ParameterFormat {
        effect: EffectKind,
        param: Param,
        text: String,
    },

    /// A parameter parsed but lies outside the domain the effect is defined on
    #[error("{effect}: parameter '{param}' = {value} is out of range (expected {expected})")]
    ParameterRange {
        effect: EffectKind,
        param: Param,
        value: f64,
        expected: &'static str,
    },

    #[error("unsupported effect selection: {0}")]
    UnsupportedCombination(String),

    /// Playback source could not be found or decoded
    #[error("cannot play {path:?}: {reason}")]
    PlaybackSource { path: PathBuf, reason: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("failed to encode {path:?}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error("no audio file loaded")]
    NothingLoaded,

    #[error("no processed signal; apply an effect first")]
    NothingProcessed,

    #[error("playback command queue is full")]
    QueueFull,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("FFT error: {0}")]
    Fft(String),
}

impl Error {
    /// True for the parse/missing-field failures of an apply request
    pub fn is_parameter_format(&self) -> bool {
        matches!(self, Error::ParameterFormat { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
