// wavefx - offline audio effects on whole recordings
//
// Load a file, apply one effect from a fixed catalog (or a time stretch),
// inspect both signals as spectrograms and play either through the default
// output device. Uses symphonia for decoding, hound for WAV output, realfft
// for spectral work, and an rtrb command queue into a cpal stream for playback.

pub mod audio;
pub mod command;
pub mod config;
pub mod dsp;
pub mod effects;
pub mod error;
pub mod io;
pub mod operations;
pub mod session;
pub mod spectrogram;

// Re-export commonly used types
pub use audio::{
    new_playback, CpalOutput, DisabledPlayback, Playback, PlaybackController, PlaybackState,
    Player, SignalBuffer,
};
pub use command::{PlaybackEvent, RequestId};
pub use config::AppConfig;
pub use effects::{Effect, EffectForm, EffectKind, FilteringMode, Param, ParameterSet, Transform};
pub use error::{Error, Result};
pub use io::{load_signal, write_wav};
pub use operations::time_stretch;
pub use session::{Analyzed, Session};
pub use spectrogram::{Spectrogram, Stft};
