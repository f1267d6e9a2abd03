pub mod output;
pub mod player;
pub mod signal;

pub use output::CpalOutput;
pub use player::{new_playback, DisabledPlayback, Playback, PlaybackController, PlaybackState, Player};
pub use signal::{SignalBuffer, WaveformPeak};
