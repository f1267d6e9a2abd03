use std::path::PathBuf;

/// Identifies one play request; 0 is reserved for "nothing playing"
pub type RequestId = u64;

pub(crate) const NO_REQUEST: RequestId = 0;

/// A decoded source, already resampled to the device rate
#[derive(Debug, Clone)]
pub struct Voice {
    pub id: RequestId,
    pub source: PathBuf,
    pub samples: Vec<f32>,
}

/// Commands sent from the controller to the audio thread
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Start playing a voice, replacing whatever is playing
    Play(Voice),
}

/// Events sent from the audio thread back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The voice began producing audio
    Started(RequestId),
    /// The voice played through to its end
    Finished(RequestId),
    /// The voice was cut off by stop() or a newer request
    Stopped(RequestId),
}
