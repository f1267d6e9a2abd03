use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::audio::SignalBuffer;
use crate::command::types::NO_REQUEST;
use crate::command::{PlaybackEvent, PlayerCommand, RequestId, Voice};
use crate::dsp::resample_linear;
use crate::error::{Error, Result};
use crate::io::load_signal;

/// What the controller currently wants to hear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing(RequestId),
}

/// Something that can play a named audio source
///
/// At most one source plays at a time: `play` supersedes the current one,
/// `stop` is valid in any state.
pub trait Playback {
    fn play(&mut self, source: &Path) -> Result<RequestId>;
    fn stop(&mut self);
    fn state(&self) -> PlaybackState;

    /// Drain lifecycle events reported since the last call
    fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        Vec::new()
    }
}

impl<P: Playback + ?Sized> Playback for Box<P> {
    fn play(&mut self, source: &Path) -> Result<RequestId> {
        (**self).play(source)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn state(&self) -> PlaybackState {
        (**self).state()
    }

    fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        (**self).poll_events()
    }
}

/// Create a connected controller / player pair
///
/// The `Player` belongs on the audio thread; the controller stays with the UI.
pub fn new_playback(sample_rate: u32, channels: u32, capacity: usize) -> (PlaybackController, Player) {
    let (command_tx, command_rx) = rtrb::RingBuffer::<PlayerCommand>::new(capacity.max(1));
    let (event_tx, event_rx) = rtrb::RingBuffer::<PlaybackEvent>::new(capacity.max(1) * 4);
    let active = Arc::new(AtomicU64::new(NO_REQUEST));

    let player = Player {
        command_rx,
        event_tx,
        active: Arc::clone(&active),
        voice: None,
        position: 0,
        channels: channels.max(1),
    };

    let controller = PlaybackController {
        command_tx,
        event_rx,
        active,
        next_id: 1,
        sample_rate,
        channels: channels.max(1),
    };

    (controller, player)
}

/// Audio-thread side: renders at most one voice
pub struct Player {
    command_rx: rtrb::Consumer<PlayerCommand>,
    event_tx: rtrb::Producer<PlaybackEvent>,
    // Request the controller wants to hear; anything else is dropped
    active: Arc<AtomicU64>,
    voice: Option<Voice>,
    position: usize,
    channels: u32,
}

impl Player {
    /// Fill an interleaved output buffer - called from the audio callback
    pub fn process(&mut self, output: &mut [f32]) {
        output.fill(0.0);

        while let Ok(cmd) = self.command_rx.pop() {
            match cmd {
                PlayerCommand::Play(voice) => {
                    if voice.id != self.active.load(Ordering::Acquire) {
                        // Superseded or stopped before it got here
                        self.emit(PlaybackEvent::Stopped(voice.id));
                        continue;
                    }
                    if let Some(old) = self.voice.take() {
                        self.emit(PlaybackEvent::Stopped(old.id));
                    }
                    self.emit(PlaybackEvent::Started(voice.id));
                    self.voice = Some(voice);
                    self.position = 0;
                }
            }
        }

        let active = self.active.load(Ordering::Acquire);
        if let Some(id) = self.voice.as_ref().map(|v| v.id) {
            if id != active {
                self.voice = None;
                self.emit(PlaybackEvent::Stopped(id));
            }
        }

        let Some(voice) = self.voice.as_ref() else {
            return;
        };

        let channels = self.channels as usize;
        let remaining = &voice.samples[self.position.min(voice.samples.len())..];
        let frames = (output.len() / channels).min(remaining.len());

        for (frame, &sample) in output.chunks_exact_mut(channels).zip(remaining).take(frames) {
            frame.fill(sample);
        }
        self.position += frames;

        if self.position >= voice.samples.len() {
            let id = voice.id;
            self.voice = None;
            // Only go idle if nothing newer was requested meanwhile
            let _ = self
                .active
                .compare_exchange(id, NO_REQUEST, Ordering::AcqRel, Ordering::Acquire);
            self.emit(PlaybackEvent::Finished(id));
        }
    }

    pub fn is_playing(&self) -> bool {
        self.voice.is_some()
    }

    fn emit(&mut self, event: PlaybackEvent) {
        // Events are advisory; a full queue just drops them
        let _ = self.event_tx.push(event);
    }
}

/// UI-side handle for the player
pub struct PlaybackController {
    command_tx: rtrb::Producer<PlayerCommand>,
    event_rx: rtrb::Consumer<PlaybackEvent>,
    active: Arc<AtomicU64>,
    next_id: RequestId,
    sample_rate: u32,
    channels: u32,
}

impl PlaybackController {
    /// Play an in-memory signal, superseding whatever is playing
    pub fn play_signal(&mut self, signal: &SignalBuffer, source: &Path) -> Result<RequestId> {
        let samples = if signal.sample_rate() == self.sample_rate {
            signal.samples().to_vec()
        } else {
            let out_len = (signal.len() as u64 * self.sample_rate as u64
                / signal.sample_rate() as u64) as usize;
            resample_linear(signal.samples(), out_len)
        };

        let id = self.next_id;
        self.next_id += 1;

        // Publish first so the player drops the previous voice right away
        self.active.store(id, Ordering::Release);

        let voice = Voice {
            id,
            source: source.to_path_buf(),
            samples,
        };
        if self.command_tx.push(PlayerCommand::Play(voice)).is_err() {
            let _ = self
                .active
                .compare_exchange(id, NO_REQUEST, Ordering::AcqRel, Ordering::Acquire);
            return Err(Error::QueueFull);
        }

        log::info!("Playing {:?} (request {})", source, id);
        Ok(id)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }
}

impl Playback for PlaybackController {
    /// Decode `source` and play it
    ///
    /// Decoding happens here, on the caller's thread, so that a missing or
    /// undecodable source fails this call instead of turning up later as an
    /// event. The call costs one full decode of the source; it returns as soon
    /// as the voice is queued and never waits on the audio thread.
    fn play(&mut self, source: &Path) -> Result<RequestId> {
        let signal = load_signal(source).map_err(|e| Error::PlaybackSource {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.play_signal(&signal, source)
    }

    fn stop(&mut self) {
        let previous = self.active.swap(NO_REQUEST, Ordering::AcqRel);
        if previous != NO_REQUEST {
            log::info!("Stopping playback (request {})", previous);
        }
    }

    fn state(&self) -> PlaybackState {
        match self.active.load(Ordering::Acquire) {
            NO_REQUEST => PlaybackState::Idle,
            id => PlaybackState::Playing(id),
        }
    }

    fn poll_events(&mut self) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.pop() {
            events.push(event);
        }
        events
    }
}

/// Stand-in used when no output device was opened
#[derive(Debug, Default)]
pub struct DisabledPlayback;

impl Playback for DisabledPlayback {
    fn play(&mut self, source: &Path) -> Result<RequestId> {
        Err(Error::Device(format!(
            "audio output is disabled; cannot play {:?}",
            source
        )))
    }

    fn stop(&mut self) {}

    fn state(&self) -> PlaybackState {
        PlaybackState::Idle
    }
}
