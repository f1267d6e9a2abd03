//! Orchestrates load -> apply -> visualize -> play for one user session.

use std::path::{Path, PathBuf};

use crate::audio::{Playback, PlaybackState, SignalBuffer, WaveformPeak};
use crate::command::RequestId;
use crate::config::AppConfig;
use crate::effects::{EffectForm, FilteringMode};
use crate::error::{Error, Result};
use crate::io::{load_signal, write_wav};
use crate::spectrogram::{Spectrogram, Stft};

/// Columns in a panel's waveform overview
pub const WAVEFORM_PEAKS: usize = 512;

/// A signal together with everything its panel shows
#[derive(Debug, Clone)]
pub struct Analyzed {
    pub signal: SignalBuffer,
    pub spectrogram: Spectrogram,
    pub waveform: Vec<WaveformPeak>,
}

impl Analyzed {
    fn new(signal: SignalBuffer, stft: &Stft) -> Result<Self> {
        let spectrogram = stft.spectrogram(&signal)?;
        let waveform = signal.waveform_overview(WAVEFORM_PEAKS);
        Ok(Self {
            signal,
            spectrogram,
            waveform,
        })
    }
}

/// The "before" and "after" slots plus the playback handle
///
/// Each step either completes or leaves the session exactly as it was.
pub struct Session<P: Playback> {
    playback: P,
    stft: Stft,
    artifact_path: PathBuf,
    bit_depth: u16,
    source_path: Option<PathBuf>,
    original: Option<Analyzed>,
    processed: Option<Analyzed>,
    last_transform: Option<String>,
}

impl<P: Playback> Session<P> {
    pub fn new(playback: P, config: &AppConfig) -> Self {
        Self {
            playback,
            stft: Stft::default(),
            artifact_path: config.artifact_path.clone(),
            bit_depth: config.artifact_bit_depth,
            source_path: None,
            original: None,
            processed: None,
            last_transform: None,
        }
    }

    /// Read a file, mono-reduce it and make it the new "before" signal
    ///
    /// The previous "after" signal is discarded since it no longer matches.
    pub fn load(&mut self, path: &Path) -> Result<&Analyzed> {
        let signal = load_signal(path)?;
        let analyzed = Analyzed::new(signal, &self.stft)?;

        log::info!(
            "Loaded {:?}: {} samples @ {} Hz ({:.2}s)",
            path,
            analyzed.signal.len(),
            analyzed.signal.sample_rate(),
            analyzed.signal.duration()
        );

        self.source_path = Some(path.to_path_buf());
        self.processed = None;
        self.last_transform = None;
        Ok(self.original.insert(analyzed))
    }

    /// Apply the form's effect to the original signal
    ///
    /// On failure the previous "after" signal and spectrogram stay in place.
    pub fn apply(&mut self, form: &EffectForm) -> Result<&Analyzed> {
        let original = self.original.as_ref().ok_or(Error::NothingLoaded)?;
        let transform = form.transform()?;

        let signal = transform.apply(&original.signal, FilteringMode::Auto)?;
        let analyzed = Analyzed::new(signal, &self.stft)?;

        log::info!(
            "Applied {}: {} -> {} samples",
            transform.describe(),
            original.signal.len(),
            analyzed.signal.len()
        );

        self.last_transform = Some(transform.describe());
        Ok(self.processed.insert(analyzed))
    }

    /// Play the loaded file by its own path
    pub fn play_original(&mut self) -> Result<RequestId> {
        let path = self.source_path.clone().ok_or(Error::NothingLoaded)?;
        self.playback.play(&path)
    }

    /// Write the "after" signal to the artifact file, then play that file
    pub fn play_processed(&mut self) -> Result<RequestId> {
        let processed = self.processed.as_ref().ok_or(Error::NothingProcessed)?;
        write_wav(&processed.signal, &self.artifact_path, self.bit_depth)?;
        self.playback.play(&self.artifact_path)
    }

    /// Valid at any time
    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Persist the "after" signal to a user-chosen path
    pub fn save_processed(&self, path: &Path) -> Result<()> {
        let processed = self.processed.as_ref().ok_or(Error::NothingProcessed)?;
        write_wav(&processed.signal, path, self.bit_depth)?;
        log::info!("Saved processed signal to {:?}", path);
        Ok(())
    }

    pub fn original(&self) -> Option<&Analyzed> {
        self.original.as_ref()
    }

    pub fn processed(&self) -> Option<&Analyzed> {
        self.processed.as_ref()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Name of the transform that produced the "after" signal
    pub fn last_transform(&self) -> Option<&str> {
        self.last_transform.as_deref()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }
}
