use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::SignalBuffer;
use crate::error::{Error, Result};

/// A decoded audio file with interleaved samples
pub struct AudioFile {
    pub path: PathBuf,
    pub data: Vec<f32>,
    pub channels: u32,
    pub sample_rate: u32,
    pub frames: u64,
}

impl AudioFile {
    /// Load an audio file from disk and decode it to interleaved f32 samples
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decode_err = |reason: String| Error::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a probe hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext_str) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext_str);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| decode_err(format!("failed to probe file: {}", e)))?;

        let mut format = probed.format;

        // Find the default audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_err("no audio tracks found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let mut channels = codec_params.channels.map(|c| c.count() as u32);
        let mut sample_rate = codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| decode_err(format!("failed to create decoder: {}", e)))?;

        let mut audio_data = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(decode_err("decoder reset required".to_string()));
                }
                Err(e) => {
                    return Err(decode_err(format!("failed to read packet: {}", e)));
                }
            };

            // Skip packets for other tracks
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    channels.get_or_insert(spec.channels.count() as u32);
                    sample_rate.get_or_insert(spec.rate);

                    // Packets can grow; reallocate when the current buffer is too small
                    let needs_alloc = sample_buf
                        .as_ref()
                        .map_or(true, |b| b.capacity() < decoded.capacity() * spec.channels.count());
                    if needs_alloc {
                        sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                    }

                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        audio_data.extend_from_slice(buf.samples());
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping corrupt packet in {:?}: {}", path, e);
                    continue;
                }
                Err(e) => {
                    return Err(decode_err(format!("decode failed: {}", e)));
                }
            }
        }

        let channels = channels
            .filter(|&c| c > 0)
            .ok_or_else(|| decode_err("channel count not specified".to_string()))?;
        let sample_rate = sample_rate
            .filter(|&r| r > 0)
            .ok_or_else(|| decode_err("sample rate not specified".to_string()))?;

        let frames = (audio_data.len() / channels as usize) as u64;

        Ok(AudioFile {
            path: path.to_path_buf(),
            data: audio_data,
            channels,
            sample_rate,
            frames,
        })
    }

    /// Calculate the duration of the audio file in seconds
    pub fn duration(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }

    /// Average all channels into one
    pub fn to_mono(&self) -> Result<SignalBuffer> {
        let channels = self.channels as usize;
        let samples = if channels == 1 {
            self.data.clone()
        } else {
            self.data
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };
        SignalBuffer::new(samples, self.sample_rate)
    }
}

/// Load a file and reduce it to a mono signal
pub fn load_signal<P: AsRef<Path>>(path: P) -> Result<SignalBuffer> {
    let file = AudioFile::load(path)?;
    log::debug!(
        "Decoded {:?}: {} ch, {} Hz, {} frames",
        file.path,
        file.channels,
        file.sample_rate,
        file.frames
    );
    file.to_mono()
}
