use std::path::Path;

use crate::audio::SignalBuffer;
use crate::error::{Error, Result};

/// Write a mono signal as integer PCM WAV (16 or 24 bit)
///
/// Samples are clamped to [-1.0, 1.0]. An existing file is overwritten.
pub fn write_wav<P: AsRef<Path>>(signal: &SignalBuffer, path: P, bit_depth: u16) -> Result<()> {
    let path = path.as_ref();
    let encode_err = |e: hound::Error| match e {
        hound::Error::IoError(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        other => Error::Encode {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    };

    let scale = match bit_depth {
        16 => 32767.0,
        24 => 8388607.0,
        other => {
            return Err(Error::Encode {
                path: path.to_path_buf(),
                reason: format!("unsupported bit depth: {}", other),
            })
        }
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate(),
        bits_per_sample: bit_depth,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;

    for &sample in signal.samples() {
        let clamped = if sample.is_finite() { sample.clamp(-1.0, 1.0) } else { 0.0 };
        let pcm_value = (clamped * scale) as i32;
        writer.write_sample(pcm_value).map_err(encode_err)?;
    }

    writer.finalize().map_err(encode_err)?;

    log::debug!(
        "Wrote {} samples ({} bit) to {:?}",
        signal.len(),
        bit_depth,
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let signal = SignalBuffer::new(vec![0.0, 1.0, -1.0, 2.0], 44100).unwrap();

        write_wav(&signal, &path, 24).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 24);

        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 8388607, -8388607, 8388607]);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_wav(&SignalBuffer::new(vec![0.1; 100], 8000).unwrap(), &path, 16).unwrap();
        write_wav(&SignalBuffer::new(vec![0.1; 10], 8000).unwrap(), &path, 16).unwrap();

        assert_eq!(hound::WavReader::open(&path).unwrap().len(), 10);
    }

    #[test]
    fn test_rejects_unsupported_depth() {
        let dir = tempfile::tempdir().unwrap();
        let signal = SignalBuffer::new(vec![0.0], 8000).unwrap();
        assert!(matches!(
            write_wav(&signal, dir.path().join("x.wav"), 12),
            Err(Error::Encode { .. })
        ));
    }
}
