use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use wavefx::{
    load_signal, AppConfig, DisabledPlayback, EffectForm, EffectKind, Error, FilteringMode, Param,
    ParameterSet, Session, SignalBuffer, Stft,
};

fn write_fixture(path: &Path, channels: u16, sample_rate: u32, seconds: f32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (sample_rate as f32 * seconds) as usize;
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = 0.4 * (2.0 * PI * 440.0 * t).sin() + 0.2 * (2.0 * PI * 1320.0 * t).sin();
        for _ in 0..channels {
            writer.write_sample((value * 32767.0) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn session_in(dir: &Path) -> Session<DisabledPlayback> {
    let config = AppConfig {
        artifact_path: dir.join("tmpfiltered.wav"),
        ..AppConfig::default()
    };
    Session::new(DisabledPlayback, &config)
}

fn form(kind: EffectKind, params: &[(Param, &str)]) -> EffectForm {
    let mut set = ParameterSet::new();
    for (param, text) in params {
        set.set(*param, *text);
    }
    EffectForm {
        selected: Some(kind),
        params: set,
        true_pitch_shift: false,
    }
}

fn valid_params() -> Vec<(Param, &'static str)> {
    vec![
        (Param::Frequency, "5"),
        (Param::Index, "0.5"),
        (Param::Gain, "3"),
        (Param::Mix, "0.8"),
        (Param::Resonance, "-0.2"),
        (Param::Drive, "8"),
        (Param::DelayTime, "0.02"),
        (Param::Decay, "0.5"),
        (Param::LfoFrequency, "1.5"),
        (Param::MinFrequency, "300"),
        (Param::MaxFrequency, "3000"),
        (Param::QFactor, "0.8"),
        (Param::ShiftAmount, "1.5"),
    ]
}

fn fixture(dir: &Path, seconds: f32) -> PathBuf {
    let path = dir.join("input.wav");
    write_fixture(&path, 1, 44100, seconds);
    path
}

#[test]
fn test_tremolo_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 1.0);
    let mut session = session_in(dir.path());

    let original = session.load(&input).unwrap();
    assert_eq!(original.signal.len(), 44100);
    assert_eq!(original.spectrogram.num_frames(), 173);
    assert_eq!(original.spectrogram.num_bins(), 129);

    let processed = session
        .apply(&form(
            EffectKind::Tremolo,
            &[(Param::Frequency, "5"), (Param::Index, "0.5")],
        ))
        .unwrap();

    assert_eq!(processed.signal.len(), 44100);
    assert_eq!(processed.signal.sample_rate(), 44100);
    assert_eq!(processed.spectrogram.num_frames(), 173);
    assert_eq!(processed.spectrogram.num_bins(), 129);
}

#[test]
fn test_pitch_shift_without_toggle_stretches() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 1.0);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    let mut pitch = form(EffectKind::PitchShift, &[(Param::ShiftAmount, "1.5")]);
    let stretched = session.apply(&pitch).unwrap().signal.clone();
    assert_ne!(stretched.len(), 44100);
    assert_eq!(stretched.len(), 66150);
    assert_eq!(stretched.sample_rate(), 44100);

    pitch.true_pitch_shift = true;
    let shifted = session.apply(&pitch).unwrap().signal.clone();
    assert_eq!(shifted.len(), 44100);
    assert_eq!(shifted.sample_rate(), 44100);
}

#[test]
fn test_empty_echo_field_keeps_previous_result() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.5);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    // Never applied: stays absent
    let empty = form(EffectKind::Echo, &[(Param::DelayTime, "0.1"), (Param::Decay, "")]);
    assert!(session.apply(&empty).unwrap_err().is_parameter_format());
    assert!(session.processed().is_none());

    let good = form(EffectKind::Echo, &[(Param::DelayTime, "0.1"), (Param::Decay, "0.5")]);
    let before = session.apply(&good).unwrap().clone();

    assert!(session.apply(&empty).unwrap_err().is_parameter_format());
    let after = session.processed().unwrap();
    assert_eq!(after.signal, before.signal);
    assert_eq!(after.spectrogram, before.spectrogram);
}

#[test]
fn test_every_effect_keeps_rate_and_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.25);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();
    let original = session.original().unwrap().signal.clone();

    for kind in EffectKind::ALL {
        let mut fx = form(kind, &valid_params());
        fx.true_pitch_shift = true;

        let processed = session.apply(&fx).unwrap();
        assert_eq!(processed.signal.sample_rate(), 44100, "{}", kind);
        assert_eq!(processed.signal.len(), original.len(), "{}", kind);
        assert!(
            processed.signal.samples().iter().all(|s| s.is_finite()),
            "{} produced non-finite samples",
            kind
        );
        assert_eq!(session.original().unwrap().signal, original, "{} mutated input", kind);
    }
}

#[test]
fn test_every_missing_field_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.1);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    for kind in EffectKind::ALL {
        for &missing in kind.params() {
            let params: Vec<_> = valid_params()
                .into_iter()
                .filter(|(p, _)| *p != missing)
                .collect();
            let err = session.apply(&form(kind, &params)).unwrap_err();
            assert!(err.is_parameter_format(), "{} without {}: {:?}", kind, missing, err);
            assert!(session.processed().is_none());
        }
    }
}

#[test]
fn test_stereo_file_is_mixed_down() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_fixture(&path, 2, 22050, 0.5);

    let mut session = session_in(dir.path());
    let original = session.load(&path).unwrap();
    assert_eq!(original.signal.len(), 11025);
    assert_eq!(original.signal.sample_rate(), 22050);
}

#[test]
fn test_no_selection_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.1);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    let fx = EffectForm {
        selected: None,
        params: ParameterSet::new(),
        true_pitch_shift: true,
    };
    assert!(matches!(session.apply(&fx), Err(Error::UnsupportedCombination(_))));
}

#[test]
fn test_artifact_is_overwritten_and_save_works() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.5);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    session
        .apply(&form(EffectKind::PitchShift, &[(Param::ShiftAmount, "2")]))
        .unwrap();
    // Writing succeeds, then playback reports the missing device
    assert!(matches!(session.play_processed(), Err(Error::Device(_))));
    assert_eq!(load_signal(session.artifact_path()).unwrap().len(), 44100);

    session
        .apply(&form(EffectKind::Overdrive, &[]))
        .unwrap();
    assert!(session.play_processed().is_err());
    assert_eq!(load_signal(session.artifact_path()).unwrap().len(), 22050);

    let saved = dir.path().join("saved.wav");
    session.save_processed(&saved).unwrap();
    assert_eq!(load_signal(&saved).unwrap().len(), 22050);
}

#[test]
fn test_spectrogram_is_pure() {
    let samples: Vec<f32> = (0..5000).map(|n| ((n * 37) % 101) as f32 / 101.0 - 0.5).collect();
    let a = SignalBuffer::new(samples.clone(), 16000).unwrap();
    let b = SignalBuffer::new(samples, 16000).unwrap();

    let stft = Stft::default();
    assert_eq!(stft.spectrogram(&a).unwrap(), Stft::default().spectrogram(&b).unwrap());
}

#[test]
fn test_delay_modes_agree_through_registry() {
    let fx = form(EffectKind::Delay, &[(Param::DelayTime, "0.01"), (Param::Decay, "0.7")]);
    let transform = fx.transform().unwrap();

    let samples: Vec<f32> = (0..4410).map(|n| (n as f32 * 0.013).sin()).collect();
    let signal = SignalBuffer::new(samples, 44100).unwrap();

    let time = transform.apply(&signal, FilteringMode::TimeDomain).unwrap();
    let freq = transform.apply(&signal, FilteringMode::FrequencyDomain).unwrap();
    for (t, f) in time.samples().iter().zip(freq.samples()) {
        assert!((t - f).abs() < 1e-3);
    }
}

#[test]
fn test_huge_shift_is_rejected_and_session_survives() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 1.0);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();

    let mut pitch = form(EffectKind::PitchShift, &[(Param::ShiftAmount, "1e30")]);
    for toggle in [false, true] {
        pitch.true_pitch_shift = toggle;
        assert!(matches!(session.apply(&pitch), Err(Error::ParameterRange { .. })));
        assert!(session.processed().is_none());
    }

    let ok = form(EffectKind::PitchShift, &[(Param::ShiftAmount, "2")]);
    assert_eq!(session.apply(&ok).unwrap().signal.len(), 88200);
}

#[test]
fn test_delay_far_beyond_the_signal() {
    let dir = tempfile::tempdir().unwrap();
    let input = fixture(dir.path(), 0.25);
    let mut session = session_in(dir.path());
    session.load(&input).unwrap();
    let original = session.original().unwrap().signal.clone();

    for delay in ["1e12", "100"] {
        let fx = form(EffectKind::Delay, &[(Param::DelayTime, delay), (Param::Decay, "0.5")]);
        let processed = session.apply(&fx).unwrap();
        assert_eq!(processed.signal, original, "delay {}", delay);
    }
}

#[test]
fn test_every_effect_at_a_tiny_sample_rate() {
    let samples: Vec<f32> = (0..64).map(|n| (n as f32 * 0.7).sin() * 0.5).collect();
    let signal = SignalBuffer::new(samples, 2).unwrap();

    for kind in EffectKind::ALL {
        let mut fx = form(kind, &valid_params());
        fx.true_pitch_shift = true;
        let out = fx.transform().unwrap().apply(&signal, FilteringMode::Auto).unwrap();
        assert_eq!(out.len(), signal.len(), "{}", kind);
        assert!(out.samples().iter().all(|s| s.is_finite()), "{}", kind);
    }
}
