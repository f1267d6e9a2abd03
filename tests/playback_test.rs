use std::path::Path;

use wavefx::{
    new_playback, AppConfig, EffectForm, EffectKind, Error, Param, ParameterSet, Playback,
    PlaybackEvent, PlaybackState, Session, SignalBuffer,
};

fn write_constant(path: &Path, value: f32, len: usize) {
    let signal = SignalBuffer::new(vec![value; len], 8000).unwrap();
    wavefx::write_wav(&signal, path, 16).unwrap();
}

#[test]
fn test_session_plays_through_player() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_constant(&input, 0.5, 800);

    let (controller, mut player) = new_playback(8000, 2, 16);
    let config = AppConfig {
        artifact_path: dir.path().join("tmpfiltered.wav"),
        ..AppConfig::default()
    };
    let mut session = Session::new(controller, &config);
    session.load(&input).unwrap();

    let id = session.play_original().unwrap();
    assert_eq!(session.playback_state(), PlaybackState::Playing(id));

    let mut out = vec![0.0f32; 2 * 1000];
    player.process(&mut out);
    assert!(out[..1600].iter().all(|&s| (s - 0.5).abs() < 1e-3));
    assert!(out[1600..].iter().all(|&s| s == 0.0));

    assert_eq!(session.playback_state(), PlaybackState::Idle);
    assert_eq!(
        session.playback_mut().poll_events(),
        vec![PlaybackEvent::Started(id), PlaybackEvent::Finished(id)]
    );
}

#[test]
fn test_processed_supersedes_original() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_constant(&input, 0.5, 8000);

    let (controller, mut player) = new_playback(8000, 1, 16);
    let config = AppConfig {
        artifact_path: dir.path().join("tmpfiltered.wav"),
        ..AppConfig::default()
    };
    let mut session = Session::new(controller, &config);
    session.load(&input).unwrap();

    let form = EffectForm {
        selected: Some(EffectKind::Tremolo),
        params: ParameterSet::new()
            .with(Param::Frequency, "0")
            .with(Param::Index, "1"),
        true_pitch_shift: false,
    };
    // Index 1 at 0 Hz: cos(0) = 1, so the gain is exactly 1
    session.apply(&form).unwrap();

    let first = session.play_original().unwrap();
    let mut out = vec![0.0f32; 100];
    player.process(&mut out);

    let second = session.play_processed().unwrap();
    player.process(&mut out);
    assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-3));

    session.stop();
    player.process(&mut out);
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(session.playback_state(), PlaybackState::Idle);

    assert_eq!(
        session.playback_mut().poll_events(),
        vec![
            PlaybackEvent::Started(first),
            PlaybackEvent::Stopped(first),
            PlaybackEvent::Started(second),
            PlaybackEvent::Stopped(second),
        ]
    );
}

#[test]
fn test_missing_source_is_distinct_error() {
    let (mut controller, mut player) = new_playback(8000, 1, 16);
    let err = controller.play(Path::new("/nonexistent/wavefx/none.wav")).unwrap_err();
    assert!(matches!(err, Error::PlaybackSource { .. }));

    let mut out = vec![0.0f32; 16];
    player.process(&mut out);
    assert!(controller.poll_events().is_empty());
    assert_eq!(controller.state(), PlaybackState::Idle);
}

#[test]
fn test_play_again_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_constant(&input, 0.5, 800);

    let (controller, mut player) = new_playback(8000, 1, 16);
    let config = AppConfig {
        artifact_path: dir.path().join("tmpfiltered.wav"),
        ..AppConfig::default()
    };
    let mut session = Session::new(controller, &config);
    session.load(&input).unwrap();

    let first = session.play_original().unwrap();
    let mut out = vec![0.0f32; 100];
    player.process(&mut out);
    session.stop();
    player.process(&mut out);
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(session.playback_state(), PlaybackState::Idle);

    let second = session.play_original().unwrap();
    assert_ne!(second, first);
    assert_eq!(session.playback_state(), PlaybackState::Playing(second));
    player.process(&mut out);
    assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-3));

    assert_eq!(
        session.playback_mut().poll_events(),
        vec![
            PlaybackEvent::Started(first),
            PlaybackEvent::Stopped(first),
            PlaybackEvent::Started(second),
        ]
    );
}

#[test]
fn test_stop_right_after_play_is_never_heard() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.wav");
    write_constant(&input, 0.5, 800);

    let (controller, mut player) = new_playback(8000, 1, 16);
    let config = AppConfig {
        artifact_path: dir.path().join("tmpfiltered.wav"),
        ..AppConfig::default()
    };
    let mut session = Session::new(controller, &config);
    session.load(&input).unwrap();

    let id = session.play_original().unwrap();
    session.stop();

    let mut out = vec![0.3f32; 1000];
    player.process(&mut out);
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(session.playback_state(), PlaybackState::Idle);
    assert_eq!(
        session.playback_mut().poll_events(),
        vec![PlaybackEvent::Stopped(id)]
    );
}
