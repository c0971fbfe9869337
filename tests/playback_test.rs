//! End-to-end playback tests
//!
//! Drive the state with a recording speech service and explicit instants,
//! checking what is spoken, when, and the Idle/Speaking transitions.

mod common;

use common::state_with;
use recite::playback::PlaybackState;
use std::time::{Duration, Instant};

#[test]
fn test_reads_scripts_in_order_with_interval() {
    let (mut state, mock) = state_with(&["Hello", "World"], "1");
    state.select_voice(0);
    let t0 = Instant::now();

    assert!(state.start().unwrap());
    assert_eq!(state.playback_state(), PlaybackState::Speaking);
    let spoken = mock.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].text, "Hello");
    assert_eq!(spoken[0].voice.as_deref(), Some("v0"));

    // Hello finishes; the next script must wait out the interval
    mock.finish_last();
    state.pump(t0);
    state.pump(t0 + Duration::from_millis(999));
    assert_eq!(mock.spoken().len(), 1);
    assert_eq!(state.poll_timeout(t0 + Duration::from_millis(950)), Duration::from_millis(50));

    state.pump(t0 + Duration::from_secs(1));
    let spoken = mock.spoken();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[1].text, "World");
    assert_eq!(spoken[1].voice.as_deref(), Some("v0"));
    assert_eq!(state.progress(), Some((1, 2)));

    // World finishes; still speaking until its pause is over
    let t1 = t0 + Duration::from_secs(3);
    mock.finish_last();
    state.pump(t1);
    assert!(state.is_speaking());

    state.pump(t1 + Duration::from_secs(1));
    assert_eq!(state.playback_state(), PlaybackState::Idle);
    assert_eq!(state.status.as_deref(), Some("Finished"));
    assert_eq!(mock.spoken().len(), 2);
}

#[test]
fn test_start_with_no_scripts_is_noop() {
    let (mut state, mock) = state_with(&[], "1");
    assert!(!state.start().unwrap());
    assert_eq!(state.playback_state(), PlaybackState::Idle);
    assert!(mock.spoken().is_empty());
}

#[test]
fn test_start_while_speaking_is_noop() {
    let (mut state, mock) = state_with(&["one", "two"], "0");
    assert!(state.start().unwrap());
    assert!(!state.start().unwrap());
    assert_eq!(mock.spoken().len(), 1);
}

#[test]
fn test_zero_interval_advances_immediately() {
    let (mut state, mock) = state_with(&["a", "b", "c"], "0");
    let now = Instant::now();
    state.start().unwrap();

    for expected in ["b", "c"] {
        mock.finish_last();
        state.pump(now);
        assert_eq!(mock.spoken().last().unwrap().text, expected);
    }
    mock.finish_last();
    state.pump(now);
    assert!(!state.is_speaking());
}

#[test]
fn test_uses_selected_voice() {
    let (mut state, mock) = state_with(&["hi"], "0");
    assert!(state.next_voice());
    state.start().unwrap();
    assert_eq!(mock.spoken()[0].voice.as_deref(), Some("v1"));
}

#[test]
fn test_stop_cancels_and_returns_to_idle() {
    let (mut state, mock) = state_with(&["a", "b"], "5");
    let now = Instant::now();
    state.start().unwrap();

    assert!(state.stop().unwrap());
    assert_eq!(state.playback_state(), PlaybackState::Idle);
    assert_eq!(mock.cancels(), 1);

    // A late end signal from the cancelled utterance changes nothing
    mock.finish_last();
    state.pump(now + Duration::from_secs(10));
    assert_eq!(mock.spoken().len(), 1);
    assert!(!state.is_speaking());
}

#[test]
fn test_drop_mid_run_cancels_speech() {
    let (mut state, mock) = state_with(&["a"], "0");
    state.start().unwrap();
    drop(state);
    assert_eq!(mock.cancels(), 1);
}

#[test]
fn test_voices_changed_during_run() {
    let (mut state, mock) = state_with(&["a"], "0");
    state.start().unwrap();

    mock.set_voices(vec![common::voice("v9", true)]);
    state.pump(Instant::now());
    assert_eq!(state.voices.voices().len(), 1);
    assert!(state.is_speaking());
}
