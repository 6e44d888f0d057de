//! Export integration tests
//!
//! Rendered audio and MIDI are decoded back with hound and midly.

mod helpers;

use helpers::tolerances::{FLOAT_EPSILON, INT16_EPSILON, LENGTH_TOLERANCE_SAMPLES};
use approx::assert_abs_diff_eq;
use helpers::*;
use hookaid::export::{
    hooks_to_midi_bytes, hooks_to_wav_bytes, notes_to_midi_bytes, notes_to_wav_bytes, render,
    render_mix, write_multi_track, RenderOptions, Renderer,
};
use hookaid::prelude::*;
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

fn hook_line() -> Vec<Note> {
    vec![
        Note::new(0, 1, 60),
        Note::new(3, 2, 63),
        Note::new(6, 1, 67),
        Note::new(10, 1, 65),
        Note::new(12, 2, 60),
    ]
}

fn expected_len(end_sixteenths: u32, bpm: f64, sample_rate: u32) -> usize {
    let unit = 60.0 / bpm / 4.0;
    ((end_sixteenths as f64 + 1.0) * unit * sample_rate as f64).ceil() as usize
}

#[test]
fn test_render_length_across_tempos() {
    for bpm in [60.0, 97.0, 123.0, 180.0] {
        let out = render(&hook_line(), bpm, TEST_SAMPLE_RATE);
        let expected = expected_len(14, bpm, TEST_SAMPLE_RATE);
        assert!(
            out.len().abs_diff(expected) <= LENGTH_TOLERANCE_SAMPLES,
            "{} BPM: {} vs {}",
            bpm,
            out.len(),
            expected
        );
    }
}

#[test]
fn test_empty_render_is_near_silent() {
    let out = render(&[], 120.0, TEST_SAMPLE_RATE);
    assert!(out.len() >= TEST_SAMPLE_RATE as usize / 10);
    assert_abs_diff_eq!(peak(&out), 0.0, epsilon = FLOAT_EPSILON);
}

#[test]
fn test_render_levels() {
    let out = render(&hook_line(), 120.0, TEST_SAMPLE_RATE);
    assert!(peak(&out) <= 0.35 + FLOAT_EPSILON);
    assert!(rms(&out) > 0.1);
}

#[test]
fn test_mix_of_identical_lists_equals_single() {
    let single = render(&hook_line(), 110.0, TEST_SAMPLE_RATE);
    for k in 1..=5 {
        let lists = vec![hook_line(); k];
        let mixed = render_mix(&lists, 110.0, TEST_SAMPLE_RATE);
        assert!(signals_approx_equal(&single, &mixed, FLOAT_EPSILON), "k = {}", k);
    }
}

#[test]
fn test_wav_matches_render() {
    let renderer = Renderer::new(RenderOptions::default());
    let notes = hook_line();
    let pcm = renderer.render(&notes, 100.0);
    let bytes = notes_to_wav_bytes(&renderer, &notes, 100.0).unwrap();

    let (spec, samples) = decode_wav(&bytes);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, TEST_SAMPLE_RATE);
    assert_eq!(samples.len(), pcm.len());
    for (&s, &x) in samples.iter().zip(pcm.iter()) {
        assert!((s as f32 / 32767.0 - x).abs() <= 2.0 * INT16_EPSILON);
    }
}

#[test]
fn test_combined_wav_length() {
    let renderer = Renderer::new(RenderOptions::with_sample_rate(16000));
    let hooks = vec![
        Hook::new(0, hook_line()),
        Hook::new(1, vec![Note::new(15, 2, 72)]),
        Hook::new(2, Vec::new()),
    ];
    let (spec, samples) = decode_wav(&hooks_to_wav_bytes(&renderer, &hooks, 120.0).unwrap());
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(samples.len(), expected_len(17, 120.0, 16000));
}

#[test]
fn test_midi_single_track() {
    let bytes = notes_to_midi_bytes(&hook_line(), 123.0, 81, 3).unwrap();
    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 1);

    let mut tick = 0u32;
    let mut on = Vec::new();
    for event in &smf.tracks[0] {
        tick += event.delta.as_int();
        if let TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn { key, vel },
        } = event.kind
        {
            assert_eq!(channel.as_int(), 3);
            assert_eq!(vel.as_int(), 96);
            on.push((tick, key.as_int()));
        }
    }
    assert_eq!(
        on,
        vec![(0, 60), (360, 63), (720, 67), (1200, 65), (1440, 60)]
    );
}

#[test]
fn test_midi_multi_track_file() {
    let hooks: Vec<Hook> = (0..5).map(|i| Hook::new(i, hook_line())).collect();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hooks.mid");
    write_multi_track(&hooks, 90.0, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, hooks_to_midi_bytes(&hooks, 90.0, 0).unwrap());

    let smf = Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 6);
    assert!(smf.tracks[0].iter().any(|e| matches!(
        e.kind,
        TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 666_667
    )));
    for (i, track) in smf.tracks[1..].iter().enumerate() {
        let name = format!("hook_{}", i + 1);
        assert!(track.iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Meta(MetaMessage::TrackName(n)) if n == name.as_bytes()
        )));
    }
}
