//! Standard MIDI File encoder using midly
//!
//! Single note lists are written as format 0; hook sets as format 1 with a
//! tempo track followed by one named track per hook.

use crate::error::Result;
use hookaid_core::{Hook, Note};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_BEAT: u16 = 480;

/// Ticks per sixteenth (a quarter of a beat).
const TICKS_PER_SIXTEENTH: u32 = TICKS_PER_BEAT as u32 / 4;

/// Note-on velocity for every note
pub const NOTE_VELOCITY: u8 = 96;

/// Largest value a tempo meta event can hold
const MAX_TEMPO_MICROS: u32 = 0xFF_FFFF;

/// Microseconds per quarter note at `bpm`, saturating at the 24-bit limit
/// (about 3.6 BPM).
pub fn tempo_micros(bpm: f64) -> u32 {
    let micros = (60_000_000.0 / bpm.max(1.0)).round();
    (micros as u32).min(MAX_TEMPO_MICROS)
}

fn meta(kind: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(kind),
    }
}

fn midi(delta: u32, channel: u4, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi { channel, message },
    }
}

/// Tempo and 4/4 time signature at time 0.
fn push_tempo(track: &mut Track<'_>, bpm: f64) {
    track.push(meta(MetaMessage::Tempo(u24::new(tempo_micros(bpm)))));
    track.push(meta(MetaMessage::TimeSignature(4, 2, 24, 8)));
}

fn push_program(track: &mut Track<'_>, channel: u4, program: u8) {
    track.push(midi(
        0,
        channel,
        MidiMessage::ProgramChange {
            program: u7::new(program.min(127)),
        },
    ));
}

/// Append note on/off pairs ordered by (onset, pitch).
///
/// Each note-off directly follows its note-on. When a note would start before
/// the previous one ends, it is delayed to that end.
fn push_notes(track: &mut Track<'_>, notes: &[Note], channel: u4) {
    let mut ordered = notes.to_vec();
    ordered.sort_by_key(|n| (n.onset, n.pitch));

    let mut cursor: u32 = 0;
    for note in &ordered {
        let start = note.onset.saturating_mul(TICKS_PER_SIXTEENTH);
        let span = note.duration.saturating_mul(TICKS_PER_SIXTEENTH).max(1);
        let key = u7::new(note.pitch.min(127));

        track.push(midi(
            start.saturating_sub(cursor),
            channel,
            MidiMessage::NoteOn {
                key,
                vel: u7::new(NOTE_VELOCITY),
            },
        ));
        track.push(midi(
            span,
            channel,
            MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            },
        ));
        cursor = cursor.max(start).saturating_add(span);
    }
}

fn to_bytes(smf: &Smf<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Encode one note list as a format-0 file.
pub fn notes_to_midi_bytes(
    notes: &[Note],
    bpm: f64,
    program: u8,
    channel: u8,
) -> Result<Vec<u8>> {
    let channel = u4::new(channel % 16);
    let mut track: Track<'static> = Vec::new();
    push_tempo(&mut track, bpm);
    push_program(&mut track, channel, program);
    push_notes(&mut track, notes, channel);
    track.push(meta(MetaMessage::EndOfTrack));

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));
    smf.tracks.push(track);
    to_bytes(&smf)
}

/// Encode a hook set as a format-1 file.
///
/// Track 0 holds tempo and time signature. Hook *i* (1-based) gets a track
/// named `hook_i` on channel `(i - 1) % 16`.
pub fn hooks_to_midi_bytes(hooks: &[Hook], bpm: f64, program: u8) -> Result<Vec<u8>> {
    let names: Vec<String> = (1..=hooks.len()).map(|i| format!("hook_{}", i)).collect();

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));

    let mut tempo_track: Track<'_> = Vec::new();
    push_tempo(&mut tempo_track, bpm);
    tempo_track.push(meta(MetaMessage::EndOfTrack));
    smf.tracks.push(tempo_track);

    for (i, (hook, name)) in hooks.iter().zip(names.iter()).enumerate() {
        let channel = u4::new((i % 16) as u8);
        let mut track: Track<'_> = Vec::new();
        track.push(meta(MetaMessage::TrackName(name.as_bytes())));
        push_program(&mut track, channel, program);
        push_notes(&mut track, hook.notes(), channel);
        track.push(meta(MetaMessage::EndOfTrack));
        smf.tracks.push(track);
    }

    to_bytes(&smf)
}

/// Write a hook set to a format-1 file on disk.
pub fn write_multi_track(hooks: &[Hook], bpm: f64, path: &Path) -> Result<()> {
    let bytes = hooks_to_midi_bytes(hooks, bpm, 0)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
