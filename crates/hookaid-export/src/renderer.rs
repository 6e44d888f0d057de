//! Offline sine-tone renderer
//!
//! Notes are placed on a sixteenth-note grid at a fixed tempo and rendered
//! additively, so overlapping notes layer rather than cut each other off.

use crate::options::RenderOptions;
use hookaid_core::Note;
use std::f64::consts::PI;

/// Seconds per sixteenth note at `bpm` (tempos below 1 are treated as 1).
pub fn sixteenth_seconds(bpm: f64) -> f64 {
    60.0 / bpm.max(1.0) / 4.0
}

/// Offline renderer for note lists
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn sample_rate(&self) -> u32 {
        self.options.sample_rate
    }

    /// Render one note list to mono samples in [-1, 1].
    ///
    /// The buffer runs one sixteenth past the latest note end. An empty list
    /// yields silence lasting one sixteenth or 0.1 s, whichever is longer.
    pub fn render(&self, notes: &[Note], bpm: f64) -> Vec<f32> {
        let sr = self.options.sample_rate as f64;
        let unit = sixteenth_seconds(bpm);

        let Some(end) = notes.iter().map(Note::end).max() else {
            let len = ((sr * unit) as usize).max(self.options.sample_rate as usize / 10);
            return vec![0.0; len];
        };

        let total_secs = end as f64 * unit + unit;
        let total = ((total_secs * sr).ceil() as usize).max(1);
        let mut out = vec![0.0f32; total];

        for note in notes {
            self.render_note(note, unit, &mut out);
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
        out
    }

    /// Add one enveloped sine tone into `out`, clipped to its length.
    fn render_note(&self, note: &Note, unit: f64, out: &mut [f32]) {
        let sr = self.options.sample_rate as f64;
        let start = (note.onset as f64 * unit * sr).round() as usize;
        let span = ((note.duration as f64 * unit * sr).round() as usize).max(1);
        let end = start.saturating_add(span).min(out.len());
        if end <= start {
            return;
        }

        let len = end - start;
        let attack = self.options.attack_samples().min(len);
        let release = self.options.release_samples().min(len);
        let step = 2.0 * PI * note.frequency() / sr;
        let gain = self.options.gain as f64;

        for (i, sample) in out[start..end].iter_mut().enumerate() {
            let mut env = 1.0;
            if i < attack {
                env *= i as f64 / attack as f64;
            }
            let from_end = len - i;
            if from_end <= release {
                env *= 1.0 - (release - from_end) as f64 / release as f64;
            }
            *sample += (gain * (step * i as f64).sin() * env) as f32;
        }
    }

    /// Render each list, zero-pad to the longest, and average.
    ///
    /// The sum is divided by the number of lists when there is more than one,
    /// then clipped to [-1, 1].
    pub fn render_mix<N: AsRef<[Note]>>(&self, lists: &[N], bpm: f64) -> Vec<f32> {
        let tracks: Vec<Vec<f32>> = lists
            .iter()
            .map(|notes| self.render(notes.as_ref(), bpm))
            .collect();
        mix_down(&tracks)
    }
}

/// Sum buffers of any length into one, averaging when there are several.
pub fn mix_down(tracks: &[Vec<f32>]) -> Vec<f32> {
    let len = tracks.iter().map(Vec::len).max().unwrap_or(0);
    let mut mix = vec![0.0f32; len];
    for track in tracks {
        for (m, s) in mix.iter_mut().zip(track.iter()) {
            *m += s;
        }
    }
    if tracks.len() > 1 {
        let k = tracks.len() as f32;
        for m in mix.iter_mut() {
            *m /= k;
        }
    }
    for m in mix.iter_mut() {
        *m = m.clamp(-1.0, 1.0);
    }
    mix
}

/// Render `notes` at `bpm` with default tone settings.
pub fn render(notes: &[Note], bpm: f64, sample_rate: u32) -> Vec<f32> {
    Renderer::new(RenderOptions::with_sample_rate(sample_rate)).render(notes, bpm)
}

/// Render and average several note lists with default tone settings.
pub fn render_mix<N: AsRef<[Note]>>(lists: &[N], bpm: f64, sample_rate: u32) -> Vec<f32> {
    Renderer::new(RenderOptions::with_sample_rate(sample_rate)).render_mix(lists, bpm)
}
