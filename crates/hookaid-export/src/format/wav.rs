//! WAV format encoder using hound
//!
//! Output is always 16-bit integer mono PCM.

use crate::error::Result;
use crate::renderer::Renderer;
use hookaid_core::{Hook, Note};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Convert float sample to 16-bit integer with clipping
#[inline]
pub fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}

fn write_mono_samples<W: Write + Seek>(writer: &mut WavWriter<W>, samples: &[f32]) -> Result<()> {
    for &sample in samples {
        writer.write_sample(float_to_i16(sample))?;
    }
    Ok(())
}

/// Encode mono audio to WAV in memory.
///
/// An empty buffer is written as 0.1 s of silence so the file always holds
/// at least one frame.
pub fn encode_wav_mono_memory(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let silence;
    let samples = if samples.is_empty() {
        silence = vec![0.0f32; (sample_rate / 10) as usize];
        &silence[..]
    } else {
        samples
    };

    let mut buffer = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), mono_spec(sample_rate))?;
        write_mono_samples(&mut writer, samples)?;
        writer.finalize()?;
    }
    Ok(buffer)
}

/// Encode mono audio to a WAV file.
pub fn encode_wav_mono_file(samples: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    let bytes = encode_wav_mono_memory(samples, sample_rate)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Render a note list and encode it as WAV bytes.
pub fn notes_to_wav_bytes(renderer: &Renderer, notes: &[Note], bpm: f64) -> Result<Vec<u8>> {
    let audio = renderer.render(notes, bpm);
    encode_wav_mono_memory(&audio, renderer.sample_rate())
}

/// Render the averaged mix of several hooks as WAV bytes.
///
/// With no hooks this encodes the empty-note render.
pub fn hooks_to_wav_bytes(renderer: &Renderer, hooks: &[Hook], bpm: f64) -> Result<Vec<u8>> {
    if hooks.is_empty() {
        return notes_to_wav_bytes(renderer, &[], bpm);
    }
    let lists: Vec<&[Note]> = hooks.iter().map(Hook::notes).collect();
    let mix = renderer.render_mix(&lists, bpm);
    encode_wav_mono_memory(&mix, renderer.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RenderOptions;

    fn read_back(bytes: &[u8]) -> (WavSpec, Vec<i16>) {
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        let samples = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        (spec, samples)
    }

    #[test]
    fn test_float_to_i16() {
        assert_eq!(float_to_i16(0.0), 0);
        assert_eq!(float_to_i16(1.0), 32767);
        assert_eq!(float_to_i16(-1.0), -32767);
        assert_eq!(float_to_i16(0.5), 16383);
        // Test clipping
        assert_eq!(float_to_i16(1.5), 32767);
        assert_eq!(float_to_i16(-1.5), -32767);
    }

    #[test]
    fn test_encode_wav_mono_memory() {
        let bytes = encode_wav_mono_memory(&[0.0, 0.5, -0.5], 22050).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let (spec, samples) = read_back(&bytes);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(samples, vec![0, 16383, -16383]);
    }

    #[test]
    fn test_empty_buffer_becomes_silence() {
        let (_, samples) = read_back(&encode_wav_mono_memory(&[], 22050).unwrap());
        assert_eq!(samples.len(), 2205);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_hooks_to_wav_bytes() {
        let renderer = Renderer::new(RenderOptions::default());
        let hooks = vec![
            Hook::new(0, vec![Note::new(0, 1, 60), Note::new(4, 1, 62)]),
            Hook::new(1, vec![Note::new(2, 2, 67)]),
        ];
        let (_, samples) = read_back(&hooks_to_wav_bytes(&renderer, &hooks, 120.0).unwrap());
        assert_eq!(samples.len(), renderer.render(hooks[0].notes(), 120.0).len());

        let (_, none) = read_back(&hooks_to_wav_bytes(&renderer, &[], 120.0).unwrap());
        assert_eq!(none.len(), 2756);
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        encode_wav_mono_file(&[0.25; 100], 8000, &path).unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 100);
        assert_eq!(reader.spec().sample_rate, 8000);
    }
}
