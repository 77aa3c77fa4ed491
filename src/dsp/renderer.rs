//! WAV renderer — renders the engine's output to a WAV byte buffer.

use std::io::Cursor;

use crate::error::RenderError;

use super::engine::ToneEngine;

/// Frames rendered per engine call, matching an AudioWorklet quantum.
const BLOCK_FRAMES: usize = 128;
/// Size of the canonical WAV header in bytes.
const HEADER_BYTES: usize = 44;
/// Bytes per 16-bit stereo frame.
const FRAME_BYTES: usize = 4;
/// Longest render whose RIFF sizes still fit in 32 bits.
pub const MAX_WAV_FRAMES: usize = (u32::MAX as usize - HEADER_BYTES) / FRAME_BYTES;

/// Render `frames` stereo frames from `engine` as 16-bit PCM WAV bytes.
///
/// Sequence steps fire during rendering exactly as they would in a live
/// host. A disabled engine renders silence at the default sample rate.
pub fn render_wav(engine: &mut ToneEngine, frames: usize) -> Result<Vec<u8>, RenderError> {
    if frames > MAX_WAV_FRAMES {
        return Err(RenderError::TooLong {
            frames: frames as u64,
        });
    }
    let sample_rate = engine.sample_rate().unwrap_or(engine.config().sample_rate);
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_BYTES + frames * FRAME_BYTES));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        let mut block = vec![0.0_f32; BLOCK_FRAMES * 2];
        let mut remaining = frames;
        while remaining > 0 {
            let this_block = remaining.min(BLOCK_FRAMES);
            let buf = &mut block[..this_block * 2];
            engine.render(buf);
            for &s in buf.iter() {
                writer.write_sample(to_i16(s))?;
            }
            remaining -= this_block;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Render `seconds` of audio; see [`render_wav`]. Negative durations
/// render nothing.
pub fn render_wav_seconds(engine: &mut ToneEngine, seconds: f64) -> Result<Vec<u8>, RenderError> {
    if !seconds.is_finite() {
        return Err(RenderError::InvalidDuration(seconds));
    }
    let sample_rate = engine.sample_rate().unwrap_or(engine.config().sample_rate);
    let frames = (seconds.max(0.0) * sample_rate).round();
    if frames > MAX_WAV_FRAMES as f64 {
        return Err(RenderError::TooLong {
            frames: frames as u64,
        });
    }
    render_wav(engine, frames as usize)
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::request::PlaybackRequest;

    fn engine() -> ToneEngine {
        ToneEngine::new(EngineConfig::with_sample_rate(8000.0))
    }

    #[test]
    fn wav_header_valid() {
        let mut e = engine();
        e.play(&PlaybackRequest::plain(528.0, 0.5).unwrap());
        let wav = render_wav(&mut e, 100).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 200);
    }

    #[test]
    fn rendered_tone_is_not_silent() {
        let mut e = engine();
        e.play(&PlaybackRequest::plain(528.0, 0.5).unwrap());
        let wav = render_wav_seconds(&mut e, 0.25).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4000);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 15000 && peak <= 16500, "peak {peak}");
    }

    #[test]
    fn silence_when_idle() {
        let mut e = engine();
        let wav = render_wav(&mut e, 300).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
    }

    #[test]
    fn unbounded_durations_are_rejected() {
        let mut e = engine();
        e.play(&PlaybackRequest::plain(528.0, 0.5).unwrap());
        assert!(matches!(
            render_wav_seconds(&mut e, f64::INFINITY),
            Err(RenderError::InvalidDuration(_))
        ));
        assert!(matches!(
            render_wav_seconds(&mut e, f64::NAN),
            Err(RenderError::InvalidDuration(_))
        ));
        assert!(matches!(
            render_wav_seconds(&mut e, 1.0e30),
            Err(RenderError::TooLong { .. })
        ));
        assert!(matches!(
            render_wav(&mut e, MAX_WAV_FRAMES + 1),
            Err(RenderError::TooLong { .. })
        ));
        assert_eq!(e.elapsed_frames(), 0);
    }

    #[test]
    fn negative_duration_renders_empty_wav() {
        let mut e = engine();
        let wav = render_wav_seconds(&mut e, -1.0).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn sample_conversion_clamps() {
        assert_eq!(to_i16(2.0), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
        assert_eq!(to_i16(0.0), 0);
    }
}
