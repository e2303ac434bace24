// src/loader/probe.rs

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use symphonia::core::audio::SampleBuffer as SymphoniaSampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::engine::SampleBuffer;
use crate::loader::dsp;
use crate::loader::{DecodedAudio, FormatHandler};

const KNOWN_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "oga", "aac", "m4a", "mp4", "wav"];

/// Catch-all handler backed by symphonia's probe. Decodes the whole stream
/// eagerly into planar memory; this bounds peak memory by clip length, which
/// is fine for the short-clip use case.
pub struct SymphoniaHandler;

impl FormatHandler for SymphoniaHandler {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn can_decode(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| KNOWN_EXTENSIONS.iter().any(|k| ext.eq_ignore_ascii_case(k)))
            .unwrap_or(false)
    }

    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("no audio track found")?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .context("missing sample rate")?;
        let channels = track
            .codec_params
            .channels
            .context("missing channel layout")?
            .count();
        if channels == 0 {
            bail!("track reports zero channels");
        }

        let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;
        let mut sample_buf: Option<SymphoniaSampleBuffer<f32>> = None;
        let mut planar: Vec<Vec<f32>> = vec![Vec::new(); channels];

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    if sample_buf.is_none() {
                        let capacity = decoded.capacity() as u64;
                        sample_buf =
                            Some(SymphoniaSampleBuffer::<f32>::new(capacity, *decoded.spec()));
                    }
                    let buf = sample_buf.as_mut().unwrap();
                    buf.copy_interleaved_ref(decoded);
                    dsp::append_interleaved_to_planar(buf.samples(), &mut planar, channels);
                }
                // Skip damaged packets like the streaming path does.
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(SymphoniaError::IoError(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(DecodedAudio {
            buffer: SampleBuffer::from_planar(planar),
            sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_only() {
        let handler = SymphoniaHandler;
        assert!(handler.can_decode(Path::new("clip.mp3")));
        assert!(handler.can_decode(Path::new("clip.FLAC")));
        assert!(handler.can_decode(Path::new("clip.wav")));
        assert!(!handler.can_decode(Path::new("clip.txt")));
        assert!(!handler.can_decode(Path::new("no_extension")));
    }

    #[test]
    fn rejects_zero_channel_wav_without_panicking() {
        // Minimal PCM WAV header claiming zero channels.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&0u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&44100u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&0u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let path = std::env::temp_dir().join("waveplayer_probe_zero_channels.wav");
        std::fs::write(&path, &bytes).unwrap();

        assert!(SymphoniaHandler.decode(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn decodes_wav_fixture() {
        let path = std::env::temp_dir().join("waveplayer_symphonia_decode_test.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(8192i16).unwrap();
            writer.write_sample(-8192i16).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = SymphoniaHandler.decode(&path).unwrap();
        assert_eq!(decoded.sample_rate, 22050);
        assert_eq!(decoded.buffer.channel_count(), 2);
        assert_eq!(decoded.buffer.frame_count(), 100);
        assert!(decoded.buffer.channel(0)[0] > 0.2);
        assert!(decoded.buffer.channel(1)[0] < -0.2);
        let _ = std::fs::remove_file(&path);
    }
}
