// src/loader/wav.rs

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Result};
use hound::{SampleFormat, WavReader};

use crate::engine::SampleBuffer;
use crate::loader::dsp;
use crate::loader::{DecodedAudio, FormatHandler};

/// WAV handler backed by hound. Registered ahead of the symphonia handler so
/// the common "fresh recording dropped into the temp path" case takes the
/// cheap path.
pub struct WavHandler;

impl FormatHandler for WavHandler {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn can_decode(&self, path: &Path) -> bool {
        if path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false)
        {
            return true;
        }
        has_riff_header(path)
    }

    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            bail!("wav file reports zero channels");
        }

        let mut planar: Vec<Vec<f32>> =
            vec![Vec::with_capacity(reader.duration() as usize); channels];

        match spec.sample_format {
            SampleFormat::Float => {
                let interleaved = reader
                    .samples::<f32>()
                    .collect::<Result<Vec<f32>, _>>()?;
                dsp::append_interleaved_to_planar(&interleaved, &mut planar, channels);
            }
            SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                let interleaved = reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<Vec<f32>, _>>()?;
                dsp::append_interleaved_to_planar(&interleaved, &mut planar, channels);
            }
        }

        Ok(DecodedAudio {
            buffer: SampleBuffer::from_planar(planar),
            sample_rate: spec.sample_rate,
        })
    }
}

/// Signature sniff for files without a .wav extension.
fn has_riff_header(path: &Path) -> bool {
    let mut header = [0u8; 12];
    match File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE",
        Err(_) => false,
    }
}
