//! Raw PCM samples and WAV import.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SampleImportError;

/// Default sample volume.
pub const SAMPLE_VOLUME_MAX: u8 = 64;

/// Sample resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    /// 8-bit unsigned, 128 is silence.
    Eight,
    /// 16-bit signed little-endian.
    #[default]
    Sixteen,
}

impl BitDepth {
    /// Bytes per mono frame.
    pub fn bytes_per_frame(&self) -> usize {
        match self {
            BitDepth::Eight => 1,
            BitDepth::Sixteen => 2,
        }
    }
}

/// Loop behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    /// Play once.
    #[default]
    None,
    /// Jump from loop end back to loop start.
    Forward,
    /// Bounce between loop start and loop end.
    PingPong,
}

/// Auto-vibrato waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibratoWaveform {
    #[default]
    Sine,
    /// Alternates between full positive and negative depth.
    Square,
    /// Falls from full depth to its negative.
    RampDown,
    /// XM only.
    RampUp,
    /// IT only.
    Random,
}

/// Automatic vibrato applied while the sample plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AutoVibrato {
    /// Oscillator shape.
    pub waveform: VibratoWaveform,
    /// Ticks until full depth.
    pub sweep: u8,
    /// Pitch swing of the oscillator.
    pub depth: u8,
    /// Speed of the vibrato oscillator.
    pub rate: u8,
}

/// A mono PCM sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Display name.
    pub name: String,
    /// Declared resolution of `data`.
    pub bit_depth: BitDepth,
    /// PCM bytes: unsigned for 8-bit, little-endian signed for 16-bit.
    pub data: Vec<u8>,
    /// Playback rate of the reference pitch (C-4 in XM, C-5 in IT).
    pub sample_rate: u32,
    #[serde(default)]
    pub loop_mode: LoopMode,
    /// First looped frame.
    #[serde(default)]
    pub loop_start: u32,
    /// One past the last looped frame.
    #[serde(default)]
    pub loop_end: u32,
    /// Default volume, 0..=64.
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Sample global volume, 0..=64. IT only.
    #[serde(default = "default_volume")]
    pub global_volume: u8,
    /// Default panning, 0..=64.
    #[serde(default)]
    pub panning: Option<u8>,
    /// Tuning offset in 1/128 semitones, added on top of `sample_rate`.
    #[serde(default)]
    pub finetune: i8,
    /// Tuning offset in semitones, added on top of `sample_rate`.
    #[serde(default)]
    pub relative_note: i8,
    #[serde(default)]
    pub vibrato: AutoVibrato,
    /// Request IT sample compression. Neither encoder writes compressed data.
    #[serde(default)]
    pub compressed: bool,
}

fn default_volume() -> u8 {
    SAMPLE_VOLUME_MAX
}

impl Sample {
    fn with_data(name: &str, bit_depth: BitDepth, data: Vec<u8>, sample_rate: u32) -> Self {
        Self {
            name: name.to_string(),
            bit_depth,
            data,
            sample_rate,
            loop_mode: LoopMode::None,
            loop_start: 0,
            loop_end: 0,
            volume: SAMPLE_VOLUME_MAX,
            global_volume: SAMPLE_VOLUME_MAX,
            panning: None,
            finetune: 0,
            relative_note: 0,
            vibrato: AutoVibrato::default(),
            compressed: false,
        }
    }

    /// An 8-bit unsigned sample.
    pub fn pcm8(name: &str, data: Vec<u8>, sample_rate: u32) -> Self {
        Self::with_data(name, BitDepth::Eight, data, sample_rate)
    }

    /// A 16-bit signed sample.
    pub fn pcm16(name: &str, frames: &[i16], sample_rate: u32) -> Self {
        let mut data = Vec::with_capacity(frames.len() * 2);
        for frame in frames {
            data.extend_from_slice(&frame.to_le_bytes());
        }
        Self::with_data(name, BitDepth::Sixteen, data, sample_rate)
    }

    /// Set the loop.
    pub fn with_loop(mut self, mode: LoopMode, start: u32, end: u32) -> Self {
        self.loop_mode = mode;
        self.loop_start = start;
        self.loop_end = end;
        self
    }

    /// Set the default volume.
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    /// Number of whole frames in `data`.
    pub fn frames(&self) -> usize {
        self.data.len() / self.bit_depth.bytes_per_frame()
    }

    /// Decode 16-bit frames. Yields nothing for 8-bit samples.
    pub fn pcm16_frames(&self) -> impl Iterator<Item = i16> + '_ {
        let chunk = match self.bit_depth {
            BitDepth::Sixteen => self.data.as_slice(),
            BitDepth::Eight => &[],
        };
        chunk
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    /// Import a WAV stream as a mono sample.
    ///
    /// Integer PCM only. Multi-channel input is averaged down to mono; 8-bit
    /// input stays 8-bit, everything wider is reduced to 16-bit.
    pub fn from_wav_reader<R: Read>(name: &str, reader: R) -> Result<Self, SampleImportError> {
        let mut reader = hound::WavReader::new(reader)?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int {
            return Err(SampleImportError::UnsupportedFormat(format!(
                "{:?} samples are not supported, only integer PCM",
                spec.sample_format
            )));
        }

        let channels = spec.channels.max(1) as usize;
        match spec.bits_per_sample {
            8 => {
                let raw = reader.samples::<i8>().collect::<Result<Vec<_>, _>>()?;
                let mono = downmix(&raw, channels);
                let data = mono.iter().map(|&s| (s + 128) as u8).collect();
                Ok(Self::pcm8(name, data, spec.sample_rate))
            }
            16 => {
                let raw = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
                let mono: Vec<i16> = downmix(&raw, channels).iter().map(|&s| s as i16).collect();
                Ok(Self::pcm16(name, &mono, spec.sample_rate))
            }
            bits @ (24 | 32) => {
                let raw = reader.samples::<i32>().collect::<Result<Vec<_>, _>>()?;
                let shift = bits - 16;
                let mono: Vec<i16> = downmix(&raw, channels)
                    .iter()
                    .map(|&s| (s >> shift) as i16)
                    .collect();
                Ok(Self::pcm16(name, &mono, spec.sample_rate))
            }
            bits => Err(SampleImportError::UnsupportedFormat(format!(
                "{} bits per sample (supported: 8, 16, 24, 32)",
                bits
            ))),
        }
    }

    /// Import a WAV file; the file stem becomes the sample name.
    pub fn from_wav_path(path: &Path) -> Result<Self, SampleImportError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = std::fs::File::open(path)?;
        Self::from_wav_reader(&name, std::io::BufReader::new(file))
    }
}

/// Average interleaved channels into one.
fn downmix<T: Copy + Into<i32>>(samples: &[T], channels: usize) -> Vec<i32> {
    if channels == 1 {
        return samples.iter().map(|&s| s.into()).collect();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i64 = frame.iter().map(|&s| s.into() as i64).sum();
            (sum / channels as i64) as i32
        })
        .collect()
}
