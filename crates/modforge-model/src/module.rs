//! The top-level song.

use serde::{Deserialize, Serialize};

use crate::instrument::Instrument;
use crate::pattern::Pattern;
use crate::sample::Sample;

/// Centre of the 0..=64 panning range.
pub const PAN_CENTER: u8 = 32;

/// Full channel volume.
pub const CHANNEL_VOLUME_MAX: u8 = 64;

/// Initial pan and volume of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelDefaults {
    /// 0 (left) ..= 64 (right).
    pub panning: u8,
    /// 0..=64.
    pub volume: u8,
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            panning: PAN_CENTER,
            volume: CHANNEL_VOLUME_MAX,
        }
    }
}

/// A complete tracker song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Song title.
    pub name: String,
    /// Channel count.
    pub num_channels: u8,
    /// Per-channel pan/volume. Channels past the end of the list use
    /// [`ChannelDefaults::default`]. XM has no such table and ignores it.
    #[serde(default)]
    pub channel_defaults: Vec<ChannelDefaults>,
    /// Pattern pool.
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    /// Play order as indices into `patterns`; entries may repeat.
    #[serde(default)]
    pub order: Vec<u8>,
    /// Order position to jump to at song end.
    #[serde(default)]
    pub restart_position: u16,
    /// Instruments, referenced 1-based from pattern cells.
    #[serde(default)]
    pub instruments: Vec<Instrument>,
    /// Sample pool, referenced 0-based from instrument sample maps.
    #[serde(default)]
    pub samples: Vec<Sample>,
    /// Ticks per row.
    #[serde(default = "default_speed")]
    pub speed: u8,
    /// Beats per minute.
    #[serde(default = "default_tempo")]
    pub tempo: u16,
    /// Linear rather than Amiga frequency slides.
    #[serde(default = "default_linear")]
    pub linear_frequencies: bool,
    /// Free-text song message. IT only.
    #[serde(default)]
    pub message: Option<String>,
}

fn default_speed() -> u8 {
    6
}

fn default_tempo() -> u16 {
    125
}

fn default_linear() -> bool {
    true
}

impl Module {
    /// An empty module with speed 6 and 125 BPM.
    pub fn new(name: &str, num_channels: u8) -> Self {
        Self {
            name: name.to_string(),
            num_channels,
            channel_defaults: Vec::new(),
            patterns: Vec::new(),
            order: Vec::new(),
            restart_position: 0,
            instruments: Vec::new(),
            samples: Vec::new(),
            speed: default_speed(),
            tempo: default_tempo(),
            linear_frequencies: true,
            message: None,
        }
    }

    /// Append a pattern and return its index.
    pub fn add_pattern(&mut self, pattern: Pattern) -> usize {
        self.patterns.push(pattern);
        self.patterns.len() - 1
    }

    /// Append an instrument and return its 1-based note reference.
    pub fn add_instrument(&mut self, instrument: Instrument) -> usize {
        self.instruments.push(instrument);
        self.instruments.len()
    }

    /// Append a sample and return its 0-based index.
    pub fn add_sample(&mut self, sample: Sample) -> usize {
        self.samples.push(sample);
        self.samples.len() - 1
    }

    /// Set the play order.
    pub fn with_order(mut self, order: &[u8]) -> Self {
        self.order = order.to_vec();
        self
    }

    /// Set speed and tempo.
    pub fn with_timing(mut self, speed: u8, tempo: u16) -> Self {
        self.speed = speed;
        self.tempo = tempo;
        self
    }

    /// Set the song message.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Effective defaults of channel `index`.
    pub fn channel_default(&self, index: usize) -> ChannelDefaults {
        self.channel_defaults
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    /// Number of order entries.
    pub fn song_length(&self) -> usize {
        self.order.len()
    }
}
