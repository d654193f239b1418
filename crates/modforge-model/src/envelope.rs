//! Piecewise-linear instrument envelopes.
//!
//! Values are format-neutral: volume envelopes use 0..=64, panning and pitch
//! envelopes use -32..=32 with 0 as centre. Encoders shift them into each
//! format's own range.

use serde::{Deserialize, Serialize};

/// Highest volume envelope value.
pub const ENVELOPE_VOLUME_MAX: i8 = 64;

/// Magnitude bound of panning and pitch envelope values.
pub const ENVELOPE_OFFSET_MAX: i8 = 32;

/// Two points per cycle, within the XM point limit.
const TREMOLO_MAX_CYCLES: usize = 6;

/// What an envelope controls. Determines its legal value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Volume, 0..=64.
    Volume,
    /// Panning, -32..=32.
    Panning,
    /// Pitch or filter, -32..=32.
    Pitch,
}

impl EnvelopeKind {
    /// Inclusive value range.
    pub fn value_range(&self) -> (i8, i8) {
        match self {
            EnvelopeKind::Volume => (0, ENVELOPE_VOLUME_MAX),
            EnvelopeKind::Panning | EnvelopeKind::Pitch => {
                (-ENVELOPE_OFFSET_MAX, ENVELOPE_OFFSET_MAX)
            }
        }
    }

    /// Field name used in validation errors.
    pub fn field_name(&self) -> &'static str {
        match self {
            EnvelopeKind::Volume => "volume_envelope",
            EnvelopeKind::Panning => "panning_envelope",
            EnvelopeKind::Pitch => "pitch_envelope",
        }
    }
}

/// One envelope break point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Position in ticks.
    pub tick: u16,
    /// Value at this tick.
    pub value: i8,
}

impl EnvelopePoint {
    /// Create a point.
    pub fn new(tick: u16, value: i8) -> Self {
        Self { tick, value }
    }
}

/// An envelope with optional sustain point and loop.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Break points in non-decreasing tick order.
    pub points: Vec<EnvelopePoint>,
    /// Index of the sustain point.
    #[serde(default)]
    pub sustain: Option<u8>,
    /// Loop start and end point indices.
    #[serde(default)]
    pub loop_range: Option<(u8, u8)>,
    /// Whether players should apply the envelope.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Envelope {
    /// Create an enabled envelope from `(tick, value)` pairs.
    pub fn from_points(points: &[(u16, i8)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(tick, value)| EnvelopePoint::new(tick, value))
                .collect(),
            sustain: None,
            loop_range: None,
            enabled: true,
        }
    }

    /// ADSR volume shape: ramp to full, decay to `sustain_level`, hold, release to zero.
    ///
    /// Segment lengths are forced to at least one tick so that no two points
    /// share a tick.
    pub fn adsr(attack: u16, decay: u16, sustain_level: i8, release: u16) -> Self {
        let sustain_level = sustain_level.clamp(0, ENVELOPE_VOLUME_MAX);
        let attack_end = attack.max(1);
        let decay_end = attack_end.saturating_add(decay.max(1));
        let release_end = decay_end.saturating_add(release.max(1));

        Self {
            points: vec![
                EnvelopePoint::new(0, 0),
                EnvelopePoint::new(attack_end, ENVELOPE_VOLUME_MAX),
                EnvelopePoint::new(decay_end, sustain_level),
                EnvelopePoint::new(release_end, 0),
            ],
            sustain: Some(2),
            loop_range: None,
            enabled: true,
        }
    }

    /// Slow swell that holds at 50 and fades out over `release` ticks.
    pub fn pad(attack: u16, release: u16) -> Self {
        Self::adsr(attack, 0, 50, release)
    }

    /// Instant attack decaying to silence over `decay` ticks.
    pub fn pluck(decay: u16) -> Self {
        Self::adsr(0, decay, 0, 0)
    }

    /// Full volume while held, instant on and off.
    pub fn organ() -> Self {
        Self::adsr(0, 0, ENVELOPE_VOLUME_MAX, 0)
    }

    /// Looping volume oscillation between `high` and `low`, `speed` ticks per
    /// half cycle. Capped at six cycles so the envelope fits XM's 12 points.
    pub fn tremolo(speed: u16, low: i8, high: i8, cycles: usize) -> Self {
        let low = low.clamp(0, ENVELOPE_VOLUME_MAX);
        let high = high.clamp(0, ENVELOPE_VOLUME_MAX);
        let speed = speed.max(1);

        let mut points = Vec::new();
        let mut tick = 0u16;
        for _ in 0..cycles.clamp(1, TREMOLO_MAX_CYCLES) {
            points.push(EnvelopePoint::new(tick, high));
            tick = tick.saturating_add(speed);
            points.push(EnvelopePoint::new(tick, low));
            tick = tick.saturating_add(speed);
        }
        let last = (points.len() - 1) as u8;

        Self {
            points,
            sustain: None,
            loop_range: Some((0, last)),
            enabled: true,
        }
    }

    /// Set the sustain point.
    pub fn with_sustain(mut self, index: u8) -> Self {
        self.sustain = Some(index);
        self
    }

    /// Set the loop range.
    pub fn with_loop(mut self, start: u8, end: u8) -> Self {
        self.loop_range = Some((start, end));
        self
    }

    /// True when ticks never decrease.
    pub fn is_ordered(&self) -> bool {
        self.points.windows(2).all(|w| w[0].tick <= w[1].tick)
    }
}
