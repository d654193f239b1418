//! Instruments: key-to-sample maps, envelopes and voice policy.

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// What happens to a still-sounding voice when a new note arrives on its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewNoteAction {
    /// Stop the old voice. The only behaviour XM knows.
    #[default]
    Cut,
    /// Let the old voice keep playing.
    Continue,
    /// Send the old voice a note-off.
    NoteOff,
    /// Fade the old voice out.
    Fade,
}

/// Whether the IT pitch envelope drives pitch or the resonant filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchEnvelopeMode {
    /// Envelope bends pitch.
    #[default]
    Pitch,
    /// Envelope sweeps the filter cutoff.
    Filter,
}

/// Inclusive key range played by one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    /// Lowest semitone.
    pub low: u8,
    /// Highest semitone.
    pub high: u8,
    /// 0-based index into the module's sample list.
    pub sample: usize,
}

/// Which sample plays for each key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMap {
    /// Every key plays the same sample.
    Single(usize),
    /// Key ranges map to distinct samples. Keys outside every range play nothing
    /// in IT and the instrument's first sample in XM.
    Ranges(Vec<KeyRange>),
}

impl SampleMap {
    /// Distinct sample indices in order of first appearance.
    pub fn samples(&self) -> Vec<usize> {
        match self {
            SampleMap::Single(sample) => vec![*sample],
            SampleMap::Ranges(ranges) => {
                let mut seen = Vec::new();
                for range in ranges {
                    if !seen.contains(&range.sample) {
                        seen.push(range.sample);
                    }
                }
                seen
            }
        }
    }

    /// Sample played by `pitch`, if any.
    pub fn sample_for(&self, pitch: u8) -> Option<usize> {
        match self {
            SampleMap::Single(sample) => Some(*sample),
            SampleMap::Ranges(ranges) => ranges
                .iter()
                .find(|r| (r.low..=r.high).contains(&pitch))
                .map(|r| r.sample),
        }
    }
}

impl Default for SampleMap {
    fn default() -> Self {
        SampleMap::Single(0)
    }
}

/// An instrument definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Display name.
    pub name: String,
    /// Key to sample mapping.
    #[serde(default)]
    pub sample_map: SampleMap,
    /// Volume envelope.
    #[serde(default)]
    pub volume_envelope: Option<Envelope>,
    /// Panning envelope.
    #[serde(default)]
    pub panning_envelope: Option<Envelope>,
    /// Pitch or filter envelope. IT only.
    #[serde(default)]
    pub pitch_envelope: Option<Envelope>,
    /// Interpretation of the pitch envelope.
    #[serde(default)]
    pub pitch_envelope_mode: PitchEnvelopeMode,
    /// New-note action. IT only; XM behaves as [`NewNoteAction::Cut`].
    #[serde(default)]
    pub new_note_action: NewNoteAction,
    /// Volume fadeout speed after note-off.
    #[serde(default)]
    pub fadeout: u16,
    /// Instrument global volume, 0..=128. IT only.
    #[serde(default = "default_global_volume")]
    pub global_volume: u8,
    /// Default pan, 0..=64. IT only.
    #[serde(default)]
    pub default_pan: Option<u8>,
}

fn default_global_volume() -> u8 {
    128
}

impl Instrument {
    /// An instrument playing one sample across the whole keyboard.
    pub fn new(name: &str, sample: usize) -> Self {
        Self {
            name: name.to_string(),
            sample_map: SampleMap::Single(sample),
            volume_envelope: None,
            panning_envelope: None,
            pitch_envelope: None,
            pitch_envelope_mode: PitchEnvelopeMode::Pitch,
            new_note_action: NewNoteAction::Cut,
            fadeout: 0,
            global_volume: 128,
            default_pan: None,
        }
    }

    /// An instrument with key ranges.
    pub fn multi_sample(name: &str, ranges: Vec<KeyRange>) -> Self {
        Self {
            sample_map: SampleMap::Ranges(ranges),
            ..Self::new(name, 0)
        }
    }

    /// Set the volume envelope.
    pub fn with_volume_envelope(mut self, envelope: Envelope) -> Self {
        self.volume_envelope = Some(envelope);
        self
    }

    /// Set the panning envelope.
    pub fn with_panning_envelope(mut self, envelope: Envelope) -> Self {
        self.panning_envelope = Some(envelope);
        self
    }

    /// Set the pitch envelope.
    pub fn with_pitch_envelope(mut self, envelope: Envelope, mode: PitchEnvelopeMode) -> Self {
        self.pitch_envelope = Some(envelope);
        self.pitch_envelope_mode = mode;
        self
    }

    /// Set the new-note action.
    pub fn with_new_note_action(mut self, action: NewNoteAction) -> Self {
        self.new_note_action = action;
        self
    }

    /// Set the fadeout.
    pub fn with_fadeout(mut self, fadeout: u16) -> Self {
        self.fadeout = fadeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_map_covers_all_keys() {
        let map = SampleMap::Single(3);
        assert_eq!(map.samples(), vec![3]);
        assert_eq!(map.sample_for(0), Some(3));
        assert_eq!(map.sample_for(119), Some(3));
    }

    #[test]
    fn ranges_dedupe_samples() {
        let map = SampleMap::Ranges(vec![
            KeyRange { low: 0, high: 47, sample: 2 },
            KeyRange { low: 48, high: 59, sample: 0 },
            KeyRange { low: 60, high: 95, sample: 2 },
        ]);
        assert_eq!(map.samples(), vec![2, 0]);
        assert_eq!(map.sample_for(50), Some(0));
        assert_eq!(map.sample_for(100), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let inst: Instrument = serde_json::from_str(r#"{"name": "Lead"}"#).unwrap();
        assert_eq!(inst, Instrument::new("Lead", 0));
    }
}
