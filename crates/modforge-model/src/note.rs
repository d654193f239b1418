//! Pattern cell contents: keys, notes and effect commands.

use serde::{Deserialize, Serialize};

/// Semitone offsets for note letters.
const SEMITONES: [(char, u8); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

const NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Key column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Play a pitch, in semitones from C-0.
    Pitch(u8),
    /// Release the playing note (enter envelope release).
    Off,
    /// Stop the playing note immediately. IT only.
    Cut,
    /// Fade the playing note out. IT only.
    Fade,
}

impl Key {
    /// Parse a note name such as `C-4`, `C#4`, `Db3` or `C4`.
    ///
    /// Returns `None` for anything that is not a pitch in octaves 0-9.
    pub fn from_name(name: &str) -> Option<Self> {
        pitch_from_name(name).map(Key::Pitch)
    }

    /// Tracker-style display name (`C-4`, `===` for note-off).
    pub fn name(&self) -> String {
        match self {
            Key::Pitch(p) => format!("{}{}", NAMES[(*p % 12) as usize], p / 12),
            Key::Off => "===".to_string(),
            Key::Cut => "^^^".to_string(),
            Key::Fade => "~~~".to_string(),
        }
    }
}

/// Parse a note name into a semitone number (C-0 = 0).
pub fn pitch_from_name(name: &str) -> Option<u8> {
    let mut chars = name.trim().chars().peekable();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = SEMITONES.iter().find(|(c, _)| *c == letter)?.1 as i16;

    let accidental = match chars.peek() {
        Some('#') => {
            chars.next();
            1
        }
        Some('b') => {
            chars.next();
            -1
        }
        Some('-') => {
            chars.next();
            0
        }
        _ => 0,
    };

    let octave: String = chars.collect();
    let octave: i16 = octave.parse().ok()?;
    if !(0..=9).contains(&octave) {
        return None;
    }

    let pitch = octave * 12 + base + accidental;
    u8::try_from(pitch).ok().filter(|p| *p < 120)
}

/// Effect column command and parameter, in the target format's opcode space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Effect {
    /// Effect command number.
    pub command: u8,
    /// Effect parameter byte.
    pub param: u8,
}

impl Effect {
    /// Create an effect.
    pub fn new(command: u8, param: u8) -> Self {
        Self { command, param }
    }
}

/// One pattern cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Note {
    /// Key column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    /// 1-based instrument reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<u8>,
    /// Volume column byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    /// Effect column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

impl Note {
    /// An empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Play `key` with a 1-based instrument.
    pub fn play(key: Key, instrument: u8) -> Self {
        Self {
            key: Some(key),
            instrument: Some(instrument),
            ..Self::default()
        }
    }

    /// Play a named note (`C-4`). Unparseable names yield an empty key.
    pub fn from_name(name: &str, instrument: u8) -> Self {
        Self {
            key: Key::from_name(name),
            instrument: Some(instrument),
            ..Self::default()
        }
    }

    /// A note-off cell.
    pub fn off() -> Self {
        Self {
            key: Some(Key::Off),
            ..Self::default()
        }
    }

    /// A note-cut cell.
    pub fn cut() -> Self {
        Self {
            key: Some(Key::Cut),
            ..Self::default()
        }
    }

    /// Set the raw volume-column byte.
    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set the effect column.
    pub fn with_effect(mut self, command: u8, param: u8) -> Self {
        self.effect = Some(Effect::new(command, param));
        self
    }

    /// True when no column holds a value.
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.instrument.is_none()
            && self.volume.is_none()
            && self.effect.is_none()
    }
}
