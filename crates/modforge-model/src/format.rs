//! Target tracker formats and their structural limits.

use serde::{Deserialize, Serialize};

/// Output format of an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// FastTracker II Extended Module.
    Xm,
    /// Impulse Tracker module.
    It,
}

impl Format {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Xm => "xm",
            Format::It => "it",
        }
    }

    /// Structural limits of this format.
    pub fn limits(&self) -> &'static FormatLimits {
        match self {
            Format::Xm => &XM_LIMITS,
            Format::It => &IT_LIMITS,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Xm => write!(f, "XM"),
            Format::It => write!(f, "IT"),
        }
    }
}

/// Fixed-width field bounds for one format.
///
/// Every value the validator checks against lives here, so a module that
/// passes validation never needs a field wider than the format allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatLimits {
    /// Maximum channel count.
    pub max_channels: u8,
    /// Minimum rows per pattern.
    pub min_rows: usize,
    /// Maximum rows per pattern.
    pub max_rows: usize,
    /// Maximum number of patterns.
    pub max_patterns: usize,
    /// Maximum number of instruments.
    pub max_instruments: usize,
    /// Maximum number of samples in the module.
    pub max_samples: usize,
    /// Maximum distinct samples one instrument may reference.
    pub max_samples_per_instrument: usize,
    /// Maximum order list entries.
    pub max_orders: usize,
    /// Maximum envelope break points.
    pub max_envelope_points: usize,
    /// Highest playable semitone (0 = C-0).
    pub max_pitch: u8,
    /// Ticks-per-row range.
    pub speed: (u8, u8),
    /// BPM range.
    pub tempo: (u16, u16),
    /// Highest legal effect command.
    pub max_effect: u8,
    /// Highest legal instrument fadeout.
    pub max_fadeout: u16,
}

/// XM limits (FastTracker II 2.08 / file version 1.04).
pub const XM_LIMITS: FormatLimits = FormatLimits {
    max_channels: 32,
    min_rows: 1,
    max_rows: 256,
    max_patterns: 256,
    max_instruments: 128,
    max_samples: 128 * 16,
    max_samples_per_instrument: 16,
    max_orders: 256,
    max_envelope_points: 12,
    max_pitch: 95,
    speed: (1, 31),
    tempo: (32, 255),
    max_effect: 35,
    max_fadeout: 0x0FFF,
};

/// IT limits (Impulse Tracker 2.14 compatible layout).
pub const IT_LIMITS: FormatLimits = FormatLimits {
    max_channels: 64,
    min_rows: 1,
    max_rows: 200,
    max_patterns: 200,
    max_instruments: 99,
    max_samples: 99,
    max_samples_per_instrument: 99,
    // One slot is reserved for the end-of-song marker.
    max_orders: 255,
    max_envelope_points: 25,
    max_pitch: 119,
    speed: (1, 255),
    tempo: (32, 255),
    max_effect: 26,
    max_fadeout: 1024,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_limits() {
        assert_eq!(Format::Xm.limits().max_channels, 32);
        assert_eq!(Format::It.limits().max_channels, 64);
    }

    #[test]
    fn extensions() {
        assert_eq!(Format::Xm.extension(), "xm");
        assert_eq!(Format::It.extension(), "it");
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&Format::It).unwrap();
        assert_eq!(json, "\"it\"");
        let parsed: Format = serde_json::from_str("\"xm\"").unwrap();
        assert_eq!(parsed, Format::Xm);
    }
}
