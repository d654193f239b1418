//! Error types for module validation, parsing and sample import.

use thiserror::Error;

use crate::format::Format;

/// The first invariant a module violates for a target format.
///
/// Every variant names the entity and index it was found at, so callers can
/// point at the offending pattern cell, instrument or sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("module has no channels")]
    NoChannels,

    #[error("{channels} channels exceeds the {format} maximum of {max}")]
    ChannelCountExceeded {
        format: Format,
        channels: u8,
        max: u8,
    },

    #[error("{defaults} channel defaults given for a {channels}-channel module")]
    ChannelDefaultsWidth { defaults: usize, channels: u8 },

    #[error("speed {speed} outside {min}..={max}")]
    InvalidSpeed { speed: u8, min: u8, max: u8 },

    #[error("tempo {tempo} outside {min}..={max}")]
    InvalidTempo { tempo: u16, min: u16, max: u16 },

    #[error("song length {length} outside 1..={max}")]
    InvalidSongLength { length: usize, max: usize },

    #[error("restart position {restart} is not before song length {song_length}")]
    RestartOutOfRange { restart: u16, song_length: usize },

    #[error("{count} patterns exceeds the {format} maximum of {max}")]
    TooManyPatterns {
        format: Format,
        count: usize,
        max: usize,
    },

    #[error("{count} instruments exceeds the {format} maximum of {max}")]
    TooManyInstruments {
        format: Format,
        count: usize,
        max: usize,
    },

    #[error("{count} samples exceeds the {format} maximum of {max}")]
    TooManySamples {
        format: Format,
        count: usize,
        max: usize,
    },

    #[error("pattern {pattern}: {rows} rows outside {min}..={max}")]
    PatternRowCount {
        pattern: usize,
        rows: usize,
        min: usize,
        max: usize,
    },

    #[error("pattern {pattern} row {row}: {width} cells, expected {expected}")]
    PatternWidth {
        pattern: usize,
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("pattern {pattern}: packed size {size} does not fit in {max} bytes")]
    PatternTooLarge {
        pattern: usize,
        size: usize,
        max: usize,
    },

    #[error("order position {position} references pattern {pattern}, only {patterns} exist")]
    OrderOutOfRange {
        position: usize,
        pattern: u8,
        patterns: usize,
    },

    #[error(
        "pattern {pattern} row {row} channel {channel}: instrument {instrument} outside 1..={count}"
    )]
    InstrumentOutOfRange {
        pattern: usize,
        row: usize,
        channel: usize,
        instrument: u8,
        count: usize,
    },

    #[error("pattern {pattern} row {row} channel {channel}: {key} is not a legal {format} key")]
    InvalidKey {
        format: Format,
        pattern: usize,
        row: usize,
        channel: usize,
        key: String,
    },

    #[error("pattern {pattern} row {row} channel {channel}: volume byte {volume:#04x} is not legal in {format}")]
    InvalidVolume {
        format: Format,
        pattern: usize,
        row: usize,
        channel: usize,
        volume: u8,
    },

    #[error("pattern {pattern} row {row} channel {channel}: effect command {command} is not legal in {format}")]
    InvalidEffect {
        format: Format,
        pattern: usize,
        row: usize,
        channel: usize,
        command: u8,
    },

    #[error("instrument {instrument}: sample {sample} outside 0..{count}")]
    SampleOutOfRange {
        instrument: usize,
        sample: usize,
        count: usize,
    },

    #[error("instrument {instrument}: no sample references")]
    InstrumentHasNoSamples { instrument: usize },

    #[error("instrument {instrument} {envelope}: enabled with no points")]
    EnvelopeEmpty {
        instrument: usize,
        envelope: &'static str,
    },

    #[error("instrument {instrument}: key range {low}..={high} is inverted or above {max_pitch}")]
    InvalidKeyRange {
        instrument: usize,
        low: u8,
        high: u8,
        max_pitch: u8,
    },

    #[error("instrument {instrument}: {count} distinct samples exceeds the maximum of {max}")]
    TooManyInstrumentSamples {
        instrument: usize,
        count: usize,
        max: usize,
    },

    #[error("instrument {instrument} {envelope}: {points} points exceeds the maximum of {max}")]
    EnvelopeTooManyPoints {
        instrument: usize,
        envelope: &'static str,
        points: usize,
        max: usize,
    },

    #[error("instrument {instrument} {envelope}: point {point} tick goes backwards")]
    EnvelopeUnordered {
        instrument: usize,
        envelope: &'static str,
        point: usize,
    },

    #[error("instrument {instrument} {envelope}: point {point} value {value} outside {min}..={max}")]
    EnvelopeValue {
        instrument: usize,
        envelope: &'static str,
        point: usize,
        value: i8,
        min: i8,
        max: i8,
    },

    #[error("instrument {instrument} {envelope}: {field} index {index} outside {points} points")]
    EnvelopeIndex {
        instrument: usize,
        envelope: &'static str,
        field: &'static str,
        index: u8,
        points: usize,
    },

    #[error("sample {sample}: loop {loop_start}..{loop_end} outside {frames} frames")]
    LoopOutOfBounds {
        sample: usize,
        loop_start: u32,
        loop_end: u32,
        frames: usize,
    },

    #[error("sample {sample}: sample rate must be non-zero")]
    ZeroSampleRate { sample: usize },

    #[error(
        "sample {sample}: {sample_rate} Hz with relative note {relative_note} and finetune {finetune} does not fit the {format} tuning fields"
    )]
    TuningOutOfRange {
        format: Format,
        sample: usize,
        sample_rate: u32,
        relative_note: i8,
        finetune: i8,
    },

    #[error("sample {sample}: {bytes} bytes is not a whole number of 16-bit frames")]
    BitDepthMismatch { sample: usize, bytes: usize },

    #[error("{entity} {index}: {field} value {value} exceeds {max}")]
    ValueOutOfRange {
        entity: &'static str,
        index: usize,
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{entity} {index}: {feature} is not supported by {format}")]
    UnsupportedFeature {
        format: Format,
        entity: &'static str,
        index: usize,
        feature: &'static str,
    },
}

/// Error from parsing a JSON module description.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid module JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error from importing a WAV file as a sample.
#[derive(Debug, Error)]
pub enum SampleImportError {
    #[error("WAV read error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = ValidationError::InstrumentOutOfRange {
            pattern: 2,
            row: 7,
            channel: 1,
            instrument: 5,
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "pattern 2 row 7 channel 1: instrument 5 outside 1..=3"
        );

        let err = ValidationError::ChannelCountExceeded {
            format: Format::Xm,
            channels: 33,
            max: 32,
        };
        assert_eq!(err.to_string(), "33 channels exceeds the XM maximum of 32");
    }

    #[test]
    fn parse_error_wraps_validation() {
        let err: ParseError = ValidationError::NoChannels.into();
        assert_eq!(err.to_string(), "module has no channels");
    }
}
