//! Pattern shape, order list and cell checks.

use crate::effect::{it, xm};
use crate::error::ValidationError;
use crate::format::{Format, FormatLimits};
use crate::module::Module;
use crate::note::{Key, Note};

/// Lowest XM volume-column byte with a meaning (set volume 0).
const XM_VOLUME_MIN: u8 = xm::volume::SET;

/// Highest IT volume-column byte (vibrato depth 9).
const IT_VOLUME_MAX: u8 = it::volume::VIBRATO_DEPTH + 9;

pub(super) fn validate_patterns(module: &Module, limits: &FormatLimits) -> Result<(), ValidationError> {
    let expected = module.num_channels as usize;

    for (index, pattern) in module.patterns.iter().enumerate() {
        let rows = pattern.num_rows();
        if rows < limits.min_rows || rows > limits.max_rows {
            return Err(ValidationError::PatternRowCount {
                pattern: index,
                rows,
                min: limits.min_rows,
                max: limits.max_rows,
            });
        }
        if let Some((row, cells)) = pattern
            .rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(ValidationError::PatternWidth {
                pattern: index,
                row,
                width: cells.len(),
                expected,
            });
        }
    }

    for (position, &pattern) in module.order.iter().enumerate() {
        if pattern as usize >= module.patterns.len() {
            return Err(ValidationError::OrderOutOfRange {
                position,
                pattern,
                patterns: module.patterns.len(),
            });
        }
    }

    Ok(())
}

pub(super) fn validate_notes(
    module: &Module,
    format: Format,
    limits: &FormatLimits,
) -> Result<(), ValidationError> {
    for (index, pattern) in module.patterns.iter().enumerate() {
        for (row, channel, note) in pattern.events() {
            validate_note(module, format, limits, note, index, row, channel)?;
        }
    }
    Ok(())
}

fn validate_note(
    module: &Module,
    format: Format,
    limits: &FormatLimits,
    note: &Note,
    pattern: usize,
    row: usize,
    channel: usize,
) -> Result<(), ValidationError> {
    if let Some(instrument) = note.instrument {
        if instrument == 0 || instrument as usize > module.instruments.len() {
            return Err(ValidationError::InstrumentOutOfRange {
                pattern,
                row,
                channel,
                instrument,
                count: module.instruments.len(),
            });
        }
    }

    if let Some(key) = note.key {
        let legal = match (format, key) {
            (_, Key::Pitch(p)) => p <= limits.max_pitch,
            (_, Key::Off) => true,
            (Format::It, Key::Cut | Key::Fade) => true,
            (Format::Xm, Key::Cut | Key::Fade) => false,
        };
        if !legal {
            return Err(ValidationError::InvalidKey {
                format,
                pattern,
                row,
                channel,
                key: key.name(),
            });
        }
    }

    if let Some(volume) = note.volume {
        let legal = match format {
            Format::Xm => volume >= XM_VOLUME_MIN,
            Format::It => volume <= IT_VOLUME_MAX,
        };
        if !legal {
            return Err(ValidationError::InvalidVolume {
                format,
                pattern,
                row,
                channel,
                volume,
            });
        }
    }

    if let Some(effect) = note.effect {
        // IT command 0 means "no effect" and cannot carry a parameter.
        let legal = match format {
            Format::Xm => effect.command <= limits.max_effect,
            Format::It => (1..=limits.max_effect).contains(&effect.command),
        };
        if !legal {
            return Err(ValidationError::InvalidEffect {
                format,
                pattern,
                row,
                channel,
                command: effect.command,
            });
        }
    }

    Ok(())
}
