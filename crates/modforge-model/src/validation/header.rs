//! Channel and header-level checks.

use crate::error::ValidationError;
use crate::format::{Format, FormatLimits};
use crate::module::{Module, CHANNEL_VOLUME_MAX};

/// Longest IT song message, including its terminating NUL.
const IT_MAX_MESSAGE_BYTES: usize = u16::MAX as usize;

pub(super) fn validate_channels(
    module: &Module,
    format: Format,
    limits: &FormatLimits,
) -> Result<(), ValidationError> {
    if module.num_channels == 0 {
        return Err(ValidationError::NoChannels);
    }
    if module.num_channels > limits.max_channels {
        return Err(ValidationError::ChannelCountExceeded {
            format,
            channels: module.num_channels,
            max: limits.max_channels,
        });
    }
    if module.channel_defaults.len() > module.num_channels as usize {
        return Err(ValidationError::ChannelDefaultsWidth {
            defaults: module.channel_defaults.len(),
            channels: module.num_channels,
        });
    }
    for (index, defaults) in module.channel_defaults.iter().enumerate() {
        check_max("channel", index, "panning", defaults.panning, 64)?;
        check_max("channel", index, "volume", defaults.volume, CHANNEL_VOLUME_MAX)?;
    }
    Ok(())
}

pub(super) fn validate_header(
    module: &Module,
    format: Format,
    limits: &FormatLimits,
) -> Result<(), ValidationError> {
    let (min_speed, max_speed) = limits.speed;
    if !(min_speed..=max_speed).contains(&module.speed) {
        return Err(ValidationError::InvalidSpeed {
            speed: module.speed,
            min: min_speed,
            max: max_speed,
        });
    }

    let (min_tempo, max_tempo) = limits.tempo;
    if !(min_tempo..=max_tempo).contains(&module.tempo) {
        return Err(ValidationError::InvalidTempo {
            tempo: module.tempo,
            min: min_tempo,
            max: max_tempo,
        });
    }

    let song_length = module.song_length();
    if song_length == 0 || song_length > limits.max_orders {
        return Err(ValidationError::InvalidSongLength {
            length: song_length,
            max: limits.max_orders,
        });
    }
    if module.restart_position as usize >= song_length {
        return Err(ValidationError::RestartOutOfRange {
            restart: module.restart_position,
            song_length,
        });
    }
    if format == Format::It && module.restart_position != 0 {
        return Err(ValidationError::UnsupportedFeature {
            format,
            entity: "module",
            index: 0,
            feature: "restart position",
        });
    }

    if module.patterns.len() > limits.max_patterns {
        return Err(ValidationError::TooManyPatterns {
            format,
            count: module.patterns.len(),
            max: limits.max_patterns,
        });
    }
    if module.instruments.len() > limits.max_instruments {
        return Err(ValidationError::TooManyInstruments {
            format,
            count: module.instruments.len(),
            max: limits.max_instruments,
        });
    }
    if module.samples.len() > limits.max_samples {
        return Err(ValidationError::TooManySamples {
            format,
            count: module.samples.len(),
            max: limits.max_samples,
        });
    }

    if let Some(message) = &module.message {
        match format {
            Format::Xm => {
                return Err(ValidationError::UnsupportedFeature {
                    format,
                    entity: "module",
                    index: 0,
                    feature: "song message",
                });
            }
            Format::It => {
                if message.len() + 1 > IT_MAX_MESSAGE_BYTES {
                    return Err(ValidationError::ValueOutOfRange {
                        entity: "module",
                        index: 0,
                        field: "message",
                        value: (message.len() + 1) as u32,
                        max: IT_MAX_MESSAGE_BYTES as u32,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Fail with [`ValidationError::ValueOutOfRange`] when `value > max`.
pub(super) fn check_max<T: Into<u32> + Copy>(
    entity: &'static str,
    index: usize,
    field: &'static str,
    value: T,
    max: T,
) -> Result<(), ValidationError> {
    let (value, max) = (value.into(), max.into());
    if value > max {
        return Err(ValidationError::ValueOutOfRange {
            entity,
            index,
            field,
            value,
            max,
        });
    }
    Ok(())
}
