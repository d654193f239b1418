//! Instrument, sample map and envelope checks.

use super::header::check_max;
use crate::envelope::{Envelope, EnvelopeKind};
use crate::error::ValidationError;
use crate::format::{Format, FormatLimits};
use crate::instrument::{Instrument, NewNoteAction, SampleMap};
use crate::module::Module;

pub(super) fn validate_instruments(
    module: &Module,
    format: Format,
    limits: &FormatLimits,
) -> Result<(), ValidationError> {
    for (index, instrument) in module.instruments.iter().enumerate() {
        validate_sample_map(module, limits, index, &instrument.sample_map)?;
        validate_format_features(format, index, instrument)?;

        check_max("instrument", index, "fadeout", instrument.fadeout, limits.max_fadeout)?;
        check_max("instrument", index, "global_volume", instrument.global_volume, 128)?;
        if let Some(pan) = instrument.default_pan {
            check_max("instrument", index, "default_pan", pan, 64)?;
        }
    }
    Ok(())
}

fn validate_sample_map(
    module: &Module,
    limits: &FormatLimits,
    index: usize,
    map: &SampleMap,
) -> Result<(), ValidationError> {
    if let SampleMap::Ranges(ranges) = map {
        for range in ranges {
            if range.low > range.high || range.high > limits.max_pitch {
                return Err(ValidationError::InvalidKeyRange {
                    instrument: index,
                    low: range.low,
                    high: range.high,
                    max_pitch: limits.max_pitch,
                });
            }
        }
    }

    let samples = map.samples();
    if samples.is_empty() {
        return Err(ValidationError::InstrumentHasNoSamples { instrument: index });
    }
    if let Some(&sample) = samples.iter().find(|&&s| s >= module.samples.len()) {
        return Err(ValidationError::SampleOutOfRange {
            instrument: index,
            sample,
            count: module.samples.len(),
        });
    }
    if samples.len() > limits.max_samples_per_instrument {
        return Err(ValidationError::TooManyInstrumentSamples {
            instrument: index,
            count: samples.len(),
            max: limits.max_samples_per_instrument,
        });
    }
    Ok(())
}

fn validate_format_features(
    format: Format,
    index: usize,
    instrument: &Instrument,
) -> Result<(), ValidationError> {
    if format != Format::Xm {
        return Ok(());
    }

    let unsupported = |feature| ValidationError::UnsupportedFeature {
        format,
        entity: "instrument",
        index,
        feature,
    };
    if instrument.pitch_envelope.is_some() {
        return Err(unsupported("pitch envelope"));
    }
    if instrument.new_note_action != NewNoteAction::Cut {
        return Err(unsupported("new note action"));
    }
    Ok(())
}

pub(super) fn validate_envelopes(module: &Module, limits: &FormatLimits) -> Result<(), ValidationError> {
    for (index, instrument) in module.instruments.iter().enumerate() {
        let envelopes = [
            (EnvelopeKind::Volume, &instrument.volume_envelope),
            (EnvelopeKind::Panning, &instrument.panning_envelope),
            (EnvelopeKind::Pitch, &instrument.pitch_envelope),
        ];
        for (kind, envelope) in envelopes {
            if let Some(envelope) = envelope {
                validate_envelope(limits, index, kind, envelope)?;
            }
        }
    }
    Ok(())
}

fn validate_envelope(
    limits: &FormatLimits,
    instrument: usize,
    kind: EnvelopeKind,
    envelope: &Envelope,
) -> Result<(), ValidationError> {
    let name = kind.field_name();
    let points = envelope.points.len();

    if envelope.enabled && points == 0 {
        return Err(ValidationError::EnvelopeEmpty {
            instrument,
            envelope: name,
        });
    }

    if points > limits.max_envelope_points {
        return Err(ValidationError::EnvelopeTooManyPoints {
            instrument,
            envelope: name,
            points,
            max: limits.max_envelope_points,
        });
    }

    if let Some(point) = envelope
        .points
        .windows(2)
        .position(|w| w[1].tick < w[0].tick)
    {
        return Err(ValidationError::EnvelopeUnordered {
            instrument,
            envelope: name,
            point: point + 1,
        });
    }

    let (min, max) = kind.value_range();
    for (point, p) in envelope.points.iter().enumerate() {
        if p.value < min || p.value > max {
            return Err(ValidationError::EnvelopeValue {
                instrument,
                envelope: name,
                point,
                value: p.value,
                min,
                max,
            });
        }
    }

    let index_error = |field, index| ValidationError::EnvelopeIndex {
        instrument,
        envelope: name,
        field,
        index,
        points,
    };
    if let Some(sustain) = envelope.sustain {
        if sustain as usize >= points {
            return Err(index_error("sustain", sustain));
        }
    }
    if let Some((start, end)) = envelope.loop_range {
        if end as usize >= points {
            return Err(index_error("loop_end", end));
        }
        if start > end {
            return Err(index_error("loop_start", start));
        }
    }

    Ok(())
}
