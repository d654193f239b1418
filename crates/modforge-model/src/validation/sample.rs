//! Sample checks.

use super::header::check_max;
use crate::error::ValidationError;
use crate::format::Format;
use crate::module::Module;
use crate::pitch::{it_c5_speed, xm_pitch_correction};
use crate::sample::{BitDepth, LoopMode, Sample, VibratoWaveform, SAMPLE_VOLUME_MAX};

pub(super) fn validate_samples(module: &Module, format: Format) -> Result<(), ValidationError> {
    for (index, sample) in module.samples.iter().enumerate() {
        validate_loop(index, sample)?;

        if sample.compressed {
            return Err(ValidationError::UnsupportedFeature {
                format,
                entity: "sample",
                index,
                feature: "compressed sample data",
            });
        }
        if sample.sample_rate == 0 {
            return Err(ValidationError::ZeroSampleRate { sample: index });
        }
        validate_tuning(format, index, sample)?;

        check_max("sample", index, "volume", sample.volume, SAMPLE_VOLUME_MAX)?;
        check_max("sample", index, "global_volume", sample.global_volume, SAMPLE_VOLUME_MAX)?;
        if let Some(panning) = sample.panning {
            check_max("sample", index, "panning", panning, 64)?;
        }

        validate_vibrato(format, index, sample)?;
    }
    Ok(())
}

fn validate_loop(index: usize, sample: &Sample) -> Result<(), ValidationError> {
    if sample.loop_mode == LoopMode::None {
        return Ok(());
    }
    let frames = sample.frames();
    if sample.loop_start >= sample.loop_end || sample.loop_end as usize > frames {
        return Err(ValidationError::LoopOutOfBounds {
            sample: index,
            loop_start: sample.loop_start,
            loop_end: sample.loop_end,
            frames,
        });
    }
    Ok(())
}

fn validate_tuning(format: Format, index: usize, sample: &Sample) -> Result<(), ValidationError> {
    let fits = match format {
        Format::Xm => {
            xm_pitch_correction(sample.sample_rate, sample.relative_note, sample.finetune).is_some()
        }
        Format::It => {
            it_c5_speed(sample.sample_rate, sample.relative_note, sample.finetune).is_some()
        }
    };
    if fits {
        return Ok(());
    }
    Err(ValidationError::TuningOutOfRange {
        format,
        sample: index,
        sample_rate: sample.sample_rate,
        relative_note: sample.relative_note,
        finetune: sample.finetune,
    })
}

fn validate_vibrato(format: Format, index: usize, sample: &Sample) -> Result<(), ValidationError> {
    let vibrato = &sample.vibrato;
    let (max_depth, max_rate, unsupported) = match format {
        Format::Xm => (15u8, 63u8, VibratoWaveform::Random),
        Format::It => (64, 64, VibratoWaveform::RampUp),
    };

    if vibrato.waveform == unsupported {
        return Err(ValidationError::UnsupportedFeature {
            format,
            entity: "sample",
            index,
            feature: match unsupported {
                VibratoWaveform::Random => "random vibrato waveform",
                _ => "ramp-up vibrato waveform",
            },
        });
    }
    check_max("sample", index, "vibrato.depth", vibrato.depth, max_depth)?;
    check_max("sample", index, "vibrato.rate", vibrato.rate, max_rate)?;
    Ok(())
}

pub(super) fn validate_bit_depths(module: &Module) -> Result<(), ValidationError> {
    for (index, sample) in module.samples.iter().enumerate() {
        if sample.bit_depth == BitDepth::Sixteen && sample.data.len() % 2 != 0 {
            return Err(ValidationError::BitDepthMismatch {
                sample: index,
                bytes: sample.data.len(),
            });
        }
    }
    Ok(())
}
