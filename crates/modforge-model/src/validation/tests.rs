use super::*;
use pretty_assertions::assert_eq;
use crate::envelope::Envelope;
use crate::instrument::{Instrument, KeyRange, NewNoteAction, PitchEnvelopeMode, SampleMap};
use crate::module::ChannelDefaults;
use crate::note::{Key, Note};
use crate::pattern::Pattern;
use crate::sample::{LoopMode, Sample, VibratoWaveform};

fn valid_module() -> Module {
    let mut module = Module::new("test", 4);
    module.add_sample(Sample::pcm16("tone", &[0, 1000, 0, -1000], 8363));
    module.add_instrument(Instrument::new("inst", 0));
    module.add_pattern(Pattern::empty(64, 4).with_note(0, 0, Note::from_name("C-4", 1)));
    module.with_order(&[0])
}

#[test]
fn accepts_valid_module_for_both_formats() {
    let module = valid_module();
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert_eq!(validate(&module, Format::It), Ok(()));
}

// =========================================================================
// Channels and header
// =========================================================================

#[test]
fn channel_limits_per_format() {
    let mut module = valid_module();
    module.num_channels = 32;
    module.patterns = vec![Pattern::empty(64, 32)];
    assert_eq!(validate(&module, Format::Xm), Ok(()));

    module.num_channels = 33;
    module.patterns = vec![Pattern::empty(64, 33)];
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::ChannelCountExceeded {
            format: Format::Xm,
            channels: 33,
            max: 32
        })
    );

    module.num_channels = 64;
    module.patterns = vec![Pattern::empty(64, 64)];
    assert_eq!(validate(&module, Format::It), Ok(()));

    module.num_channels = 65;
    module.patterns = vec![Pattern::empty(64, 65)];
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::ChannelCountExceeded { max: 64, .. })
    ));
}

#[test]
fn rejects_zero_channels() {
    let mut module = valid_module();
    module.num_channels = 0;
    assert_eq!(validate(&module, Format::It), Err(ValidationError::NoChannels));
}

#[test]
fn rejects_wide_channel_defaults() {
    let mut module = valid_module();
    module.channel_defaults = vec![ChannelDefaults::default(); 5];
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::ChannelDefaultsWidth { defaults: 5, channels: 4 })
    ));
}

#[test]
fn rejects_timing_out_of_range() {
    let module = valid_module().with_timing(32, 125);
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::InvalidSpeed { speed: 32, .. })
    ));
    assert_eq!(validate(&module, Format::It), Ok(()));

    let module = valid_module().with_timing(6, 31);
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::InvalidTempo { tempo: 31, .. })
    ));
}

#[test]
fn rejects_empty_order_and_bad_restart() {
    let module = valid_module().with_order(&[]);
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::InvalidSongLength { length: 0, .. })
    ));

    let mut module = valid_module();
    module.restart_position = 1;
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::RestartOutOfRange { restart: 1, song_length: 1 })
    ));
}

#[test]
fn song_message_is_it_only() {
    let module = valid_module().with_message("hello");
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::UnsupportedFeature { feature: "song message", .. })
    ));
}

// =========================================================================
// Patterns and cells
// =========================================================================

#[test]
fn rejects_row_counts_outside_format_bounds() {
    let mut module = valid_module();
    module.patterns = vec![Pattern::empty(256, 4)];
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert_eq!(
        validate(&module, Format::It),
        Err(ValidationError::PatternRowCount {
            pattern: 0,
            rows: 256,
            min: 1,
            max: 200
        })
    );

    module.patterns = vec![Pattern::empty(0, 4)];
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::PatternRowCount { rows: 0, .. })
    ));
}

#[test]
fn rejects_ragged_rows() {
    let mut module = valid_module();
    module.patterns[0].rows[5].pop();
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::PatternWidth {
            pattern: 0,
            row: 5,
            width: 3,
            expected: 4
        })
    );
}

#[test]
fn rejects_order_past_pattern_pool() {
    let module = valid_module().with_order(&[0, 1]);
    assert_eq!(
        validate(&module, Format::It),
        Err(ValidationError::OrderOutOfRange {
            position: 1,
            pattern: 1,
            patterns: 1
        })
    );
}

#[test]
fn rejects_unknown_instrument_reference() {
    let mut module = valid_module();
    module.patterns[0].set_note(3, 2, Note::play(Key::Pitch(48), 2));
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::InstrumentOutOfRange {
            pattern: 0,
            row: 3,
            channel: 2,
            instrument: 2,
            count: 1
        })
    );
}

#[test]
fn cut_and_high_keys_are_it_only() {
    let mut module = valid_module();
    module.patterns[0].set_note(1, 0, Note::cut());
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::InvalidKey { row: 1, .. })
    ));

    let mut module = valid_module();
    module.patterns[0].set_note(1, 0, Note::play(Key::Pitch(100), 1));
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(validate(&module, Format::Xm).is_err());
}

#[test]
fn volume_bytes_follow_format_encoding() {
    let mut module = valid_module();
    module.patterns[0].set_note(1, 0, Note::empty().with_volume(0x05));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::InvalidVolume { volume: 0x05, .. })
    ));
    assert_eq!(validate(&module, Format::It), Ok(()));

    module.patterns[0].set_note(1, 0, Note::empty().with_volume(0xE0));
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert!(validate(&module, Format::It).is_err());
}

#[test]
fn effect_commands_follow_format_range() {
    let mut module = valid_module();
    module.patterns[0].set_note(1, 0, Note::empty().with_effect(0, 0x37));
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::InvalidEffect { command: 0, .. })
    ));

    module.patterns[0].set_note(1, 0, Note::empty().with_effect(27, 0));
    assert!(validate(&module, Format::It).is_err());
    assert_eq!(validate(&module, Format::Xm), Ok(()));
}

// =========================================================================
// Instruments and envelopes
// =========================================================================

#[test]
fn rejects_dangling_sample_reference() {
    let mut module = valid_module();
    module.instruments[0] = Instrument::new("bad", 3);
    assert_eq!(
        validate(&module, Format::It),
        Err(ValidationError::SampleOutOfRange {
            instrument: 0,
            sample: 3,
            count: 1
        })
    );
}

#[test]
fn rejects_instrument_without_samples() {
    let mut module = valid_module();
    module.instruments[0].sample_map = SampleMap::Ranges(vec![]);
    for format in [Format::Xm, Format::It] {
        assert_eq!(
            validate(&module, format),
            Err(ValidationError::InstrumentHasNoSamples { instrument: 0 })
        );
    }
}

#[test]
fn key_ranges_must_fit_format() {
    let mut module = valid_module();
    module.instruments[0] = Instrument::multi_sample(
        "split",
        vec![KeyRange { low: 60, high: 110, sample: 0 }],
    );
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::InvalidKeyRange { high: 110, max_pitch: 95, .. })
    ));
}

#[test]
fn xm_caps_samples_per_instrument() {
    let mut module = valid_module();
    module.samples = (0..17).map(|i| Sample::pcm8(&format!("s{i}"), vec![128; 8], 8363)).collect();
    let ranges = (0..17u8)
        .map(|i| KeyRange { low: i, high: i, sample: i as usize })
        .collect();
    module.instruments[0] = Instrument::multi_sample("wide", ranges);
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::TooManyInstrumentSamples { count: 17, max: 16, .. })
    ));
    assert_eq!(validate(&module, Format::It), Ok(()));
}

#[test]
fn it_only_instrument_features_refused_by_xm() {
    let mut module = valid_module();
    module.instruments[0] = Instrument::new("nna", 0).with_new_note_action(NewNoteAction::Fade);
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::UnsupportedFeature { feature: "new note action", .. })
    ));

    module.instruments[0] = Instrument::new("pitch", 0)
        .with_pitch_envelope(Envelope::from_points(&[(0, 0), (10, 16)]), PitchEnvelopeMode::Filter);
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::UnsupportedFeature { feature: "pitch envelope", .. })
    ));
}

#[test]
fn envelope_point_limit_per_format() {
    let points: Vec<(u16, i8)> = (0..13).map(|i| (i * 4, 32)).collect();
    let mut module = valid_module();
    module.instruments[0] =
        Instrument::new("env", 0).with_volume_envelope(Envelope::from_points(&points));
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::EnvelopeTooManyPoints {
            instrument: 0,
            envelope: "volume_envelope",
            points: 13,
            max: 12
        })
    );
}

#[test]
fn rejects_unordered_envelope() {
    let mut module = valid_module();
    module.instruments[0] = Instrument::new("env", 0)
        .with_volume_envelope(Envelope::from_points(&[(0, 64), (20, 32), (10, 0)]));
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::EnvelopeUnordered {
            instrument: 0,
            envelope: "volume_envelope",
            point: 2
        })
    );
}

#[test]
fn rejects_envelope_values_and_indices() {
    let mut module = valid_module();
    module.instruments[0] = Instrument::new("env", 0)
        .with_panning_envelope(Envelope::from_points(&[(0, 0), (10, 40)]));
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::EnvelopeValue { point: 1, value: 40, min: -32, max: 32, .. })
    ));

    module.instruments[0] = Instrument::new("env", 0)
        .with_volume_envelope(Envelope::from_points(&[(0, 0), (10, 64)]).with_sustain(2));
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::EnvelopeIndex { field: "sustain", index: 2, .. })
    ));

    module.instruments[0] = Instrument::new("env", 0)
        .with_volume_envelope(Envelope::from_points(&[(0, 0), (10, 64)]).with_loop(1, 0));
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::EnvelopeIndex { field: "loop_start", .. })
    ));
}

#[test]
fn enabled_envelope_needs_points() {
    let mut module = valid_module();
    module.instruments[0] =
        Instrument::new("env", 0).with_panning_envelope(Envelope::from_points(&[]));
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::EnvelopeEmpty {
            instrument: 0,
            envelope: "panning_envelope"
        })
    );

    let mut disabled = Envelope::from_points(&[]);
    disabled.enabled = false;
    module.instruments[0] = Instrument::new("env", 0).with_panning_envelope(disabled);
    assert_eq!(validate(&module, Format::Xm), Ok(()));
}

// =========================================================================
// Samples
// =========================================================================

#[test]
fn rejects_loop_past_buffer() {
    let mut module = valid_module();
    module.samples[0] = Sample::pcm16("s", &[0; 4], 8363).with_loop(LoopMode::Forward, 1, 5);
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::LoopOutOfBounds {
            sample: 0,
            loop_start: 1,
            loop_end: 5,
            frames: 4
        })
    );

    module.samples[0] = Sample::pcm16("s", &[0; 4], 8363).with_loop(LoopMode::PingPong, 0, 4);
    assert_eq!(validate(&module, Format::Xm), Ok(()));
}

#[test]
fn unlooped_samples_ignore_loop_fields() {
    let mut module = valid_module();
    module.samples[0] = Sample::pcm16("s", &[0; 4], 8363).with_loop(LoopMode::None, 10, 2);
    assert_eq!(validate(&module, Format::It), Ok(()));
}

#[test]
fn refuses_compressed_samples() {
    let mut module = valid_module();
    module.samples[0].compressed = true;
    for format in [Format::Xm, Format::It] {
        assert!(matches!(
            validate(&module, format),
            Err(ValidationError::UnsupportedFeature { entity: "sample", index: 0, .. })
        ));
    }
}

#[test]
fn rejects_sample_ranges() {
    let mut module = valid_module();
    module.samples[0].volume = 65;
    assert_eq!(
        validate(&module, Format::It),
        Err(ValidationError::ValueOutOfRange {
            entity: "sample",
            index: 0,
            field: "volume",
            value: 65,
            max: 64
        })
    );

    let mut module = valid_module();
    module.samples[0].sample_rate = 0;
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::ZeroSampleRate { sample: 0 })
    );
}

#[test]
fn rejects_tuning_outside_format_fields() {
    let mut module = valid_module();
    module.samples[0].sample_rate = 8363;
    module.samples[0].relative_note = 127;
    module.samples[0].finetune = 127;
    assert_eq!(
        validate(&module, Format::Xm),
        Err(ValidationError::TuningOutOfRange {
            format: Format::Xm,
            sample: 0,
            sample_rate: 8363,
            relative_note: 127,
            finetune: 127
        })
    );
    assert_eq!(validate(&module, Format::It), Ok(()));

    let mut module = valid_module();
    module.samples[0].sample_rate = u32::MAX;
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::TuningOutOfRange { sample: 0, .. })
    ));
    module.samples[0].relative_note = 12;
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::TuningOutOfRange { format: Format::It, .. })
    ));
}

#[test]
fn vibrato_waveforms_per_format() {
    let mut module = valid_module();
    module.samples[0].vibrato.waveform = VibratoWaveform::Random;
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(validate(&module, Format::Xm).is_err());

    module.samples[0].vibrato.waveform = VibratoWaveform::RampUp;
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert!(validate(&module, Format::It).is_err());

    module.samples[0].vibrato.waveform = VibratoWaveform::Sine;
    module.samples[0].vibrato.depth = 32;
    assert_eq!(validate(&module, Format::It), Ok(()));
    assert!(matches!(
        validate(&module, Format::Xm),
        Err(ValidationError::ValueOutOfRange { field: "vibrato.depth", .. })
    ));
}

#[test]
fn rejects_odd_sixteen_bit_buffer() {
    let mut module = valid_module();
    module.samples[0].data.push(0);
    assert_eq!(
        validate(&module, Format::It),
        Err(ValidationError::BitDepthMismatch { sample: 0, bytes: 9 })
    );
}

#[test]
fn restart_position_is_xm_only() {
    let mut module = valid_module().with_order(&[0, 0]);
    module.restart_position = 1;
    assert_eq!(validate(&module, Format::Xm), Ok(()));
    assert!(matches!(
        validate(&module, Format::It),
        Err(ValidationError::UnsupportedFeature { feature: "restart position", .. })
    ));
}
