//! Round-trip tests through the conformance readers, determinism checks and
//! packer/delta properties.

use modforge_model::{
    Effect, Envelope, Format, Instrument, Key, KeyRange, LoopMode, Module, Note, Pattern, Sample,
};
use modforge_tracker::it::{self, it_to_bytes};
use modforge_tracker::xm::{self, xm_to_bytes};
use modforge_tracker::{encode, read_it, read_xm};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// A module inside the lossless subset of both formats.
fn song() -> Module {
    let mut module = Module::new("Round Trip", 4).with_timing(5, 132);
    module.add_sample(Sample::pcm8("bass", (0..64).map(|i| (i * 4) as u8).collect(), 8363));
    module.add_sample(
        Sample::pcm16("lead", &[0, 1000, -1000, 32767, -32768, 5], 8363)
            .with_loop(LoopMode::Forward, 1, 6),
    );
    module.add_instrument(
        Instrument::new("bass", 0).with_volume_envelope(Envelope::adsr(2, 6, 48, 10)),
    );
    module.add_instrument(Instrument::multi_sample(
        "split",
        vec![
            KeyRange { low: 0, high: 47, sample: 0 },
            KeyRange { low: 48, high: 95, sample: 1 },
        ],
    ));
    module.add_pattern(
        Pattern::empty(16, 4)
            .with_note(0, 0, Note::from_name("C-3", 1).with_volume(0x30))
            .with_note(4, 1, Note::from_name("E-4", 2).with_effect(0x0C, 0x20))
            .with_note(8, 2, Note::from_name("G-4", 2))
            .with_note(12, 3, Note::off()),
    );
    module.add_pattern(Pattern::empty(32, 4).with_note(31, 0, Note::empty().with_effect(0x0F, 3)));
    module.with_order(&[0, 1, 0])
}

#[test]
fn test_xm_round_trip() {
    let module = song();
    let decoded = read_xm(&xm_to_bytes(&module).unwrap()).unwrap();

    assert_eq!(decoded.name, module.name);
    assert_eq!(decoded.num_channels, module.num_channels);
    assert_eq!(decoded.order, module.order);
    assert_eq!((decoded.speed, decoded.tempo), (5, 132));
    assert_eq!(decoded.patterns, module.patterns);
    // XM stores samples inside instruments, so the shared bass sample comes
    // back once per instrument.
    assert_eq!(decoded.samples.len(), 3);
    assert_eq!(decoded.samples[0], module.samples[0]);
    assert_eq!(decoded.samples[1..].to_vec(), module.samples);
    assert_eq!(decoded.instruments[0], module.instruments[0]);
}

#[test]
fn test_xm_reencode_is_byte_identical() {
    let first = xm_to_bytes(&song()).unwrap();
    let decoded = read_xm(&first).unwrap();
    let second = xm_to_bytes(&decoded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_it_reencode_is_byte_identical() {
    let module = song().with_message("written\nby hand");
    let first = it_to_bytes(&module).unwrap();
    let decoded = read_it(&first).unwrap();
    assert_eq!(decoded, module);
    assert_eq!(it_to_bytes(&decoded).unwrap(), first);
}

#[test]
fn test_encode_hash_is_deterministic() {
    for format in [Format::Xm, Format::It] {
        let a = encode(&song(), format).unwrap();
        let b = encode(&song(), format).unwrap();
        assert_eq!(a.hash, b.hash, "{} hash", format);
        assert_eq!(a.data, b.data);
        assert_eq!(a.extension, format.extension());
    }
}

#[test]
fn test_decoded_hash_matches() {
    let original = encode(&song(), Format::Xm).unwrap();
    let decoded = read_xm(&original.data).unwrap();
    assert_eq!(encode(&decoded, Format::Xm).unwrap().hash, original.hash);
}

// =============================================================================
// Properties
// =============================================================================

fn xm_note() -> impl Strategy<Value = Note> {
    let key = prop_oneof![
        Just(None),
        Just(Some(Key::Off)),
        (0u8..=95).prop_map(|p| Some(Key::Pitch(p))),
    ];
    let effect = (any::<u8>(), any::<u8>())
        .prop_map(|(command, param)| (command != 0 || param != 0).then(|| Effect::new(command, param)));
    (
        key,
        proptest::option::of(1u8..=255),
        proptest::option::of(0x10u8..=0xFF),
        effect,
    )
        .prop_map(|(key, instrument, volume, effect)| Note {
            key,
            instrument,
            volume,
            effect,
        })
}

fn it_note() -> impl Strategy<Value = Note> {
    let key = prop_oneof![
        Just(None),
        Just(Some(Key::Off)),
        Just(Some(Key::Cut)),
        Just(Some(Key::Fade)),
        (0u8..=119).prop_map(|p| Some(Key::Pitch(p))),
    ];
    (
        key,
        proptest::option::of(any::<u8>()),
        proptest::option::of(any::<u8>()),
        proptest::option::of((any::<u8>(), any::<u8>()).prop_map(|(c, p)| Effect::new(c, p))),
    )
        .prop_map(|(key, instrument, volume, effect)| Note {
            key,
            instrument,
            volume,
            effect,
        })
}

fn pattern_of(note: impl Strategy<Value = Note>, channels: usize) -> impl Strategy<Value = Pattern> {
    proptest::collection::vec(proptest::collection::vec(note, channels), 1..24)
        .prop_map(|rows| Pattern { rows })
}

proptest! {
    #[test]
    fn prop_xm_pattern_unpacks_to_input(pattern in pattern_of(xm_note(), 3)) {
        let packed = xm::pack_pattern(&pattern);
        let rows = pattern.num_rows();
        prop_assert_eq!(xm::unpack_pattern(&packed, rows, 3).unwrap(), pattern);
    }

    #[test]
    fn prop_it_pattern_unpacks_to_input(pattern in pattern_of(it_note(), 5)) {
        let packed = it::pack_pattern(&pattern);
        let rows = pattern.num_rows();
        prop_assert_eq!(it::unpack_pattern(&packed, rows, 5).unwrap(), pattern);
    }

    #[test]
    fn prop_it_rows_end_with_terminator(pattern in pattern_of(it_note(), 2)) {
        let packed = it::pack_pattern(&pattern);
        prop_assert_eq!(packed.last().copied(), Some(0));
    }

    #[test]
    fn prop_delta_16_inverts(frames in proptest::collection::vec(any::<i16>(), 0..256)) {
        prop_assert_eq!(xm::delta_decode_16(&xm::delta_encode_16(&frames)), frames);
    }

    #[test]
    fn prop_delta_8_inverts(frames in proptest::collection::vec(any::<i8>(), 0..256)) {
        prop_assert_eq!(xm::delta_decode_8(&xm::delta_encode_8(&frames)), frames);
    }
}
