//! Tests for the IT writer: header, channel tables, packing and layout.

use modforge_model::{
    ChannelDefaults, Format, Instrument, Module, Note, Pattern, Sample, ValidationError,
};
use modforge_tracker::it::{
    it_to_bytes, pack_pattern, ItPatternPacker, IT_HEADER_SIZE, IT_INSTRUMENT_SIZE, IT_MAGIC,
    IT_SAMPLE_HEADER_SIZE,
};
use modforge_tracker::{write_it, EncodeError};
use pretty_assertions::assert_eq;

// =============================================================================
// Helper Functions
// =============================================================================

fn minimal_it(name: &str, channels: u8) -> Module {
    let mut module = Module::new(name, channels);
    module.add_sample(Sample::pcm8("Sample1", vec![0u8; 100], 22050));
    module.add_instrument(Instrument::new("Inst1", 0));
    module.add_pattern(Pattern::empty(64, channels));
    module.with_order(&[0])
}

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

// =============================================================================
// Header
// =============================================================================

#[test]
fn test_it_header_fields() {
    let it = it_to_bytes(&minimal_it("Test", 4).with_timing(5, 140)).unwrap();
    assert_eq!(&it[0..4], IT_MAGIC);
    assert_eq!(&it[4..8], b"Test");
    assert!(it[8..30].iter().all(|&b| b == 0));
    assert_eq!(u16_at(&it, 32), 2);
    assert_eq!(u16_at(&it, 34), 1);
    assert_eq!(u16_at(&it, 36), 1);
    assert_eq!(u16_at(&it, 38), 1);
    assert_eq!(u16_at(&it, 40), 0x0214);
    assert_eq!(u16_at(&it, 42), 0x0200);
    assert_eq!(it[48], 128);
    assert_eq!(it[49], 48);
    assert_eq!(it[50], 5);
    assert_eq!(it[51], 140);
}

#[test]
fn test_it_name_truncated_to_26_bytes() {
    let it = it_to_bytes(&minimal_it("An Impulse Tracker Song Title", 1)).unwrap();
    assert_eq!(&it[4..30], b"An Impulse Tracker Song Ti");
}

#[test]
fn test_it_channel_tables() {
    let mut module = minimal_it("Pan", 3);
    module.channel_defaults = vec![
        ChannelDefaults {
            panning: 0,
            volume: 64,
        },
        ChannelDefaults {
            panning: 64,
            volume: 32,
        },
    ];
    let it = it_to_bytes(&module).unwrap();
    assert_eq!(&it[64..68], &[0, 64, 32, 128]);
    assert_eq!(&it[128..132], &[64, 32, 64, 0]);
}

#[test]
fn test_it_accepts_64_channels() {
    let it = it_to_bytes(&minimal_it("Wide", 64)).unwrap();
    assert!(it[64..128].iter().all(|&p| p == 32));
}

#[test]
fn test_it_rejects_65_channels() {
    let mut buf = Vec::new();
    match write_it(&minimal_it("Too Wide", 65), &mut buf) {
        Err(EncodeError::Validation(ValidationError::ChannelCountExceeded {
            format: Format::It,
            channels: 65,
            max: 64,
        })) => {}
        other => panic!("expected ChannelCountExceeded, got {:?}", other),
    }
    assert!(buf.is_empty());
}

#[test]
fn test_it_rejects_restart_position() {
    let mut module = minimal_it("Restart", 1).with_order(&[0, 0]);
    module.restart_position = 1;
    assert!(matches!(
        it_to_bytes(&module),
        Err(EncodeError::Validation(ValidationError::UnsupportedFeature { .. }))
    ));
}

// =============================================================================
// Pattern Packing
// =============================================================================

#[test]
fn test_it_volume_carry_on_channel_zero() {
    let pattern = Pattern::empty(3, 1)
        .with_note(0, 0, Note::from_name("C-4", 1).with_volume(32))
        .with_note(1, 0, Note::from_name("E-4", 1).with_volume(32))
        .with_note(2, 0, Note::from_name("G-4", 1).with_volume(32));

    let mut packer = ItPatternPacker::new();
    packer.pack_row(&pattern.rows[0]);
    assert_eq!(packer.data(), &[0x81, 0x07, 48, 1, 32, 0]);
    packer.pack_row(&pattern.rows[1]);
    assert_eq!(&packer.data()[6..], &[0x81, 0x61, 52, 0]);
    packer.pack_row(&pattern.rows[2]);
    assert_eq!(&packer.data()[10..], &[0x01, 55, 0]);

    assert_eq!(packer.data(), pack_pattern(&pattern).as_slice());
}

#[test]
fn test_it_memory_is_per_channel() {
    let pattern = Pattern::empty(2, 2)
        .with_note(0, 0, Note::from_name("C-4", 1))
        .with_note(1, 1, Note::from_name("C-4", 1));
    assert_eq!(
        pack_pattern(&pattern),
        vec![0x81, 0x03, 48, 1, 0, 0x82, 0x03, 48, 1, 0]
    );
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_it_minimal_file_layout() {
    let module = minimal_it("Layout", 4);
    let it = it_to_bytes(&module).unwrap();

    let orders = IT_HEADER_SIZE;
    assert_eq!(&it[orders..orders + 2], &[0, 255]);

    let table = orders + 2;
    let instrument = u32_at(&it, table) as usize;
    let sample = u32_at(&it, table + 4) as usize;
    let pattern = u32_at(&it, table + 8) as usize;

    assert_eq!(instrument, table + 12);
    assert_eq!(sample, instrument + IT_INSTRUMENT_SIZE);
    assert_eq!(pattern, sample + IT_SAMPLE_HEADER_SIZE);
    assert_eq!(&it[instrument..instrument + 4], b"IMPI");
    assert_eq!(&it[sample..sample + 4], b"IMPS");

    let packed_len = u16_at(&it, pattern) as usize;
    assert_eq!(packed_len, 64);
    assert_eq!(u16_at(&it, pattern + 2), 64);

    let data = u32_at(&it, sample + 72) as usize;
    assert_eq!(data, pattern + 8 + packed_len);
    assert_eq!(it.len(), data + 100);
}

#[test]
fn test_it_message_offset() {
    let module = minimal_it("Message", 1).with_message("Hello\nWorld");
    let it = it_to_bytes(&module).unwrap();
    let length = u16_at(&it, 54) as usize;
    let offset = u32_at(&it, 56) as usize;
    assert_eq!(u16_at(&it, 46) & 1, 1);
    assert_eq!(&it[offset..offset + length], b"Hello\rWorld\0");
}
