//! XM pattern packing.
//!
//! Each cell is either five raw bytes (note first, top bit clear) or a flag
//! byte `0x80 | mask` followed by only the fields named in the mask:
//!
//! | bit | field |
//! |-----|-------|
//! | 0 | note |
//! | 1 | instrument |
//! | 2 | volume column |
//! | 3 | effect type |
//! | 4 | effect parameter |
//!
//! A zero field is "absent" in XM, so an effect of type 0 with parameter 0
//! vanishes on the way through.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{Effect, Key, Note, Pattern};

use crate::bytes::ByteReader;
use crate::ReadError;

/// Pattern header length field value.
pub const XM_PATTERN_HEADER_SIZE: u32 = 9;

/// Note value for key-off.
pub const XM_NOTE_OFF: u8 = 97;

const FLAG_PACKED: u8 = 0x80;
const ALL_FIELDS: u8 = 0x1F;

/// XM note byte for a key.
///
/// Cut and fade have no XM encoding and are rejected by validation; they
/// degrade to key-off here.
pub fn note_byte(key: Key) -> u8 {
    match key {
        Key::Pitch(pitch) => pitch + 1,
        Key::Off | Key::Cut | Key::Fade => XM_NOTE_OFF,
    }
}

/// Key for an XM note byte; 0 is no key.
pub fn key_from_byte(value: u8) -> Option<Key> {
    match value {
        0 => None,
        XM_NOTE_OFF => Some(Key::Off),
        n if n < XM_NOTE_OFF => Some(Key::Pitch(n - 1)),
        _ => Some(Key::Off),
    }
}

/// Cell fields in write order; zero means absent.
fn cell_fields(note: &Note) -> [u8; 5] {
    let (effect, param) = note
        .effect
        .map(|e| (e.command, e.param))
        .unwrap_or((0, 0));
    [
        note.key.map(note_byte).unwrap_or(0),
        note.instrument.unwrap_or(0),
        note.volume.unwrap_or(0),
        effect,
        param,
    ]
}

/// Packs pattern rows into XM's cell encoding.
#[derive(Debug, Default)]
pub struct XmPatternPacker {
    data: Vec<u8>,
}

impl XmPatternPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pattern.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Append one row of cells.
    pub fn pack_row(&mut self, cells: &[Note]) {
        for note in cells {
            let fields = cell_fields(note);
            let mask = fields
                .iter()
                .enumerate()
                .filter(|(_, &value)| value != 0)
                .fold(0u8, |mask, (bit, _)| mask | (1 << bit));

            if mask == ALL_FIELDS {
                self.data.extend_from_slice(&fields);
                continue;
            }

            self.data.push(FLAG_PACKED | mask);
            self.data
                .extend(fields.iter().copied().filter(|&value| value != 0));
        }
    }

    /// Packed bytes so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Pack a whole pattern.
pub fn pack_pattern(pattern: &Pattern) -> Vec<u8> {
    let mut packer = XmPatternPacker::new();
    for row in &pattern.rows {
        packer.pack_row(row);
    }
    packer.data
}

/// Write a pattern header followed by its packed data.
pub fn write_pattern<W: Write>(writer: &mut W, rows: usize, packed: &[u8]) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(XM_PATTERN_HEADER_SIZE)?;
    writer.write_u8(0)?;
    writer.write_u16::<LittleEndian>(rows as u16)?;
    writer.write_u16::<LittleEndian>(packed.len() as u16)?;
    writer.write_all(packed)
}

/// Decode packed pattern data into `rows` rows of `channels` cells.
pub fn unpack_pattern(data: &[u8], rows: usize, channels: usize) -> Result<Pattern, ReadError> {
    let mut pattern = Pattern::empty(rows, channels as u8);
    if data.is_empty() {
        return Ok(pattern);
    }

    let mut reader = ByteReader::new(data);
    for row in pattern.rows.iter_mut() {
        for cell in row.iter_mut() {
            let first = reader.u8("pattern cell")?;
            let fields = if first & FLAG_PACKED != 0 {
                let mut fields = [0u8; 5];
                for (bit, field) in fields.iter_mut().enumerate() {
                    if first & (1 << bit) != 0 {
                        *field = reader.u8("pattern cell")?;
                    }
                }
                fields
            } else {
                let rest = reader.bytes(4, "pattern cell")?;
                [first, rest[0], rest[1], rest[2], rest[3]]
            };
            *cell = note_from_fields(fields);
        }
    }
    Ok(pattern)
}

fn note_from_fields([note, instrument, volume, effect, param]: [u8; 5]) -> Note {
    let nonzero = |value: u8| (value != 0).then_some(value);
    Note {
        key: key_from_byte(note),
        instrument: nonzero(instrument),
        volume: nonzero(volume),
        effect: (effect != 0 || param != 0).then(|| Effect::new(effect, param)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_is_single_flag_byte() {
        let mut packer = XmPatternPacker::new();
        packer.pack_row(&[Note::empty(), Note::empty()]);
        assert_eq!(packer.data(), &[0x80, 0x80]);
    }

    #[test]
    fn partial_cell_writes_flagged_fields() {
        let mut packer = XmPatternPacker::new();
        packer.pack_row(&[Note::play(Key::Pitch(48), 1)]);
        assert_eq!(packer.data(), &[0x83, 49, 1]);

        packer.reset();
        packer.pack_row(&[Note::off()]);
        assert_eq!(packer.data(), &[0x81, XM_NOTE_OFF]);

        packer.reset();
        packer.pack_row(&[Note::empty().with_volume(0x30).with_effect(0, 0x37)]);
        assert_eq!(packer.data(), &[0x94, 0x30, 0x37]);
    }

    #[test]
    fn full_cell_is_five_raw_bytes() {
        let note = Note::play(Key::Pitch(52), 2)
            .with_volume(0x40)
            .with_effect(0x0F, 0x06);
        let mut packer = XmPatternPacker::new();
        packer.pack_row(&[note]);
        assert_eq!(packer.data(), &[53, 2, 0x40, 0x0F, 0x06]);
        assert_eq!(packer.data()[0] & 0x80, 0);
    }

    #[test]
    fn unpack_reverses_both_encodings() {
        let full = Note::play(Key::Pitch(52), 2)
            .with_volume(0x40)
            .with_effect(0x0F, 0x06);
        let pattern = Pattern::empty(3, 2)
            .with_note(0, 0, full)
            .with_note(1, 1, Note::off())
            .with_note(2, 0, Note::empty().with_effect(0x0C, 0));

        let packed = pack_pattern(&pattern);
        assert_eq!(unpack_pattern(&packed, 3, 2).unwrap(), pattern);
    }

    #[test]
    fn null_effect_is_dropped() {
        let pattern = Pattern::empty(1, 1).with_note(0, 0, Note::empty().with_effect(0, 0));
        let packed = pack_pattern(&pattern);
        assert_eq!(packed, vec![0x80]);
        assert_eq!(unpack_pattern(&packed, 1, 1).unwrap(), Pattern::empty(1, 1));
    }

    #[test]
    fn truncated_data_errors() {
        assert!(matches!(
            unpack_pattern(&[0x83, 49], 1, 1),
            Err(ReadError::Truncated(_))
        ));
    }

    #[test]
    fn pattern_header_layout() {
        let mut buf = Vec::new();
        write_pattern(&mut buf, 64, &[0x80; 3]).unwrap();
        assert_eq!(buf.len(), 9 + 3);
        assert_eq!(&buf[0..4], &[9, 0, 0, 0]);
        assert_eq!(buf[4], 0);
        assert_eq!(u16::from_le_bytes([buf[5], buf[6]]), 64);
        assert_eq!(u16::from_le_bytes([buf[7], buf[8]]), 3);
    }
}
