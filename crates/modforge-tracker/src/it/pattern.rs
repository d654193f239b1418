//! IT pattern packing.
//!
//! Each non-empty cell starts with a channel byte (`channel + 1`, bit 7 set
//! when a new mask follows). The mask names the fields that follow and the
//! fields repeated from the channel's previous cell:
//!
//! | bit | meaning |
//! |-----|---------|
//! | 0x01 | note follows |
//! | 0x02 | instrument follows |
//! | 0x04 | volume follows |
//! | 0x08 | effect and parameter follow |
//! | 0x10 | last note |
//! | 0x20 | last instrument |
//! | 0x40 | last volume |
//! | 0x80 | last effect |
//!
//! A zero byte ends the row. Channel memory resets at the start of every
//! pattern.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{Effect, Key, Note, Pattern};

use crate::bytes::ByteReader;
use crate::ReadError;

/// Bytes before the packed data of a pattern.
pub const IT_PATTERN_HEADER_SIZE: usize = 8;

pub const IT_NOTE_OFF: u8 = 255;
pub const IT_NOTE_CUT: u8 = 254;
pub const IT_NOTE_FADE: u8 = 246;

/// Channels addressable by the channel byte.
pub const IT_MAX_CHANNELS: usize = 64;

const CHANNEL_NEW_MASK: u8 = 0x80;

mod mask {
    pub const NOTE: u8 = 0x01;
    pub const INSTRUMENT: u8 = 0x02;
    pub const VOLUME: u8 = 0x04;
    pub const EFFECT: u8 = 0x08;
    pub const LAST_NOTE: u8 = 0x10;
    pub const LAST_INSTRUMENT: u8 = 0x20;
    pub const LAST_VOLUME: u8 = 0x40;
    pub const LAST_EFFECT: u8 = 0x80;
}

/// IT note byte for a key.
pub fn note_byte(key: Key) -> u8 {
    match key {
        Key::Pitch(pitch) => pitch,
        Key::Off => IT_NOTE_OFF,
        Key::Cut => IT_NOTE_CUT,
        Key::Fade => IT_NOTE_FADE,
    }
}

/// Key for an IT note byte. Values between the pitches and note-cut all fade.
pub fn key_from_byte(value: u8) -> Key {
    match value {
        0..=119 => Key::Pitch(value),
        IT_NOTE_OFF => Key::Off,
        IT_NOTE_CUT => Key::Cut,
        _ => Key::Fade,
    }
}

/// Last values seen on one channel.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelMemory {
    mask: Option<u8>,
    note: Option<u8>,
    instrument: Option<u8>,
    volume: Option<u8>,
    effect: Option<(u8, u8)>,
}

/// Compare `value` with the channel's memory: returns `true` when it repeats
/// and stores it otherwise.
fn remember<T: PartialEq + Copy>(slot: &mut Option<T>, value: T) -> bool {
    if *slot == Some(value) {
        true
    } else {
        *slot = Some(value);
        false
    }
}

/// Packs pattern rows into IT's masked, channel-memory encoding.
#[derive(Debug)]
pub struct ItPatternPacker {
    data: Vec<u8>,
    memory: [ChannelMemory; IT_MAX_CHANNELS],
}

impl Default for ItPatternPacker {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            memory: [ChannelMemory::default(); IT_MAX_CHANNELS],
        }
    }
}

impl ItPatternPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pattern: clears output and channel memory.
    pub fn reset(&mut self) {
        self.data.clear();
        self.memory = [ChannelMemory::default(); IT_MAX_CHANNELS];
    }

    /// Append one row. Cells past channel 64 are ignored.
    pub fn pack_row(&mut self, cells: &[Note]) {
        for (channel, note) in cells.iter().enumerate().take(IT_MAX_CHANNELS) {
            if note.is_empty() {
                continue;
            }
            let memory = &mut self.memory[channel];
            let mut cell_mask = 0u8;
            let mut fields = Vec::with_capacity(5);

            if let Some(key) = note.key {
                let value = note_byte(key);
                if remember(&mut memory.note, value) {
                    cell_mask |= mask::LAST_NOTE;
                } else {
                    cell_mask |= mask::NOTE;
                    fields.push(value);
                }
            }
            if let Some(instrument) = note.instrument {
                if remember(&mut memory.instrument, instrument) {
                    cell_mask |= mask::LAST_INSTRUMENT;
                } else {
                    cell_mask |= mask::INSTRUMENT;
                    fields.push(instrument);
                }
            }
            if let Some(volume) = note.volume {
                if remember(&mut memory.volume, volume) {
                    cell_mask |= mask::LAST_VOLUME;
                } else {
                    cell_mask |= mask::VOLUME;
                    fields.push(volume);
                }
            }
            if let Some(effect) = note.effect {
                if remember(&mut memory.effect, (effect.command, effect.param)) {
                    cell_mask |= mask::LAST_EFFECT;
                } else {
                    cell_mask |= mask::EFFECT;
                    fields.push(effect.command);
                    fields.push(effect.param);
                }
            }

            let channel_byte = channel as u8 + 1;
            if remember(&mut memory.mask, cell_mask) {
                self.data.push(channel_byte);
            } else {
                self.data.push(channel_byte | CHANNEL_NEW_MASK);
                self.data.push(cell_mask);
            }
            self.data.extend_from_slice(&fields);
        }
        self.data.push(0);
    }

    /// Packed bytes so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Pack a whole pattern with fresh channel memory.
pub fn pack_pattern(pattern: &Pattern) -> Vec<u8> {
    let mut packer = ItPatternPacker::new();
    for row in &pattern.rows {
        packer.pack_row(row);
    }
    packer.data
}

/// Write a pattern header followed by its packed data.
pub fn write_pattern<W: Write>(writer: &mut W, rows: usize, packed: &[u8]) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(packed.len() as u16)?;
    writer.write_u16::<LittleEndian>(rows as u16)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_all(packed)
}

/// Read one masked field: fetch it when `new_bit` is set, reuse the channel's
/// memory when `last_bit` is set.
fn field(
    reader: &mut ByteReader<'_>,
    cell_mask: u8,
    new_bit: u8,
    last_bit: u8,
    slot: &mut Option<u8>,
) -> Result<Option<u8>, ReadError> {
    if cell_mask & new_bit != 0 {
        *slot = Some(reader.u8("pattern cell")?);
    }
    if cell_mask & (new_bit | last_bit) != 0 {
        return slot
            .map(Some)
            .ok_or_else(|| ReadError::Corrupt("field repeated before first use".to_string()));
    }
    Ok(None)
}

/// Decode packed pattern data into `rows` rows of `channels` cells.
pub fn unpack_pattern(data: &[u8], rows: usize, channels: usize) -> Result<Pattern, ReadError> {
    let mut pattern = Pattern::empty(rows, channels as u8);
    let mut memory = [ChannelMemory::default(); IT_MAX_CHANNELS];
    let mut reader = ByteReader::new(data);

    for (row_index, row) in pattern.rows.iter_mut().enumerate() {
        loop {
            let channel_byte = reader.u8("pattern row")?;
            if channel_byte == 0 {
                break;
            }
            let channel = ((channel_byte - 1) & 0x3F) as usize;
            let memory = &mut memory[channel];

            let cell_mask = if channel_byte & CHANNEL_NEW_MASK != 0 {
                let value = reader.u8("pattern cell")?;
                memory.mask = Some(value);
                value
            } else {
                memory.mask.ok_or_else(|| {
                    ReadError::Corrupt(format!("channel {} reuses an unset mask", channel))
                })?
            };

            let note = field(&mut reader, cell_mask, mask::NOTE, mask::LAST_NOTE, &mut memory.note)?;
            let instrument = field(
                &mut reader,
                cell_mask,
                mask::INSTRUMENT,
                mask::LAST_INSTRUMENT,
                &mut memory.instrument,
            )?;
            let volume = field(
                &mut reader,
                cell_mask,
                mask::VOLUME,
                mask::LAST_VOLUME,
                &mut memory.volume,
            )?;
            if cell_mask & mask::EFFECT != 0 {
                let command = reader.u8("pattern cell")?;
                let param = reader.u8("pattern cell")?;
                memory.effect = Some((command, param));
            }
            let effect = if cell_mask & (mask::EFFECT | mask::LAST_EFFECT) != 0 {
                let (command, param) = memory.effect.ok_or_else(|| {
                    ReadError::Corrupt("effect repeated before first use".to_string())
                })?;
                Some(Effect::new(command, param))
            } else {
                None
            };

            let cell = row.get_mut(channel).ok_or_else(|| {
                ReadError::Corrupt(format!(
                    "row {} addresses channel {} of {}",
                    row_index, channel, channels
                ))
            })?;
            *cell = Note {
                key: note.map(key_from_byte),
                instrument,
                volume,
                effect,
            };
        }
    }

    Ok(pattern)
}
