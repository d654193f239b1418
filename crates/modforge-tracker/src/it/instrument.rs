//! IT instrument records.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{Envelope, Instrument, NewNoteAction, PitchEnvelopeMode};

use super::header::IT_CREATED_WITH;
use crate::text::write_fixed;

/// IT instrument magic identifier.
pub const IT_INSTRUMENT_MAGIC: &[u8; 4] = b"IMPI";

/// Size of one instrument record.
pub const IT_INSTRUMENT_SIZE: usize = 554;

/// Width of the instrument name field.
pub const IT_INSTRUMENT_NAME_LEN: usize = 26;

/// Width of the DOS filename field.
pub const IT_FILENAME_LEN: usize = 12;

/// Entries in the note-to-sample keyboard table.
pub const IT_KEYBOARD_LEN: usize = 120;

/// Node slots per envelope.
pub const IT_ENVELOPE_NODES: usize = 25;

/// Size of one envelope block.
pub const IT_ENVELOPE_SIZE: usize = 82;

/// Default pan byte flag meaning "don't use".
pub const IT_PAN_UNUSED: u8 = 0x80;

/// Default pitch-pan centre (C-5).
const PITCH_PAN_CENTER: u8 = 60;

/// Envelope flag bits.
pub mod env_flags {
    pub const ENABLED: u8 = 0x01;
    pub const LOOP: u8 = 0x02;
    pub const SUSTAIN_LOOP: u8 = 0x04;
    /// Keep envelope position when a note retriggers.
    pub const CARRY: u8 = 0x08;
    /// Pitch envelope drives the filter cutoff.
    pub const FILTER: u8 = 0x80;
}

/// NNA byte for a new-note action.
pub fn nna_byte(action: NewNoteAction) -> u8 {
    match action {
        NewNoteAction::Cut => 0,
        NewNoteAction::Continue => 1,
        NewNoteAction::NoteOff => 2,
        NewNoteAction::Fade => 3,
    }
}

/// Write one 82-byte envelope block. A sustain point becomes a one-point
/// sustain loop.
fn write_envelope<W: Write>(
    writer: &mut W,
    envelope: Option<&Envelope>,
    extra_flags: u8,
) -> io::Result<()> {
    let Some(envelope) = envelope else {
        return writer.write_all(&[0u8; IT_ENVELOPE_SIZE]);
    };

    let mut flags = extra_flags;
    if envelope.enabled {
        flags |= env_flags::ENABLED;
    }
    if envelope.loop_range.is_some() {
        flags |= env_flags::LOOP;
    }
    if envelope.sustain.is_some() {
        flags |= env_flags::SUSTAIN_LOOP;
    }
    let (loop_start, loop_end) = envelope.loop_range.unwrap_or((0, 0));
    let sustain = envelope.sustain.unwrap_or(0);

    writer.write_u8(flags)?;
    writer.write_u8(envelope.points.len() as u8)?;
    writer.write_u8(loop_start)?;
    writer.write_u8(loop_end)?;
    writer.write_u8(sustain)?;
    writer.write_u8(sustain)?;
    for slot in 0..IT_ENVELOPE_NODES {
        match envelope.points.get(slot) {
            Some(point) => {
                writer.write_i8(point.value)?;
                writer.write_u16::<LittleEndian>(point.tick)?;
            }
            None => writer.write_all(&[0u8; 3])?,
        }
    }
    writer.write_u8(0)
}

/// Write a 554-byte instrument record. Keyboard entries reference samples
/// 1-based over the module's sample list.
pub fn write_instrument<W: Write>(writer: &mut W, instrument: &Instrument) -> io::Result<()> {
    writer.write_all(IT_INSTRUMENT_MAGIC)?;
    writer.write_all(&[0u8; IT_FILENAME_LEN])?;
    writer.write_u8(0)?;
    writer.write_u8(nna_byte(instrument.new_note_action))?;
    writer.write_u8(0)?; // DCT
    writer.write_u8(0)?; // DCA
    writer.write_u16::<LittleEndian>(instrument.fadeout)?;
    writer.write_i8(0)?;
    writer.write_u8(PITCH_PAN_CENTER)?;
    writer.write_u8(instrument.global_volume)?;
    writer.write_u8(
        instrument
            .default_pan
            .unwrap_or(IT_PAN_UNUSED | modforge_model::module::PAN_CENTER),
    )?;
    writer.write_u8(0)?; // random volume
    writer.write_u8(0)?; // random pan
    writer.write_u16::<LittleEndian>(IT_CREATED_WITH)?;
    writer.write_u8(instrument.sample_map.samples().len() as u8)?;
    writer.write_u8(0)?;
    write_fixed(writer, &instrument.name, IT_INSTRUMENT_NAME_LEN, 0)?;
    writer.write_u8(0)?; // filter cutoff
    writer.write_u8(0)?; // filter resonance
    writer.write_u8(0)?; // MIDI channel
    writer.write_u8(0xFF)?; // MIDI program
    writer.write_u16::<LittleEndian>(0xFFFF)?; // MIDI bank

    for pitch in 0..IT_KEYBOARD_LEN as u8 {
        let sample = instrument
            .sample_map
            .sample_for(pitch)
            .map(|index| index as u8 + 1)
            .unwrap_or(0);
        writer.write_u8(pitch)?;
        writer.write_u8(sample)?;
    }

    write_envelope(writer, instrument.volume_envelope.as_ref(), 0)?;
    write_envelope(writer, instrument.panning_envelope.as_ref(), 0)?;
    let pitch_flags = match instrument.pitch_envelope_mode {
        PitchEnvelopeMode::Pitch => 0,
        PitchEnvelopeMode::Filter => env_flags::FILTER,
    };
    write_envelope(writer, instrument.pitch_envelope.as_ref(), pitch_flags)?;

    writer.write_all(&[0u8; 4])
}
