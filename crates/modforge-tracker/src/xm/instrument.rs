//! XM instrument headers.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{Envelope, Instrument, Sample, SampleMap, VibratoWaveform};

use super::sample::{write_sample_data, write_sample_header, XM_SAMPLE_HEADER_SIZE};
use crate::text::write_fixed;

/// XM instrument header size, counting the size field itself.
pub const XM_INSTRUMENT_HEADER_SIZE: u32 = 263;

/// Width of the instrument name field.
pub const XM_INSTRUMENT_NAME_LEN: usize = 22;

/// Keys covered by the note-to-sample map.
pub const XM_KEYMAP_LEN: usize = 96;

/// Envelope point slots per envelope.
pub const XM_ENVELOPE_POINTS: usize = 12;

/// Envelope flag bits.
pub mod env_flags {
    pub const ENABLED: u8 = 0x01;
    pub const SUSTAIN: u8 = 0x02;
    pub const LOOP: u8 = 0x04;
}

/// Offset added to panning envelope values to reach XM's 0..=64 range.
pub const XM_PANNING_ENVELOPE_OFFSET: i16 = 32;

/// Samples an instrument references, in key-map order.
pub fn instrument_samples<'a>(instrument: &Instrument, samples: &'a [Sample]) -> Vec<&'a Sample> {
    instrument
        .sample_map
        .samples()
        .into_iter()
        .filter_map(|index| samples.get(index))
        .collect()
}

/// 96-entry key map of instrument-local sample numbers.
pub fn key_map(map: &SampleMap) -> [u8; XM_KEYMAP_LEN] {
    let local = map.samples();
    let mut keys = [0u8; XM_KEYMAP_LEN];
    for (pitch, slot) in keys.iter_mut().enumerate() {
        *slot = map
            .sample_for(pitch as u8)
            .and_then(|sample| local.iter().position(|&s| s == sample))
            .unwrap_or(0) as u8;
    }
    keys
}

/// XM vibrato type for a waveform. Random is IT-only and rejected by validation.
pub fn vibrato_type(waveform: VibratoWaveform) -> u8 {
    match waveform {
        VibratoWaveform::Sine | VibratoWaveform::Random => 0,
        VibratoWaveform::Square => 1,
        VibratoWaveform::RampDown => 2,
        VibratoWaveform::RampUp => 3,
    }
}

fn write_envelope_points<W: Write>(
    writer: &mut W,
    envelope: Option<&Envelope>,
    offset: i16,
) -> io::Result<()> {
    let points = envelope.map(|e| e.points.as_slice()).unwrap_or(&[]);
    for slot in 0..XM_ENVELOPE_POINTS {
        match points.get(slot) {
            Some(point) => {
                writer.write_u16::<LittleEndian>(point.tick)?;
                writer.write_u16::<LittleEndian>((point.value as i16 + offset).max(0) as u16)?;
            }
            None => writer.write_u32::<LittleEndian>(0)?,
        }
    }
    Ok(())
}

fn envelope_flags(envelope: Option<&Envelope>) -> u8 {
    let Some(envelope) = envelope else {
        return 0;
    };
    let mut flags = 0;
    if envelope.enabled {
        flags |= env_flags::ENABLED;
    }
    if envelope.sustain.is_some() {
        flags |= env_flags::SUSTAIN;
    }
    if envelope.loop_range.is_some() {
        flags |= env_flags::LOOP;
    }
    flags
}

/// `(sustain, loop start, loop end)` point indices.
fn envelope_indices(envelope: Option<&Envelope>) -> [u8; 3] {
    let Some(envelope) = envelope else {
        return [0; 3];
    };
    let (loop_start, loop_end) = envelope.loop_range.unwrap_or((0, 0));
    [envelope.sustain.unwrap_or(0), loop_start, loop_end]
}

/// Write an instrument header, its sample headers and its sample data.
pub fn write_instrument<W: Write>(
    writer: &mut W,
    instrument: &Instrument,
    samples: &[Sample],
) -> io::Result<()> {
    let local = instrument_samples(instrument, samples);
    let volume = instrument.volume_envelope.as_ref();
    let panning = instrument.panning_envelope.as_ref();

    writer.write_u32::<LittleEndian>(XM_INSTRUMENT_HEADER_SIZE)?;
    write_fixed(writer, &instrument.name, XM_INSTRUMENT_NAME_LEN, 0)?;
    writer.write_u8(0)?;
    writer.write_u16::<LittleEndian>(local.len() as u16)?;
    writer.write_u32::<LittleEndian>(XM_SAMPLE_HEADER_SIZE)?;
    writer.write_all(&key_map(&instrument.sample_map))?;

    write_envelope_points(writer, volume, 0)?;
    write_envelope_points(writer, panning, XM_PANNING_ENVELOPE_OFFSET)?;

    let point_count = |e: Option<&Envelope>| e.map(|e| e.points.len()).unwrap_or(0) as u8;
    writer.write_u8(point_count(volume))?;
    writer.write_u8(point_count(panning))?;
    writer.write_all(&envelope_indices(volume))?;
    writer.write_all(&envelope_indices(panning))?;
    writer.write_u8(envelope_flags(volume))?;
    writer.write_u8(envelope_flags(panning))?;

    // XM stores one auto-vibrato per instrument; the first sample's wins.
    let vibrato = local.first().map(|s| s.vibrato).unwrap_or_default();
    writer.write_u8(vibrato_type(vibrato.waveform))?;
    writer.write_u8(vibrato.sweep)?;
    writer.write_u8(vibrato.depth)?;
    writer.write_u8(vibrato.rate)?;

    writer.write_u16::<LittleEndian>(instrument.fadeout)?;
    writer.write_all(&[0u8; 22])?;

    for sample in &local {
        write_sample_header(writer, sample)?;
    }
    for sample in &local {
        write_sample_data(writer, sample)?;
    }

    Ok(())
}
