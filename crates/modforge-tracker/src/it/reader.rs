//! IT conformance reader.
//!
//! Decodes the layout [`write_it`](super::write_it) produces back into a
//! [`Module`]. Known losses:
//!
//! - names lose trailing padding and anything past the field width
//! - sample tuning offsets come back folded into `sample_rate` (C-5 speed)
//! - channel defaults read as an empty list when every enabled channel uses
//!   the default pan and volume
//! - a pitch envelope mode without a pitch envelope reads back as `Pitch`
//! - a disabled envelope without points reads back as `None`

use modforge_model::{
    AutoVibrato, ChannelDefaults, Envelope, EnvelopePoint, Instrument, LoopMode, Module,
    NewNoteAction, PitchEnvelopeMode, Sample, VibratoWaveform,
};

use super::header::{
    flags, IT_CHANNEL_DISABLED, IT_CHANNEL_TABLE_LEN, IT_MAGIC, IT_NAME_LEN, IT_ORDER_END,
    IT_SPECIAL_MESSAGE,
};
use super::instrument::{
    env_flags, IT_ENVELOPE_NODES, IT_FILENAME_LEN, IT_INSTRUMENT_MAGIC, IT_INSTRUMENT_NAME_LEN,
    IT_KEYBOARD_LEN, IT_PAN_UNUSED,
};
use super::pattern::unpack_pattern;
use super::sample::{
    sample_flags, IT_CONVERT_SIGNED, IT_SAMPLE_MAGIC, IT_SAMPLE_NAME_LEN, IT_SAMPLE_PAN_USED,
};
use crate::bytes::ByteReader;
use crate::keymap::sample_map_from_keys;
use crate::text::read_fixed;
use crate::ReadError;

/// Rows of the implicit empty pattern behind a zero offset.
const EMPTY_PATTERN_ROWS: usize = 64;

fn expect_magic(
    reader: &mut ByteReader<'_>,
    magic: &[u8; 4],
    what: &'static str,
) -> Result<(), ReadError> {
    let found = reader.bytes(4, what)?;
    if found != magic {
        return Err(ReadError::BadMagic {
            what,
            found: found.to_vec(),
        });
    }
    Ok(())
}

/// Decode an IT file.
pub fn read_it(data: &[u8]) -> Result<Module, ReadError> {
    let mut reader = ByteReader::new(data);
    expect_magic(&mut reader, IT_MAGIC, "IT")?;

    let name = read_fixed(reader.bytes(IT_NAME_LEN, "header")?);
    reader.u16("header")?;
    let num_orders = reader.u16("header")? as usize;
    let num_instruments = reader.u16("header")? as usize;
    let num_samples = reader.u16("header")? as usize;
    let num_patterns = reader.u16("header")? as usize;
    reader.u16("header")?;
    reader.u16("header")?;
    let header_flags = reader.u16("header")?;
    let special = reader.u16("header")?;
    reader.u8("header")?;
    reader.u8("header")?;
    let speed = reader.u8("header")?;
    let tempo = reader.u8("header")?;
    reader.u8("header")?;
    reader.u8("header")?;
    let message_length = reader.u16("header")? as usize;
    let message_offset = reader.u32("header")? as usize;
    reader.u32("header")?;
    let pan = reader.bytes(IT_CHANNEL_TABLE_LEN, "channel pan")?;
    let volume = reader.bytes(IT_CHANNEL_TABLE_LEN, "channel volume")?;

    if header_flags & flags::USE_INSTRUMENTS == 0 {
        return Err(ReadError::Unsupported("sample mode".to_string()));
    }
    if header_flags & (flags::OLD_EFFECTS | flags::LINK_G_MEMORY) != 0 {
        return Err(ReadError::Unsupported("old effect semantics".to_string()));
    }

    let num_channels = pan
        .iter()
        .position(|&p| p >= IT_CHANNEL_DISABLED)
        .unwrap_or(IT_CHANNEL_TABLE_LEN);
    let defaults: Vec<ChannelDefaults> = pan
        .iter()
        .zip(volume)
        .take(num_channels)
        .map(|(&panning, &volume)| ChannelDefaults { panning, volume })
        .collect();

    let mut module = Module::new(&name, num_channels as u8);
    if defaults.iter().any(|d| *d != ChannelDefaults::default()) {
        module.channel_defaults = defaults;
    }
    module.speed = speed;
    module.tempo = tempo as u16;
    module.linear_frequencies = header_flags & flags::LINEAR_SLIDES != 0;

    let orders = reader.bytes(num_orders, "order list")?;
    module.order = orders
        .iter()
        .copied()
        .take_while(|&o| o != IT_ORDER_END)
        .collect();

    let mut table = |count: usize, what: &'static str| -> Result<Vec<usize>, ReadError> {
        (0..count)
            .map(|_| reader.u32(what).map(|o| o as usize))
            .collect()
    };
    let instrument_offsets = table(num_instruments, "instrument offsets")?;
    let sample_offsets = table(num_samples, "sample offsets")?;
    let pattern_offsets = table(num_patterns, "pattern offsets")?;

    if special & IT_SPECIAL_MESSAGE != 0 && message_length > 0 {
        reader.seek(message_offset, "song message")?;
        let raw = reader.bytes(message_length, "song message")?;
        let text = read_fixed(raw).replace('\r', "\n");
        module.message = Some(text);
    }

    for offset in instrument_offsets {
        reader.seek(offset, "instrument")?;
        module.instruments.push(read_instrument(&mut reader)?);
    }
    for offset in sample_offsets {
        reader.seek(offset, "sample header")?;
        module.samples.push(read_sample(&mut reader, data)?);
    }
    for offset in pattern_offsets {
        if offset == 0 {
            module
                .patterns
                .push(modforge_model::Pattern::empty(EMPTY_PATTERN_ROWS, num_channels as u8));
            continue;
        }
        reader.seek(offset, "pattern")?;
        let length = reader.u16("pattern header")? as usize;
        let rows = reader.u16("pattern header")? as usize;
        reader.u32("pattern header")?;
        let packed = reader.bytes(length, "pattern data")?;
        module
            .patterns
            .push(unpack_pattern(packed, rows, num_channels)?);
    }

    Ok(module)
}

fn new_note_action(value: u8) -> NewNoteAction {
    match value {
        1 => NewNoteAction::Continue,
        2 => NewNoteAction::NoteOff,
        3 => NewNoteAction::Fade,
        _ => NewNoteAction::Cut,
    }
}

fn read_envelope(reader: &mut ByteReader<'_>) -> Result<(Option<Envelope>, u8), ReadError> {
    let bits = reader.u8("envelope")?;
    let count = reader.u8("envelope")? as usize;
    let loop_start = reader.u8("envelope")?;
    let loop_end = reader.u8("envelope")?;
    let sustain_start = reader.u8("envelope")?;
    reader.u8("envelope")?;
    let mut points = Vec::with_capacity(count);
    for slot in 0..IT_ENVELOPE_NODES {
        let value = reader.i8("envelope")?;
        let tick = reader.u16("envelope")?;
        if slot < count {
            points.push(EnvelopePoint::new(tick, value));
        }
    }
    reader.u8("envelope")?;

    if bits == 0 && count == 0 {
        return Ok((None, bits));
    }
    let envelope = Envelope {
        points,
        sustain: (bits & env_flags::SUSTAIN_LOOP != 0).then_some(sustain_start),
        loop_range: (bits & env_flags::LOOP != 0).then_some((loop_start, loop_end)),
        enabled: bits & env_flags::ENABLED != 0,
    };
    Ok((Some(envelope), bits))
}

fn read_instrument(reader: &mut ByteReader<'_>) -> Result<Instrument, ReadError> {
    expect_magic(reader, IT_INSTRUMENT_MAGIC, "instrument")?;
    reader.bytes(IT_FILENAME_LEN + 1, "instrument")?;
    let nna = reader.u8("instrument")?;
    reader.u8("instrument")?;
    reader.u8("instrument")?;
    let fadeout = reader.u16("instrument")?;
    reader.u8("instrument")?;
    reader.u8("instrument")?;
    let global_volume = reader.u8("instrument")?;
    let default_pan = reader.u8("instrument")?;
    reader.bytes(6, "instrument")?;
    let name = read_fixed(reader.bytes(IT_INSTRUMENT_NAME_LEN, "instrument")?);
    reader.bytes(6, "instrument")?;

    let keyboard = reader.bytes(IT_KEYBOARD_LEN * 2, "keyboard")?;
    let keys: Vec<Option<usize>> = keyboard
        .chunks_exact(2)
        .map(|entry| entry[1].checked_sub(1).map(usize::from))
        .collect();

    let (volume_envelope, _) = read_envelope(reader)?;
    let (panning_envelope, _) = read_envelope(reader)?;
    let (pitch_envelope, pitch_flags) = read_envelope(reader)?;
    let pitch_envelope_mode = if pitch_flags & env_flags::FILTER != 0 {
        PitchEnvelopeMode::Filter
    } else {
        PitchEnvelopeMode::Pitch
    };

    Ok(Instrument {
        name,
        sample_map: sample_map_from_keys(&keys),
        volume_envelope,
        panning_envelope,
        pitch_envelope,
        pitch_envelope_mode,
        new_note_action: new_note_action(nna),
        fadeout,
        global_volume,
        default_pan: (default_pan & IT_PAN_UNUSED == 0).then_some(default_pan),
    })
}

fn vibrato_waveform(value: u8) -> VibratoWaveform {
    match value {
        1 => VibratoWaveform::RampDown,
        2 => VibratoWaveform::Square,
        3 => VibratoWaveform::Random,
        _ => VibratoWaveform::Sine,
    }
}

fn read_sample(reader: &mut ByteReader<'_>, data: &[u8]) -> Result<Sample, ReadError> {
    expect_magic(reader, IT_SAMPLE_MAGIC, "sample")?;
    reader.bytes(IT_FILENAME_LEN + 1, "sample header")?;
    let global_volume = reader.u8("sample header")?;
    let bits = reader.u8("sample header")?;
    let volume = reader.u8("sample header")?;
    let name = read_fixed(reader.bytes(IT_SAMPLE_NAME_LEN, "sample header")?);
    let convert = reader.u8("sample header")?;
    let panning = reader.u8("sample header")?;
    let length = reader.u32("sample header")? as usize;
    let loop_start = reader.u32("sample header")?;
    let loop_end = reader.u32("sample header")?;
    let c5_speed = reader.u32("sample header")?;
    reader.u32("sample header")?;
    reader.u32("sample header")?;
    let pointer = reader.u32("sample header")? as usize;
    let rate = reader.u8("sample header")?;
    let depth = reader.u8("sample header")?;
    let sweep = reader.u8("sample header")?;
    let waveform = vibrato_waveform(reader.u8("sample header")?);

    if bits & sample_flags::COMPRESSED != 0 {
        return Err(ReadError::Unsupported(format!(
            "compressed sample '{}'",
            name
        )));
    }

    if bits & (sample_flags::SUSTAIN_LOOP | sample_flags::SUSTAIN_PING_PONG) != 0 {
        return Err(ReadError::Unsupported(format!(
            "sustain loop on sample '{}'",
            name
        )));
    }

    let sixteen_bit = bits & sample_flags::SIXTEEN_BIT != 0;
    let frames = if bits & sample_flags::HAS_DATA != 0 {
        length
    } else {
        0
    };
    let signed = convert & IT_CONVERT_SIGNED != 0;

    let mut body = ByteReader::new(data);
    body.seek(pointer, "sample data")?;
    let mut sample = if sixteen_bit {
        let raw = body.bytes(frames * 2, "sample data")?;
        let pcm: Vec<i16> = raw
            .chunks_exact(2)
            .map(|pair| {
                let value = u16::from_le_bytes([pair[0], pair[1]]);
                let value = if signed { value } else { value ^ 0x8000 };
                value as i16
            })
            .collect();
        Sample::pcm16(&name, &pcm, c5_speed)
    } else {
        let raw = body.bytes(frames, "sample data")?;
        let pcm = raw
            .iter()
            .map(|&b| if signed { b ^ 0x80 } else { b })
            .collect();
        Sample::pcm8(&name, pcm, c5_speed)
    };

    if bits & sample_flags::LOOP != 0 {
        let mode = if bits & sample_flags::PING_PONG != 0 {
            LoopMode::PingPong
        } else {
            LoopMode::Forward
        };
        sample = sample.with_loop(mode, loop_start, loop_end);
    }
    sample.volume = volume;
    sample.global_volume = global_volume;
    sample.panning = (panning & IT_SAMPLE_PAN_USED != 0).then_some(panning & !IT_SAMPLE_PAN_USED);
    sample.vibrato = AutoVibrato {
        waveform,
        sweep,
        depth,
        rate,
    };
    Ok(sample)
}
