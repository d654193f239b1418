//! XM conformance reader.
//!
//! Decodes the layout [`write_xm`](super::write_xm) produces back into a
//! [`Module`]. Known losses:
//!
//! - names lose trailing padding and anything past the field width
//! - sample rate is rebuilt from finetune and relative note, so the model's
//!   tuning offsets come back folded into `sample_rate`
//! - sample panning is quantized by 4 and the centre value reads as `None`
//! - sample global volume does not exist in XM and reads as 64
//! - every sample of an instrument gets that instrument's auto-vibrato
//! - a sample shared by several instruments comes back once per instrument

use modforge_model::sample::SAMPLE_VOLUME_MAX;
use modforge_model::{
    AutoVibrato, Envelope, EnvelopePoint, Instrument, LoopMode, Module, NewNoteAction,
    PitchEnvelopeMode, Sample, VibratoWaveform,
};

use super::header::{XM_FLAG_LINEAR, XM_MAGIC, XM_NAME_LEN, XM_ORDER_TABLE_LEN, XM_PREAMBLE_LEN};
use super::instrument::{
    env_flags, XM_ENVELOPE_POINTS, XM_INSTRUMENT_NAME_LEN, XM_KEYMAP_LEN,
    XM_PANNING_ENVELOPE_OFFSET,
};
use super::pattern::unpack_pattern;
use super::sample::{
    delta_decode_16, delta_decode_8, XM_PAN_CENTER, XM_SAMPLE_16BIT, XM_SAMPLE_NAME_LEN,
};
use crate::bytes::ByteReader;
use crate::keymap::sample_map_from_keys;
use crate::pitch::xm_sample_rate;
use crate::text::read_fixed;
use crate::ReadError;

/// Decode an XM file.
pub fn read_xm(data: &[u8]) -> Result<Module, ReadError> {
    let mut reader = ByteReader::new(data);

    let magic = reader.bytes(XM_MAGIC.len(), "header")?;
    if magic != XM_MAGIC {
        return Err(ReadError::BadMagic {
            what: "XM",
            found: magic.to_vec(),
        });
    }
    let name = read_fixed(reader.bytes(XM_NAME_LEN, "header")?);
    reader.seek(XM_PREAMBLE_LEN, "header")?;

    let header_size = reader.u32("header")? as usize;
    let song_length = reader.u16("header")? as usize;
    let restart_position = reader.u16("header")?;
    let num_channels = reader.u16("header")?;
    let num_patterns = reader.u16("header")?;
    let num_instruments = reader.u16("header")?;
    let flags = reader.u16("header")?;
    let speed = reader.u16("header")?;
    let tempo = reader.u16("header")?;
    let order_table = reader.bytes(XM_ORDER_TABLE_LEN, "order table")?;

    if song_length > XM_ORDER_TABLE_LEN {
        return Err(ReadError::Corrupt(format!("song length {}", song_length)));
    }
    let num_channels = u8::try_from(num_channels)
        .map_err(|_| ReadError::Corrupt(format!("{} channels", num_channels)))?;

    let mut module = Module::new(&name, num_channels);
    module.order = order_table[..song_length].to_vec();
    module.restart_position = restart_position;
    module.linear_frequencies = flags & XM_FLAG_LINEAR != 0;
    module.speed = speed.min(u8::MAX as u16) as u8;
    module.tempo = tempo;

    reader.seek(XM_PREAMBLE_LEN + header_size, "header")?;

    for _ in 0..num_patterns {
        let start = reader.position();
        let header_len = reader.u32("pattern header")? as usize;
        let packing = reader.u8("pattern header")?;
        if packing != 0 {
            return Err(ReadError::Unsupported(format!("pattern packing {}", packing)));
        }
        let rows = reader.u16("pattern header")? as usize;
        let packed_len = reader.u16("pattern header")? as usize;
        reader.seek(start + header_len, "pattern header")?;
        let packed = reader.bytes(packed_len, "pattern data")?;
        module
            .patterns
            .push(unpack_pattern(packed, rows, num_channels as usize)?);
    }

    for _ in 0..num_instruments {
        read_instrument(&mut reader, &mut module)?;
    }

    Ok(module)
}

fn read_envelope(
    points: &[u8],
    count: u8,
    indices: &[u8],
    flags: u8,
    offset: i16,
) -> Option<Envelope> {
    if count == 0 && flags == 0 {
        return None;
    }
    let points = points
        .chunks_exact(4)
        .take(count as usize)
        .map(|chunk| {
            let tick = u16::from_le_bytes([chunk[0], chunk[1]]);
            let value = (u16::from_le_bytes([chunk[2], chunk[3]]) as i16).wrapping_sub(offset);
            EnvelopePoint::new(tick, value as i8)
        })
        .collect();
    Some(Envelope {
        points,
        sustain: (flags & env_flags::SUSTAIN != 0).then_some(indices[0]),
        loop_range: (flags & env_flags::LOOP != 0).then_some((indices[1], indices[2])),
        enabled: flags & env_flags::ENABLED != 0,
    })
}

fn vibrato_waveform(value: u8) -> VibratoWaveform {
    match value {
        1 => VibratoWaveform::Square,
        2 => VibratoWaveform::RampDown,
        3 => VibratoWaveform::RampUp,
        _ => VibratoWaveform::Sine,
    }
}

struct SampleHeader {
    length: usize,
    loop_start: u32,
    loop_length: u32,
    volume: u8,
    finetune: i8,
    kind: u8,
    panning: u8,
    relative_note: i8,
    name: String,
}

fn read_sample_header(reader: &mut ByteReader<'_>, size: usize) -> Result<SampleHeader, ReadError> {
    let start = reader.position();
    let header = SampleHeader {
        length: reader.u32("sample header")? as usize,
        loop_start: reader.u32("sample header")?,
        loop_length: reader.u32("sample header")?,
        volume: reader.u8("sample header")?,
        finetune: reader.i8("sample header")?,
        kind: reader.u8("sample header")?,
        panning: reader.u8("sample header")?,
        relative_note: reader.i8("sample header")?,
        name: {
            reader.u8("sample header")?;
            read_fixed(reader.bytes(XM_SAMPLE_NAME_LEN, "sample header")?)
        },
    };
    reader.seek(start + size, "sample header")?;
    Ok(header)
}

fn read_sample_data(
    reader: &mut ByteReader<'_>,
    header: SampleHeader,
    vibrato: AutoVibrato,
) -> Result<Sample, ReadError> {
    let raw = reader.bytes(header.length, "sample data")?;
    let rate = xm_sample_rate(header.finetune, header.relative_note);

    let mut sample = if header.kind & XM_SAMPLE_16BIT != 0 {
        let deltas: Vec<i16> = raw
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Sample::pcm16(&header.name, &delta_decode_16(&deltas), rate)
    } else {
        let deltas: Vec<i8> = raw.iter().map(|&b| b as i8).collect();
        let data = delta_decode_8(&deltas)
            .into_iter()
            .map(|frame| frame as u8 ^ 0x80)
            .collect();
        Sample::pcm8(&header.name, data, rate)
    };

    let bytes_per_frame = sample.bit_depth.bytes_per_frame() as u32;
    sample.loop_mode = match header.kind & 0x03 {
        0 => LoopMode::None,
        1 => LoopMode::Forward,
        _ => LoopMode::PingPong,
    };
    if sample.loop_mode != LoopMode::None {
        sample.loop_start = header.loop_start / bytes_per_frame;
        sample.loop_end = header.loop_start.saturating_add(header.loop_length) / bytes_per_frame;
    }
    sample.volume = header.volume;
    sample.global_volume = SAMPLE_VOLUME_MAX;
    sample.panning =
        (header.panning != XM_PAN_CENTER).then(|| ((header.panning as u16 + 2) / 4) as u8);
    sample.vibrato = vibrato;
    Ok(sample)
}

fn read_instrument(reader: &mut ByteReader<'_>, module: &mut Module) -> Result<(), ReadError> {
    let start = reader.position();
    let size = reader.u32("instrument header")? as usize;
    let name = read_fixed(reader.bytes(XM_INSTRUMENT_NAME_LEN, "instrument header")?);
    reader.u8("instrument header")?;
    let num_samples = reader.u16("instrument header")? as usize;
    if num_samples == 0 {
        return Err(ReadError::Unsupported(format!(
            "instrument '{}' has no samples",
            name
        )));
    }

    let sample_header_size = reader.u32("instrument header")? as usize;
    let keys = reader.bytes(XM_KEYMAP_LEN, "instrument header")?;
    let volume_points = reader.bytes(XM_ENVELOPE_POINTS * 4, "instrument header")?;
    let panning_points = reader.bytes(XM_ENVELOPE_POINTS * 4, "instrument header")?;
    let volume_count = reader.u8("instrument header")?;
    let panning_count = reader.u8("instrument header")?;
    let volume_indices = reader.bytes(3, "instrument header")?;
    let panning_indices = reader.bytes(3, "instrument header")?;
    let volume_flags = reader.u8("instrument header")?;
    let panning_flags = reader.u8("instrument header")?;
    let vibrato = AutoVibrato {
        waveform: vibrato_waveform(reader.u8("instrument header")?),
        sweep: reader.u8("instrument header")?,
        depth: reader.u8("instrument header")?,
        rate: reader.u8("instrument header")?,
    };
    let fadeout = reader.u16("instrument header")?;
    reader.seek(start + size, "instrument header")?;

    let headers = (0..num_samples)
        .map(|_| read_sample_header(reader, sample_header_size))
        .collect::<Result<Vec<_>, _>>()?;

    let first = module.samples.len();
    for header in headers {
        let sample = read_sample_data(reader, header, vibrato)?;
        module.samples.push(sample);
    }

    let table: Vec<Option<usize>> = keys
        .iter()
        .map(|&local| {
            let local = local as usize;
            (local < num_samples).then_some(first + local)
        })
        .collect();

    module.instruments.push(Instrument {
        name,
        sample_map: sample_map_from_keys(&table),
        volume_envelope: read_envelope(volume_points, volume_count, volume_indices, volume_flags, 0),
        panning_envelope: read_envelope(
            panning_points,
            panning_count,
            panning_indices,
            panning_flags,
            XM_PANNING_ENVELOPE_OFFSET,
        ),
        pitch_envelope: None,
        pitch_envelope_mode: PitchEnvelopeMode::Pitch,
        new_note_action: NewNoteAction::Cut,
        fadeout,
        global_volume: 128,
        default_pan: None,
    });

    Ok(())
}
