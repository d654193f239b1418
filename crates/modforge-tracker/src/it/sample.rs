//! IT sample headers and raw sample data.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{BitDepth, LoopMode, Sample, VibratoWaveform};

use super::instrument::IT_FILENAME_LEN;
use crate::pitch::it_c5_speed;
use crate::text::write_fixed;

/// IT sample magic identifier.
pub const IT_SAMPLE_MAGIC: &[u8; 4] = b"IMPS";

/// Size of one sample header.
pub const IT_SAMPLE_HEADER_SIZE: usize = 80;

/// Width of the sample name field.
pub const IT_SAMPLE_NAME_LEN: usize = 26;

/// Sample flag bits.
pub mod sample_flags {
    pub const HAS_DATA: u8 = 0x01;
    pub const SIXTEEN_BIT: u8 = 0x02;
    pub const COMPRESSED: u8 = 0x08;
    pub const LOOP: u8 = 0x10;
    pub const SUSTAIN_LOOP: u8 = 0x20;
    pub const PING_PONG: u8 = 0x40;
    pub const SUSTAIN_PING_PONG: u8 = 0x80;
}

/// Convert flag for signed sample data.
pub const IT_CONVERT_SIGNED: u8 = 0x01;

/// Default pan byte flag marking the pan as used.
pub const IT_SAMPLE_PAN_USED: u8 = 0x80;

/// IT vibrato type for a waveform. Ramp-up is XM-only and rejected by validation.
pub fn vibrato_type(waveform: VibratoWaveform) -> u8 {
    match waveform {
        VibratoWaveform::Sine | VibratoWaveform::RampUp => 0,
        VibratoWaveform::RampDown => 1,
        VibratoWaveform::Square => 2,
        VibratoWaveform::Random => 3,
    }
}

/// Bytes of sample data [`write_sample_data`] emits.
pub fn data_len(sample: &Sample) -> usize {
    sample.frames() * sample.bit_depth.bytes_per_frame()
}

/// Write an 80-byte sample header pointing at `data_offset`.
pub fn write_sample_header<W: Write>(
    writer: &mut W,
    sample: &Sample,
    data_offset: u32,
) -> io::Result<()> {
    let frames = sample.frames() as u32;

    let mut flags = 0;
    if frames > 0 {
        flags |= sample_flags::HAS_DATA;
    }
    if sample.bit_depth == BitDepth::Sixteen {
        flags |= sample_flags::SIXTEEN_BIT;
    }
    match sample.loop_mode {
        LoopMode::None => {}
        LoopMode::Forward => flags |= sample_flags::LOOP,
        LoopMode::PingPong => flags |= sample_flags::LOOP | sample_flags::PING_PONG,
    }
    let (loop_start, loop_end) = match sample.loop_mode {
        LoopMode::None => (0, 0),
        _ => (sample.loop_start, sample.loop_end),
    };
    let convert = match sample.bit_depth {
        BitDepth::Eight => 0,
        BitDepth::Sixteen => IT_CONVERT_SIGNED,
    };
    let panning = sample
        .panning
        .map(|pan| pan | IT_SAMPLE_PAN_USED)
        .unwrap_or(modforge_model::module::PAN_CENTER);

    let c5_speed = it_c5_speed(sample.sample_rate, sample.relative_note, sample.finetune)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("sample '{}': C-5 speed does not fit 32 bits", sample.name),
            )
        })?;

    writer.write_all(IT_SAMPLE_MAGIC)?;
    writer.write_all(&[0u8; IT_FILENAME_LEN])?;
    writer.write_u8(0)?;
    writer.write_u8(sample.global_volume)?;
    writer.write_u8(flags)?;
    writer.write_u8(sample.volume)?;
    write_fixed(writer, &sample.name, IT_SAMPLE_NAME_LEN, 0)?;
    writer.write_u8(convert)?;
    writer.write_u8(panning)?;
    writer.write_u32::<LittleEndian>(frames)?;
    writer.write_u32::<LittleEndian>(loop_start)?;
    writer.write_u32::<LittleEndian>(loop_end)?;
    writer.write_u32::<LittleEndian>(c5_speed)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(data_offset)?;
    writer.write_u8(sample.vibrato.rate)?;
    writer.write_u8(sample.vibrato.depth)?;
    writer.write_u8(sample.vibrato.sweep)?;
    writer.write_u8(vibrato_type(sample.vibrato.waveform))?;

    Ok(())
}

/// Write raw sample data: unsigned 8-bit or signed 16-bit little-endian.
pub fn write_sample_data<W: Write>(writer: &mut W, sample: &Sample) -> io::Result<()> {
    writer.write_all(&sample.data[..data_len(sample)])
}
