//! XM sample headers and delta-encoded sample data.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::{BitDepth, LoopMode, Sample};

use crate::pitch::xm_pitch_correction;
use crate::text::write_fixed;

/// XM sample header size.
pub const XM_SAMPLE_HEADER_SIZE: u32 = 40;

/// Width of the sample name field.
pub const XM_SAMPLE_NAME_LEN: usize = 22;

/// Sample type bit for 16-bit data.
pub const XM_SAMPLE_16BIT: u8 = 0x10;

/// Panning byte written for samples without a default pan.
pub const XM_PAN_CENTER: u8 = 128;

/// Delta-encode signed 16-bit frames; the first frame is relative to zero.
pub fn delta_encode_16(frames: &[i16]) -> Vec<i16> {
    let mut prev = 0i16;
    frames
        .iter()
        .map(|&frame| {
            let delta = frame.wrapping_sub(prev);
            prev = frame;
            delta
        })
        .collect()
}

/// Undo [`delta_encode_16`].
pub fn delta_decode_16(deltas: &[i16]) -> Vec<i16> {
    let mut acc = 0i16;
    deltas
        .iter()
        .map(|&delta| {
            acc = acc.wrapping_add(delta);
            acc
        })
        .collect()
}

/// Delta-encode signed 8-bit frames.
pub fn delta_encode_8(frames: &[i8]) -> Vec<i8> {
    let mut prev = 0i8;
    frames
        .iter()
        .map(|&frame| {
            let delta = frame.wrapping_sub(prev);
            prev = frame;
            delta
        })
        .collect()
}

/// Undo [`delta_encode_8`].
pub fn delta_decode_8(deltas: &[i8]) -> Vec<i8> {
    let mut acc = 0i8;
    deltas
        .iter()
        .map(|&delta| {
            acc = acc.wrapping_add(delta);
            acc
        })
        .collect()
}

/// Loop type bits of the sample type byte.
fn loop_bits(mode: LoopMode) -> u8 {
    match mode {
        LoopMode::None => 0,
        LoopMode::Forward => 1,
        LoopMode::PingPong => 2,
    }
}

/// Write a 40-byte sample header. Lengths and loop points are in bytes.
pub fn write_sample_header<W: Write>(writer: &mut W, sample: &Sample) -> io::Result<()> {
    let bytes_per_frame = sample.bit_depth.bytes_per_frame() as u32;
    let length = sample.frames() as u32 * bytes_per_frame;
    let (loop_start, loop_length) = match sample.loop_mode {
        LoopMode::None => (0, 0),
        _ => (
            sample.loop_start * bytes_per_frame,
            sample.loop_end.saturating_sub(sample.loop_start) * bytes_per_frame,
        ),
    };
    let (finetune, relative_note) =
        xm_pitch_correction(sample.sample_rate, sample.relative_note, sample.finetune)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("sample '{}': tuning does not fit the XM relative note", sample.name),
                )
            })?;

    writer.write_u32::<LittleEndian>(length)?;
    writer.write_u32::<LittleEndian>(loop_start)?;
    writer.write_u32::<LittleEndian>(loop_length)?;
    writer.write_u8(sample.volume)?;
    writer.write_i8(finetune)?;

    let depth_bit = match sample.bit_depth {
        BitDepth::Eight => 0,
        BitDepth::Sixteen => XM_SAMPLE_16BIT,
    };
    writer.write_u8(loop_bits(sample.loop_mode) | depth_bit)?;

    let panning = sample
        .panning
        .map(|pan| (pan as u16 * 4).min(255) as u8)
        .unwrap_or(XM_PAN_CENTER);
    writer.write_u8(panning)?;
    writer.write_i8(relative_note)?;
    writer.write_u8(0)?;
    write_fixed(writer, &sample.name, XM_SAMPLE_NAME_LEN, 0)?;

    Ok(())
}

/// Write sample data: signed and delta-encoded at either bit depth.
pub fn write_sample_data<W: Write>(writer: &mut W, sample: &Sample) -> io::Result<()> {
    match sample.bit_depth {
        BitDepth::Sixteen => {
            let frames: Vec<i16> = sample.pcm16_frames().collect();
            for delta in delta_encode_16(&frames) {
                writer.write_i16::<LittleEndian>(delta)?;
            }
        }
        BitDepth::Eight => {
            let frames: Vec<i8> = sample.data.iter().map(|&b| (b ^ 0x80) as i8).collect();
            let deltas: Vec<u8> = delta_encode_8(&frames).iter().map(|&d| d as u8).collect();
            writer.write_all(&deltas)?;
        }
    }
    Ok(())
}
