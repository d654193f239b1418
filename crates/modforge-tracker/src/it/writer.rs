//! IT file writer - validates a module, lays out every block, then emits the
//! file in one forward pass.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use modforge_model::{validate, Format, Module, ValidationError};
use tracing::{debug, trace};

use super::header::{encode_message, write_header, IT_HEADER_SIZE, IT_ORDER_END};
use super::instrument::{write_instrument, IT_INSTRUMENT_SIZE};
use super::pattern::{pack_pattern, write_pattern, IT_PATTERN_HEADER_SIZE};
use super::sample::{data_len, write_sample_data, write_sample_header, IT_SAMPLE_HEADER_SIZE};
use crate::EncodeError;

/// Largest packed pattern the 16-bit length field can describe.
pub const IT_MAX_PACKED_PATTERN: usize = u16::MAX as usize;

/// Absolute offsets of every block in an IT file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItLayout {
    pub message: u32,
    pub instruments: Vec<u32>,
    pub sample_headers: Vec<u32>,
    pub patterns: Vec<u32>,
    pub sample_data: Vec<u32>,
    /// Total file size.
    pub end: u32,
}

impl ItLayout {
    /// Compute offsets for `module` given its packed patterns and encoded
    /// message.
    pub fn new(module: &Module, packed: &[Vec<u8>], message: &[u8]) -> Self {
        let mut offset = IT_HEADER_SIZE + module.order.len() + 1;
        offset += 4 * (module.instruments.len() + module.samples.len() + module.patterns.len());

        let message_offset = offset;
        offset += message.len();

        let mut take = |size: usize| {
            let at = offset as u32;
            offset += size;
            at
        };

        let instruments = module
            .instruments
            .iter()
            .map(|_| take(IT_INSTRUMENT_SIZE))
            .collect();
        let sample_headers = module
            .samples
            .iter()
            .map(|_| take(IT_SAMPLE_HEADER_SIZE))
            .collect();
        let patterns = packed
            .iter()
            .map(|data| take(IT_PATTERN_HEADER_SIZE + data.len()))
            .collect();
        let sample_data = module.samples.iter().map(|s| take(data_len(s))).collect();

        Self {
            message: message_offset as u32,
            instruments,
            sample_headers,
            patterns,
            sample_data,
            end: offset as u32,
        }
    }
}

/// Pack every pattern, refusing any that overflow the length field.
fn pack_patterns(module: &Module) -> Result<Vec<Vec<u8>>, ValidationError> {
    module
        .patterns
        .iter()
        .enumerate()
        .map(|(index, pattern)| {
            let packed = pack_pattern(pattern);
            if packed.len() > IT_MAX_PACKED_PATTERN {
                return Err(ValidationError::PatternTooLarge {
                    pattern: index,
                    size: packed.len(),
                    max: IT_MAX_PACKED_PATTERN,
                });
            }
            trace!(
                pattern = index,
                rows = pattern.num_rows(),
                packed = packed.len(),
                "it pattern"
            );
            Ok(packed)
        })
        .collect()
}

/// Validate `module` for IT and write it to `writer`.
///
/// All offsets are computed up front so the writer only needs [`Write`].
/// Nothing is written when validation fails. The writer is not flushed.
pub fn write_it<W: Write>(module: &Module, writer: &mut W) -> Result<(), EncodeError> {
    validate(module, Format::It)?;
    let packed = pack_patterns(module)?;
    let message = module
        .message
        .as_deref()
        .map(encode_message)
        .unwrap_or_default();
    let layout = ItLayout::new(module, &packed, &message);

    write_header(writer, module, &message, layout.message)?;
    writer.write_all(&module.order)?;
    writer.write_u8(IT_ORDER_END)?;
    for &offset in layout
        .instruments
        .iter()
        .chain(&layout.sample_headers)
        .chain(&layout.patterns)
    {
        writer.write_u32::<LittleEndian>(offset)?;
    }
    writer.write_all(&message)?;

    for (index, instrument) in module.instruments.iter().enumerate() {
        trace!(instrument = index, name = %instrument.name, "it instrument");
        write_instrument(writer, instrument)?;
    }
    for (sample, &offset) in module.samples.iter().zip(&layout.sample_data) {
        write_sample_header(writer, sample, offset)?;
    }
    for (pattern, data) in module.patterns.iter().zip(&packed) {
        write_pattern(writer, pattern.num_rows(), data)?;
    }
    for sample in &module.samples {
        write_sample_data(writer, sample)?;
    }

    debug!(
        channels = module.num_channels,
        patterns = module.patterns.len(),
        instruments = module.instruments.len(),
        samples = module.samples.len(),
        bytes = layout.end,
        "wrote it module"
    );

    Ok(())
}

/// Encode `module` as IT into a fresh buffer.
pub fn it_to_bytes(module: &Module) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    write_it(module, &mut buffer)?;
    Ok(buffer)
}
