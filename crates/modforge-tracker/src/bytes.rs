//! Bounds-checked little-endian reads for the conformance readers.

use byteorder::{ByteOrder, LittleEndian};

use crate::ReadError;

/// Forward-only view over an input buffer with random seeks.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn seek(&mut self, pos: usize, context: &'static str) -> Result<(), ReadError> {
        if pos > self.data.len() {
            return Err(ReadError::Truncated(context));
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], ReadError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(ReadError::Truncated(context))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self, context: &'static str) -> Result<u8, ReadError> {
        Ok(self.bytes(1, context)?[0])
    }

    pub(crate) fn i8(&mut self, context: &'static str) -> Result<i8, ReadError> {
        Ok(self.u8(context)? as i8)
    }

    pub(crate) fn u16(&mut self, context: &'static str) -> Result<u16, ReadError> {
        Ok(LittleEndian::read_u16(self.bytes(2, context)?))
    }

    pub(crate) fn u32(&mut self, context: &'static str) -> Result<u32, ReadError> {
        Ok(LittleEndian::read_u32(self.bytes(4, context)?))
    }
}
