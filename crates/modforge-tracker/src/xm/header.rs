//! XM module header and order table.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::Module;

use crate::text::write_fixed;

/// XM file magic identifier.
pub const XM_MAGIC: &[u8; 17] = b"Extended Module: ";

/// Marker byte after the module name.
pub const XM_MARKER: u8 = 0x1A;

/// XM format version (1.04).
pub const XM_VERSION: u16 = 0x0104;

/// Tracker name written into every file.
pub const XM_TRACKER_NAME: &str = "modforge";

/// Width of the module and tracker name fields.
pub const XM_NAME_LEN: usize = 20;

/// Entries in the order table.
pub const XM_ORDER_TABLE_LEN: usize = 256;

/// Bytes before the header-size field.
pub const XM_PREAMBLE_LEN: usize = 60;

/// 16-bit fields between the header-size field and the order table:
/// song length, restart, channels, patterns, instruments, flags, speed, BPM.
const HEADER_WORDS: usize = 8;

/// Value of the header-size field. Counts the field itself, the header words
/// and the order table.
pub const XM_HEADER_SIZE: u32 = (4 + HEADER_WORDS * 2 + XM_ORDER_TABLE_LEN) as u32;

/// Flag bit selecting the linear frequency table.
pub const XM_FLAG_LINEAR: u16 = 0x01;

/// Write the module header and order table.
pub fn write_header<W: Write>(writer: &mut W, module: &Module) -> io::Result<()> {
    writer.write_all(XM_MAGIC)?;
    write_fixed(writer, &module.name, XM_NAME_LEN, 0)?;
    writer.write_u8(XM_MARKER)?;
    write_fixed(writer, XM_TRACKER_NAME, XM_NAME_LEN, b' ')?;
    writer.write_u16::<LittleEndian>(XM_VERSION)?;
    writer.write_u32::<LittleEndian>(XM_HEADER_SIZE)?;

    writer.write_u16::<LittleEndian>(module.order.len() as u16)?;
    writer.write_u16::<LittleEndian>(module.restart_position)?;
    writer.write_u16::<LittleEndian>(module.num_channels as u16)?;
    writer.write_u16::<LittleEndian>(module.patterns.len() as u16)?;
    writer.write_u16::<LittleEndian>(module.instruments.len() as u16)?;
    let flags = if module.linear_frequencies {
        XM_FLAG_LINEAR
    } else {
        0
    };
    writer.write_u16::<LittleEndian>(flags)?;
    writer.write_u16::<LittleEndian>(module.speed as u16)?;
    writer.write_u16::<LittleEndian>(module.tempo)?;

    let mut order_table = [0u8; XM_ORDER_TABLE_LEN];
    for (slot, &pattern) in order_table.iter_mut().zip(&module.order) {
        *slot = pattern;
    }
    writer.write_all(&order_table)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_336_bytes() {
        let module = Module::new("Test Song", 8).with_order(&[0, 1]);
        let mut buf = Vec::new();
        write_header(&mut buf, &module).unwrap();

        assert_eq!(XM_HEADER_SIZE, 276);
        assert_eq!(buf.len(), XM_PREAMBLE_LEN + XM_HEADER_SIZE as usize);
        assert_eq!(&buf[0..17], XM_MAGIC);
        assert_eq!(buf[37], XM_MARKER);
        assert_eq!(&buf[38..58], b"modforge            ");
        assert_eq!(u16::from_le_bytes([buf[64], buf[65]]), 2);
        assert_eq!(u16::from_le_bytes([buf[68], buf[69]]), 8);
    }

    #[test]
    fn amiga_frequencies_clear_flag() {
        let mut module = Module::new("x", 1).with_order(&[0]);
        module.linear_frequencies = false;
        let mut buf = Vec::new();
        write_header(&mut buf, &module).unwrap();
        assert_eq!(u16::from_le_bytes([buf[74], buf[75]]), 0);
    }
}
