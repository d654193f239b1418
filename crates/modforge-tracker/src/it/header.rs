//! IT module header.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use modforge_model::Module;

use crate::text::write_fixed;

/// IT file magic identifier.
pub const IT_MAGIC: &[u8; 4] = b"IMPM";

/// Size of the fixed module header.
pub const IT_HEADER_SIZE: usize = 192;

/// Width of the song name field.
pub const IT_NAME_LEN: usize = 26;

/// Tracker version that created the file (Cwt).
pub const IT_CREATED_WITH: u16 = 0x0214;

/// Oldest compatible tracker version (Cmwt).
pub const IT_COMPATIBLE_WITH: u16 = 0x0200;

/// Order list terminator.
pub const IT_ORDER_END: u8 = 255;

/// Entries in the channel pan and volume tables.
pub const IT_CHANNEL_TABLE_LEN: usize = 64;

/// Pan table value for a disabled channel.
pub const IT_CHANNEL_DISABLED: u8 = 128;

/// Row highlight (minor, major).
pub const IT_HIGHLIGHT: (u8, u8) = (4, 16);

pub const IT_GLOBAL_VOLUME: u8 = 128;
pub const IT_MIX_VOLUME: u8 = 48;
pub const IT_SEPARATION: u8 = 128;

/// Header flag bits.
pub mod flags {
    pub const STEREO: u16 = 0x01;
    pub const VOL_0_MIX: u16 = 0x02;
    pub const USE_INSTRUMENTS: u16 = 0x04;
    pub const LINEAR_SLIDES: u16 = 0x08;
    /// Old (S3M-compatible) effect semantics. Never set.
    pub const OLD_EFFECTS: u16 = 0x10;
    /// Gxx shares memory with Exx/Fxx. Never set.
    pub const LINK_G_MEMORY: u16 = 0x20;
}

/// Special field bit marking an attached song message.
pub const IT_SPECIAL_MESSAGE: u16 = 0x01;

/// Song message bytes: CR line endings and a NUL terminator.
pub fn encode_message(message: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = message
        .bytes()
        .map(|b| if b == b'\n' { b'\r' } else { b })
        .collect();
    bytes.push(0);
    bytes
}

/// Write the 192-byte module header.
///
/// `message` is the encoded song message (empty for none) and
/// `message_offset` its absolute file position.
pub fn write_header<W: Write>(
    writer: &mut W,
    module: &Module,
    message: &[u8],
    message_offset: u32,
) -> io::Result<()> {
    writer.write_all(IT_MAGIC)?;
    write_fixed(writer, &module.name, IT_NAME_LEN, 0)?;
    writer.write_u8(IT_HIGHLIGHT.0)?;
    writer.write_u8(IT_HIGHLIGHT.1)?;

    writer.write_u16::<LittleEndian>(module.order.len() as u16 + 1)?;
    writer.write_u16::<LittleEndian>(module.instruments.len() as u16)?;
    writer.write_u16::<LittleEndian>(module.samples.len() as u16)?;
    writer.write_u16::<LittleEndian>(module.patterns.len() as u16)?;
    writer.write_u16::<LittleEndian>(IT_CREATED_WITH)?;
    writer.write_u16::<LittleEndian>(IT_COMPATIBLE_WITH)?;

    let mut header_flags = flags::STEREO | flags::USE_INSTRUMENTS;
    if module.linear_frequencies {
        header_flags |= flags::LINEAR_SLIDES;
    }
    writer.write_u16::<LittleEndian>(header_flags)?;
    let special = if message.is_empty() {
        0
    } else {
        IT_SPECIAL_MESSAGE
    };
    writer.write_u16::<LittleEndian>(special)?;

    writer.write_u8(IT_GLOBAL_VOLUME)?;
    writer.write_u8(IT_MIX_VOLUME)?;
    writer.write_u8(module.speed)?;
    writer.write_u8(module.tempo as u8)?;
    writer.write_u8(IT_SEPARATION)?;
    writer.write_u8(0)?;

    writer.write_u16::<LittleEndian>(message.len() as u16)?;
    writer.write_u32::<LittleEndian>(if message.is_empty() { 0 } else { message_offset })?;
    writer.write_u32::<LittleEndian>(0)?;

    let channels = module.num_channels as usize;
    let mut pan = [IT_CHANNEL_DISABLED; IT_CHANNEL_TABLE_LEN];
    let mut volume = [0u8; IT_CHANNEL_TABLE_LEN];
    for channel in 0..channels.min(IT_CHANNEL_TABLE_LEN) {
        let defaults = module.channel_default(channel);
        pan[channel] = defaults.panning;
        volume[channel] = defaults.volume;
    }
    writer.write_all(&pan)?;
    writer.write_all(&volume)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_model::ChannelDefaults;

    #[test]
    fn header_is_192_bytes() {
        let module = Module::new("Impulse", 4).with_order(&[0, 1]);
        let mut buf = Vec::new();
        write_header(&mut buf, &module, &[], 0).unwrap();

        assert_eq!(buf.len(), IT_HEADER_SIZE);
        assert_eq!(&buf[0..4], IT_MAGIC);
        assert_eq!(&buf[4..11], b"Impulse");
        assert_eq!(u16::from_le_bytes([buf[32], buf[33]]), 3);
        assert_eq!(u16::from_le_bytes([buf[40], buf[41]]), IT_CREATED_WITH);
        assert_eq!(u16::from_le_bytes([buf[44], buf[45]]), 0x0D);
        assert_eq!(u16::from_le_bytes([buf[46], buf[47]]), 0);
        assert_eq!(buf[50], 6);
        assert_eq!(buf[51], 125);
    }

    #[test]
    fn channel_tables_disable_unused_channels() {
        let mut module = Module::new("x", 2).with_order(&[0]);
        module.channel_defaults = vec![ChannelDefaults {
            panning: 0,
            volume: 40,
        }];
        let mut buf = Vec::new();
        write_header(&mut buf, &module, &[], 0).unwrap();

        assert_eq!(&buf[64..67], &[0, 32, IT_CHANNEL_DISABLED]);
        assert_eq!(&buf[128..131], &[40, 64, 0]);
    }

    #[test]
    fn message_fields() {
        let module = Module::new("x", 1).with_order(&[0]);
        let message = encode_message("a\nb");
        assert_eq!(message, b"a\rb\0".to_vec());

        let mut buf = Vec::new();
        write_header(&mut buf, &module, &message, 0x1234).unwrap();
        assert_eq!(u16::from_le_bytes([buf[46], buf[47]]), IT_SPECIAL_MESSAGE);
        assert_eq!(u16::from_le_bytes([buf[54], buf[55]]), 4);
        assert_eq!(
            u32::from_le_bytes([buf[56], buf[57], buf[58], buf[59]]),
            0x1234
        );
    }
}
