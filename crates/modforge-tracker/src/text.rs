//! Fixed-width text fields.

use std::io::{self, Write};

/// Write `text` into exactly `width` bytes, truncating or padding with `pad`.
pub fn write_fixed<W: Write>(writer: &mut W, text: &str, width: usize, pad: u8) -> io::Result<()> {
    writer.write_all(&fixed_bytes(text, width, pad))
}

/// `text` truncated or padded to exactly `width` bytes.
pub fn fixed_bytes(text: &str, width: usize, pad: u8) -> Vec<u8> {
    let mut buf = vec![pad; width];
    let bytes = text.as_bytes();
    let len = bytes.len().min(width);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Decode a NUL-terminated or space-padded field.
pub fn read_fixed(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_text() {
        assert_eq!(fixed_bytes("abc", 5, 0), b"abc\0\0".to_vec());
        assert_eq!(fixed_bytes("abc", 5, b' '), b"abc  ".to_vec());
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(fixed_bytes("abcdefgh", 4, 0), b"abcd".to_vec());
    }

    #[test]
    fn reads_back_padding() {
        assert_eq!(read_fixed(b"name\0\0\0"), "name");
        assert_eq!(read_fixed(b"name    "), "name");
        assert_eq!(read_fixed(b"full"), "full");
    }
}
