//! Format dispatch with content hashing.

use modforge_model::{Format, Module};
use tracing::debug;

use crate::it::write_it;
use crate::xm::write_xm;
use crate::EncodeError;

/// Encoded file bytes with their BLAKE3 hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedModule {
    /// Complete file contents.
    pub data: Vec<u8>,
    /// Lowercase hex BLAKE3 hash of `data`.
    pub hash: String,
    /// File extension without the dot.
    pub extension: &'static str,
}

impl EncodedModule {
    /// File size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Validate and encode `module` as `format`.
///
/// Identical modules always produce identical bytes and hashes.
pub fn encode(module: &Module, format: Format) -> Result<EncodedModule, EncodeError> {
    let mut data = Vec::new();
    match format {
        Format::Xm => write_xm(module, &mut data)?,
        Format::It => write_it(module, &mut data)?,
    }
    let hash = blake3::hash(&data).to_hex().to_string();
    debug!(%format, bytes = data.len(), %hash, "encoded module");

    Ok(EncodedModule {
        data,
        hash,
        extension: format.extension(),
    })
}
