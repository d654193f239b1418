//! modforge tracker backend - byte-exact XM/IT module encoding
//!
//! This crate serializes a validated [`modforge_model::Module`] into the two
//! classic tracker formats and reads those files back.
//!
//! # Features
//!
//! - **XM (FastTracker II)**: up to 32 channels, 128 instruments, multi-sample
//!   key maps, delta-encoded sample data
//! - **IT (Impulse Tracker)**: up to 64 channels, per-channel pan/volume tables,
//!   new-note actions, pitch/filter envelopes, song message
//! - **Conformance readers**: [`read_xm`] and [`read_it`] decode the subset the
//!   encoders write, for round-trip checks
//! - **Content hashes**: [`encode`] returns a BLAKE3 hash of the output bytes
//!
//! # Determinism
//!
//! Encoding is a pure function of the module: the same module always produces
//! byte-identical output and the same hash.
//!
//! # Example
//!
//! ```
//! use modforge_model::{Format, Instrument, Module, Note, Pattern, Sample};
//! use modforge_tracker::{encode, write_xm};
//!
//! let mut module = Module::new("demo", 2);
//! module.add_sample(Sample::pcm8("square", vec![192, 192, 64, 64], 8363));
//! module.add_instrument(Instrument::new("lead", 0));
//! module.add_pattern(Pattern::empty(16, 2).with_note(0, 0, Note::from_name("C-4", 1)));
//! let module = module.with_order(&[0]);
//!
//! let mut bytes = Vec::new();
//! write_xm(&module, &mut bytes).unwrap();
//!
//! let encoded = encode(&module, Format::Xm).unwrap();
//! assert_eq!(encoded.data, bytes);
//! assert_eq!(encoded.extension, "xm");
//! ```
//!
//! # Module Structure
//!
//! - [`xm`]: XM writer, pattern packer and reader
//! - [`it`]: IT writer, pattern packer and reader
//! - [`encode`](mod@encode): format dispatch and hashing

mod bytes;
pub mod encode;
pub mod it;
mod keymap;
pub mod text;
pub mod xm;

pub use modforge_model::pitch;
use modforge_model::ValidationError;
use thiserror::Error;

pub use encode::{encode, EncodedModule};
pub use it::{read_it, write_it, ItPatternPacker};
pub use xm::{read_xm, write_xm, XmPatternPacker};

/// Error from encoding a module.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The module violates a format invariant. Nothing was written.
    #[error("invalid module: {0}")]
    Validation(#[from] ValidationError),

    /// The sink failed. It may hold a partial file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error from reading a module file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input ended inside a structure.
    #[error("file truncated while reading {0}")]
    Truncated(&'static str),

    /// A magic identifier did not match.
    #[error("bad {what} magic: found {found:?}")]
    BadMagic { what: &'static str, found: Vec<u8> },

    /// The file uses a layout the reader does not decode.
    #[error("unsupported layout: {0}")]
    Unsupported(String),

    /// A structure is internally inconsistent.
    #[error("corrupt data: {0}")]
    Corrupt(String),
}
