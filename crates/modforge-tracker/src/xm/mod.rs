//! XM (FastTracker II Extended Module) writer and conformance reader.
//!
//! # XM Format Overview
//!
//! XM is the module format of FastTracker II:
//! - Up to 32 channels
//! - Up to 128 instruments, each owning up to 16 samples through a 96-key map
//! - Up to 256 patterns of 1-256 rows, packed with a per-cell field mask
//! - Volume and panning envelopes of up to 12 points
//! - Delta-encoded 8-bit and 16-bit sample data
//!
//! [`write_xm`] validates the module first and writes nothing when it is
//! rejected. [`read_xm`] decodes the files [`write_xm`] produces.

mod header;
mod instrument;
mod pattern;
mod reader;
mod sample;
mod writer;

pub use header::*;
pub use instrument::*;
pub use pattern::*;
pub use reader::read_xm;
pub use sample::*;
pub use writer::{write_xm, xm_to_bytes};
