//! IT (Impulse Tracker) writer and conformance reader.
//!
//! # IT Format Overview
//!
//! IT is the module format of Impulse Tracker 2.14:
//! - Up to 64 channels with per-channel default pan and volume
//! - Instruments with new-note actions and volume, panning and pitch/filter
//!   envelopes of up to 25 nodes
//! - A 120-key note-to-sample table per instrument
//! - Patterns packed with per-channel field memory
//! - An optional song message
//!
//! Every block is addressed through absolute offsets, so [`write_it`] computes
//! the full layout before the first byte goes out.

mod header;
mod instrument;
mod pattern;
mod reader;
mod sample;
mod writer;

pub use header::*;
pub use instrument::*;
pub use pattern::*;
pub use reader::read_it;
pub use sample::*;
pub use writer::{it_to_bytes, write_it, ItLayout, IT_MAX_PACKED_PATTERN};
