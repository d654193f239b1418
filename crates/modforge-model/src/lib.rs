//! modforge data model - tracker songs as plain values
//!
//! This crate describes a tracker song independently of its file format:
//! patterns of notes, instruments with envelopes and key maps, and raw PCM
//! samples. [`validate`] checks a [`Module`] against the fixed-width limits of
//! a target [`Format`] so that encoders never meet a value they cannot store.
//!
//! # Example
//!
//! ```
//! use modforge_model::{validate, Format, Instrument, Module, Note, Pattern, Sample};
//!
//! let mut module = Module::new("demo", 2);
//! let sample = module.add_sample(Sample::pcm8("square", vec![192, 192, 64, 64], 8363));
//! let lead = module.add_instrument(Instrument::new("lead", sample)) as u8;
//! module.add_pattern(Pattern::empty(16, 2).with_note(0, 0, Note::from_name("C-4", lead)));
//! let module = module.with_order(&[0]);
//!
//! validate(&module, Format::Xm).unwrap();
//! ```
//!
//! # Module Structure
//!
//! - [`module`]: the song and its channel defaults
//! - [`pattern`] / [`note`]: pattern grids and cells
//! - [`effect`]: per-format effect opcodes and constructors
//! - [`instrument`] / [`envelope`]: instruments, sample maps and envelopes
//! - [`sample`]: PCM samples and WAV import
//! - [`pitch`]: sample rate and tuning conversions
//! - [`format`]: per-format limits
//! - [`validation`]: structural checks shared by the encoders
//! - [`parse`]: JSON descriptions

pub mod effect;
pub mod envelope;
pub mod error;
pub mod format;
pub mod instrument;
pub mod module;
pub mod note;
pub mod parse;
pub mod pattern;
pub mod pitch;
pub mod sample;
pub mod validation;

pub use effect::set_volume_column;
pub use envelope::{Envelope, EnvelopeKind, EnvelopePoint};
pub use error::{ParseError, SampleImportError, ValidationError};
pub use format::{Format, FormatLimits, IT_LIMITS, XM_LIMITS};
pub use instrument::{Instrument, KeyRange, NewNoteAction, PitchEnvelopeMode, SampleMap};
pub use module::{ChannelDefaults, Module};
pub use note::{pitch_from_name, Effect, Key, Note};
pub use parse::parse_module_json;
pub use pattern::Pattern;
pub use sample::{AutoVibrato, BitDepth, LoopMode, Sample, VibratoWaveform};
pub use validation::validate;
