//! Structural validation of a module against a target format.
//!
//! Checks run in a fixed order and stop at the first violation:
//! 1. Channel count and channel defaults
//! 2. Header fields (timing, order list, entity counts, module features)
//! 3. Patterns and order references
//! 4. Pattern cells
//! 5. Instruments and their sample maps
//! 6. Envelopes
//! 7. Samples (loops, ranges, features)
//! 8. Sample buffer width
//!
//! A module that passes never needs a field wider than the format allows,
//! with one exception: IT packed pattern sizes depend on the packer and are
//! checked by the IT encoder before it writes anything.

mod header;
mod instrument;
mod pattern;
mod sample;

#[cfg(test)]
mod tests;

use crate::error::ValidationError;
use crate::format::Format;
use crate::module::Module;

/// Validate `module` for `format`, returning the first violation.
pub fn validate(module: &Module, format: Format) -> Result<(), ValidationError> {
    let limits = format.limits();

    header::validate_channels(module, format, limits)?;
    header::validate_header(module, format, limits)?;
    pattern::validate_patterns(module, limits)?;
    pattern::validate_notes(module, format, limits)?;
    instrument::validate_instruments(module, format, limits)?;
    instrument::validate_envelopes(module, limits)?;
    sample::validate_samples(module, format)?;
    sample::validate_bit_depths(module)?;

    Ok(())
}
