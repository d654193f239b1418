//! XM file writer - validates a module and emits the complete file.

use std::io::Write;

use modforge_model::{validate, Format, Module};
use tracing::{debug, trace};

use super::header::write_header;
use super::instrument::write_instrument;
use super::pattern::{pack_pattern, write_pattern};
use crate::EncodeError;

/// Validate `module` for XM and write it to `writer`.
///
/// Nothing is written when validation fails. The writer is not flushed.
pub fn write_xm<W: Write>(module: &Module, writer: &mut W) -> Result<(), EncodeError> {
    validate(module, Format::Xm)?;

    write_header(writer, module)?;

    let mut pattern_bytes = 0usize;
    for (index, pattern) in module.patterns.iter().enumerate() {
        let packed = pack_pattern(pattern);
        trace!(
            pattern = index,
            rows = pattern.num_rows(),
            packed = packed.len(),
            "xm pattern"
        );
        pattern_bytes += packed.len();
        write_pattern(writer, pattern.num_rows(), &packed)?;
    }

    for (index, instrument) in module.instruments.iter().enumerate() {
        trace!(instrument = index, name = %instrument.name, "xm instrument");
        write_instrument(writer, instrument, &module.samples)?;
    }

    debug!(
        channels = module.num_channels,
        patterns = module.patterns.len(),
        instruments = module.instruments.len(),
        pattern_bytes,
        "wrote xm module"
    );

    Ok(())
}

/// Encode `module` as XM into a fresh buffer.
pub fn xm_to_bytes(module: &Module) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    write_xm(module, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_model::{Instrument, Note, Pattern, Sample, ValidationError};

    fn demo() -> Module {
        let mut module = Module::new("Writer", 2);
        module.add_sample(Sample::pcm8("tone", vec![128; 100], 8363));
        module.add_instrument(Instrument::new("tone", 0));
        module.add_pattern(Pattern::empty(16, 2).with_note(0, 0, Note::from_name("C-4", 1)));
        module.with_order(&[0])
    }

    #[test]
    fn writes_complete_file() {
        let bytes = xm_to_bytes(&demo()).unwrap();
        let packed = pack_pattern(&demo().patterns[0]).len();
        assert_eq!(bytes.len(), 336 + 9 + packed + 263 + 40 + 100);
    }

    #[test]
    fn invalid_module_writes_nothing() {
        let mut module = demo();
        module.order = vec![3];
        let mut buf = Vec::new();
        let err = write_xm(&module, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Validation(ValidationError::OrderOutOfRange { .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(xm_to_bytes(&demo()).unwrap(), xm_to_bytes(&demo()).unwrap());
    }
}
