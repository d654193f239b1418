//! JSON module descriptions.
//!
//! Dynamically built modules enter through here: deserialize, then validate
//! against the target format before anything can be encoded.

use crate::error::ParseError;
use crate::format::Format;
use crate::module::Module;
use crate::validation::validate;

/// Parse a JSON module description and validate it for `format`.
pub fn parse_module_json(text: &str, format: Format) -> Result<Module, ParseError> {
    let module: Module = serde_json::from_str(text)?;
    validate(&module, format)?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::note::Key;

    const SONG: &str = r#"{
        "name": "json song",
        "num_channels": 2,
        "samples": [
            {"name": "square", "bit_depth": "eight", "data": [192, 192, 64, 64], "sample_rate": 8363}
        ],
        "instruments": [{"name": "lead", "sample_map": {"single": 0}}],
        "patterns": [
            {"rows": [
                [{"key": {"pitch": 48}, "instrument": 1}, {}],
                [{"key": "off"}, {"volume": 8, "effect": {"command": 15, "param": 3}}]
            ]}
        ],
        "order": [0, 0],
        "speed": 4,
        "tempo": 140
    }"#;

    #[test]
    fn parses_and_validates() {
        let module = parse_module_json(SONG, Format::It).unwrap();
        assert_eq!(module.name, "json song");
        assert_eq!(module.order, vec![0, 0]);
        assert_eq!(module.patterns[0].rows[0][0].key, Some(Key::Pitch(48)));
        assert_eq!(module.patterns[0].rows[1][0].key, Some(Key::Off));
        assert_eq!(module.samples[0].frames(), 4);
        assert_eq!(module.tempo, 140);
    }

    #[test]
    fn validation_errors_surface() {
        // Volume byte 8 sets volume in IT; XM volume commands start at 0x10.
        let err = parse_module_json(SONG, Format::Xm).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Validation(ValidationError::InvalidVolume { row: 1, channel: 1, .. })
        ));
    }

    #[test]
    fn syntax_errors_surface() {
        let err = parse_module_json("{\"name\": ", Format::Xm).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
