//! On-disk document layout.
//!
//! The legacy layout is the bare history object. The envelope layout wraps the
//! same object as `{"schema_version": 1, "history": {...}}`. Dates can never be
//! named `schema_version`, so the two are told apart by that key alone.

use crate::record::History;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: u32 = 1;

const VERSION_KEY: &str = "schema_version";

/// Which layout a store reads from and writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Legacy,
    Envelope,
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    schema_version: u32,
    history: &'a History,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvelopeIn {
    schema_version: u32,
    history: History,
}

/// Parses a document, returning the history and the layout it was stored in.
///
/// The error string describes why the text is not a valid store.
pub(crate) fn decode(text: &str) -> Result<(History, DocumentFormat), String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

    let object = match &value {
        Value::Object(object) => object,
        other => {
            return Err(format!(
                "expected a top-level JSON object, found {}",
                kind_of(other)
            ))
        }
    };

    if object.contains_key(VERSION_KEY) {
        // Re-parse from text: `Value` does not keep key order.
        let envelope: EnvelopeIn =
            serde_json::from_str(text).map_err(|e| format!("invalid envelope: {e}"))?;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(format!(
                "unsupported schema version {} (expected {SCHEMA_VERSION})",
                envelope.schema_version
            ));
        }
        return Ok((envelope.history, DocumentFormat::Envelope));
    }

    let history: History = serde_json::from_str(text).map_err(|e| e.to_string())?;
    Ok((history, DocumentFormat::Legacy))
}

pub(crate) fn encode(history: &History, format: DocumentFormat) -> serde_json::Result<String> {
    let mut text = match format {
        DocumentFormat::Legacy => serde_json::to_string_pretty(history)?,
        DocumentFormat::Envelope => serde_json::to_string_pretty(&EnvelopeOut {
            schema_version: SCHEMA_VERSION,
            history,
        })?,
    };
    text.push('\n');
    Ok(text)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::record::Record;

    fn sample() -> History {
        [(
            DateKey::from_ymd(2024, 3, 15).unwrap(),
            Record::from([("headline", "Penn wins")]),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_decode_legacy() {
        let (history, format) = decode(r#"{"2024-03-15": {"headline": "Penn wins"}}"#).unwrap();
        assert_eq!(format, DocumentFormat::Legacy);
        assert_eq!(history, sample());
    }

    #[test]
    fn test_decode_empty_object() {
        let (history, format) = decode("{}").unwrap();
        assert!(history.is_empty());
        assert_eq!(format, DocumentFormat::Legacy);
    }

    #[test]
    fn test_decode_envelope() {
        let text = r#"{"schema_version": 1, "history": {"2024-03-15": {"headline": "Penn wins"}}}"#;
        let (history, format) = decode(text).unwrap();
        assert_eq!(format, DocumentFormat::Envelope);
        assert_eq!(history, sample());
    }

    #[test]
    fn test_decode_rejects_future_envelope() {
        let err = decode(r#"{"schema_version": 2, "history": {}}"#).unwrap_err();
        assert!(err.contains("unsupported schema version 2"));
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        assert!(decode("not json").unwrap_err().contains("invalid JSON"));
        assert!(decode("[1,2,3]").unwrap_err().contains("an array"));
        assert!(decode(r#""headline""#).unwrap_err().contains("a string"));
        assert!(decode(r#"{"2024-03-15": "bare headline"}"#).is_err());
        assert!(decode(r#"{"2024-03-15": {"n": 1}}"#).is_err());
        assert!(decode(r#"{"schema_version": 1, "history": {}, "extra": 0}"#).is_err());
    }

    #[test]
    fn test_encode_layouts() {
        let legacy = encode(&sample(), DocumentFormat::Legacy).unwrap();
        assert!(legacy.starts_with("{\n  \"2024-03-15\""));
        assert!(legacy.ends_with("}\n"));

        let envelope = encode(&sample(), DocumentFormat::Envelope).unwrap();
        let (history, format) = decode(&envelope).unwrap();
        assert_eq!(format, DocumentFormat::Envelope);
        assert_eq!(history, sample());
    }
}
