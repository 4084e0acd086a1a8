//! Normalizer: turns a raw device payload into a [`CanonicalRecord`].
//!
//! The device publishes one of three encodings on the same topic:
//!
//! | Payload | Result |
//! |---------|--------|
//! | `STATUS;TEMP=23.5;MODE=AUTO` | status line, values coerced to numbers where numeric |
//! | `{"LIGHT":1,"NOISE":"quiet"}` | JSON object, values passed through unchanged |
//! | `"STATUS;INTR=1"` | JSON string wrapping a status line, parsed as a status line |
//! | `"hello"` | JSON string, becomes `{ "message": "hello" }` |
//!
//! Anything else (empty input, malformed JSON, JSON arrays, numbers, booleans,
//! `null`) is rejected. [`classify`] reports which branch was taken;
//! [`normalize`] collapses that to `Option<CanonicalRecord>`.
//!
//! # Status-line rules
//!
//! - segments are separated by `;`, each split on the **first** `=` only, so
//!   `KEY=A=B` yields the value `"A=B"`;
//! - segments with an empty key or no `=` are skipped;
//! - duplicate keys: the last one wins;
//! - a value is numeric under a loose, JavaScript-like rule: surrounding
//!   whitespace is ignored and an empty value counts as `0`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::types::CanonicalRecord;

/// Literal prefix that marks a status line.
pub const STATUS_PREFIX: &str = "STATUS;";

/// Largest integer an IEEE-754 double represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("decimal literal pattern")
});

static RADIX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0(?:[xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)$").expect("radix literal pattern")
});

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a payload could not be normalised.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("empty payload")]
    Empty,
    #[error("payload is neither a status line nor valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported JSON payload shape: {0}")]
    UnsupportedShape(&'static str),
}

/// Contents of a payload that decoded to a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonStringPayload {
    /// The string was itself a status line.
    StatusLine(CanonicalRecord),
    /// Any other string; becomes `{ "message": ... }`.
    Message(String),
}

/// Which normalisation branch a payload took.
#[derive(Debug)]
pub enum Normalized {
    Empty,
    InvalidInput(NormalizeError),
    StatusLine(CanonicalRecord),
    JsonObject(CanonicalRecord),
    JsonString(JsonStringPayload),
}

impl Normalized {
    /// Short, stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Normalized::Empty => "empty",
            Normalized::InvalidInput(_) => "invalid",
            Normalized::StatusLine(_) => "status_line",
            Normalized::JsonObject(_) => "json_object",
            Normalized::JsonString(JsonStringPayload::StatusLine(_)) => "json_string_status_line",
            Normalized::JsonString(JsonStringPayload::Message(_)) => "json_string_message",
        }
    }

    pub fn is_record(&self) -> bool {
        !matches!(self, Normalized::Empty | Normalized::InvalidInput(_))
    }

    pub fn into_result(self) -> Result<CanonicalRecord, NormalizeError> {
        match self {
            Normalized::Empty => Err(NormalizeError::Empty),
            Normalized::InvalidInput(err) => Err(err),
            Normalized::StatusLine(record)
            | Normalized::JsonObject(record)
            | Normalized::JsonString(JsonStringPayload::StatusLine(record)) => Ok(record),
            Normalized::JsonString(JsonStringPayload::Message(text)) => {
                Ok(CanonicalRecord::message(text))
            }
        }
    }

    pub fn into_record(self) -> Option<CanonicalRecord> {
        self.into_result().ok()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Normalise `raw`, or `None` if it is not a recognised payload.
pub fn normalize(raw: &str) -> Option<CanonicalRecord> {
    classify(raw).into_record()
}

/// Run the full decision procedure and report the branch taken.
pub fn classify(raw: &str) -> Normalized {
    if raw.is_empty() {
        return Normalized::Empty;
    }
    if raw.starts_with(STATUS_PREFIX) {
        return Normalized::StatusLine(parse_status_line(raw));
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => return Normalized::InvalidInput(err.into()),
    };

    match value {
        Value::String(text) if text.starts_with(STATUS_PREFIX) => {
            Normalized::JsonString(JsonStringPayload::StatusLine(parse_status_line(&text)))
        }
        Value::String(text) => Normalized::JsonString(JsonStringPayload::Message(text)),
        Value::Object(object) => Normalized::JsonObject(CanonicalRecord::from_object(object)),
        Value::Array(_) => Normalized::InvalidInput(NormalizeError::UnsupportedShape("array")),
        Value::Number(_) => Normalized::InvalidInput(NormalizeError::UnsupportedShape("number")),
        Value::Bool(_) => Normalized::InvalidInput(NormalizeError::UnsupportedShape("boolean")),
        Value::Null => Normalized::InvalidInput(NormalizeError::UnsupportedShape("null")),
    }
}

/// Parse `STATUS;K=V;K=V` into a record. The `STATUS;` prefix is optional.
pub fn parse_status_line(line: &str) -> CanonicalRecord {
    let body = line.strip_prefix(STATUS_PREFIX).unwrap_or(line);
    let mut record = CanonicalRecord::new();

    for segment in body.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        record.insert(key, coerce_value(value));
    }

    record
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

/// Numeric-looking values become JSON numbers, everything else stays a string.
pub fn coerce_value(raw: &str) -> Value {
    match parse_numeric(raw) {
        Some(n) => number_value(n),
        None => Value::String(raw.to_string()),
    }
}

/// Loose numeric test: trims whitespace, treats empty as `0`, accepts decimal
/// literals (`5`, `-2.5`, `.5`, `5.`, `1e3`) and unsigned `0x`/`0o`/`0b`
/// literals. Non-finite results are not numeric.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    if DECIMAL_LITERAL.is_match(text) {
        return text.parse::<f64>().ok().filter(|n| n.is_finite());
    }

    if RADIX_LITERAL.is_match(text) {
        let radix = match text.as_bytes()[1] {
            b'x' | b'X' => 16,
            b'o' | b'O' => 8,
            _ => 2,
        };
        return u128::from_str_radix(&text[2..], radix)
            .ok()
            .map(|n| n as f64)
            .filter(|n| n.is_finite());
    }

    None
}

/// Integral values in the exact range are emitted as JSON integers so that
/// `INTR=1` serialises as `1`, not `1.0`.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn as_json(record: &CanonicalRecord) -> Value {
        serde_json::to_value(record).unwrap()
    }

    #[test]
    fn status_line_coerces_numbers() {
        let record = normalize("STATUS;TEMP=23.5;MODE=AUTO").unwrap();
        assert_eq!(as_json(&record), json!({ "TEMP": 23.5, "MODE": "AUTO" }));
    }

    #[test]
    fn json_object_passes_through() {
        let record = normalize(r#"{"LIGHT":1,"NOISE":"quiet"}"#).unwrap();
        assert_eq!(as_json(&record), json!({ "LIGHT": 1, "NOISE": "quiet" }));
    }

    #[test]
    fn json_object_values_are_not_coerced() {
        let record = normalize(r#"{"LDR":"512","ON":true}"#).unwrap();
        assert_eq!(record.get("LDR"), Some(&json!("512")));
        assert_eq!(record.get("ON"), Some(&json!(true)));
    }

    #[test]
    fn json_string_wrapping_status_line() {
        let outcome = classify(r#""STATUS;INTR=1""#);
        assert_eq!(outcome.kind(), "json_string_status_line");
        assert_eq!(as_json(&outcome.into_record().unwrap()), json!({ "INTR": 1 }));
    }

    #[test]
    fn json_string_becomes_message() {
        let record = normalize(r#""hello device""#).unwrap();
        assert_eq!(as_json(&record), json!({ "message": "hello device" }));
    }

    #[rstest]
    #[case::empty("")]
    #[case::plain_text("not json and not STATUS")]
    #[case::array("[1,2]")]
    #[case::number("42")]
    #[case::boolean("true")]
    #[case::null("null")]
    #[case::lowercase_prefix("status;A=1")]
    #[case::truncated_json(r#"{"LIGHT":1"#)]
    fn unparseable_payloads_yield_none(#[case] raw: &str) {
        assert!(normalize(raw).is_none(), "expected None for {raw:?}");
    }

    #[test]
    fn classify_reports_shape_of_rejected_json() {
        match classify("[1]") {
            Normalized::InvalidInput(NormalizeError::UnsupportedShape(shape)) => {
                assert_eq!(shape, "array")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(classify(""), Normalized::Empty));
        assert!(matches!(
            classify("nope"),
            Normalized::InvalidInput(NormalizeError::Json(_))
        ));
    }

    #[test]
    fn json_number_out_of_f64_range_rejects_payload() {
        let outcome = classify(r#"{"LIGHT":1,"BIG":1e400}"#);
        assert_eq!(outcome.kind(), "invalid");
        assert!(matches!(outcome, Normalized::InvalidInput(NormalizeError::Json(_))));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let record = parse_status_line("STATUS;A=1;B=x;A=2");
        assert_eq!(as_json(&record), json!({ "A": 2, "B": "x" }));
    }

    #[test]
    fn value_split_on_first_equals_only() {
        let record = parse_status_line("STATUS;KEY=A=B");
        assert_eq!(record.get("KEY"), Some(&json!("A=B")));
    }

    #[test]
    fn segments_without_key_are_skipped() {
        let record = parse_status_line("STATUS;=1;NOEQUALS;;X=2");
        assert_eq!(as_json(&record), json!({ "X": 2 }));
    }

    #[test]
    fn empty_value_coerces_to_zero() {
        let record = parse_status_line("STATUS;A=;B=   ");
        assert_eq!(as_json(&record), json!({ "A": 0, "B": 0 }));
    }

    #[test]
    fn bare_prefix_is_an_empty_record() {
        let record = normalize("STATUS;").unwrap();
        assert!(record.is_empty());
    }

    #[rstest]
    #[case("1", json!(1))]
    #[case("-7", json!(-7))]
    #[case("+3", json!(3))]
    #[case("23.5", json!(23.5))]
    #[case(".5", json!(0.5))]
    #[case("5.", json!(5))]
    #[case("1e3", json!(1000))]
    #[case(" 42 ", json!(42))]
    #[case("0x1F", json!(31))]
    #[case("0b101", json!(5))]
    #[case("0o17", json!(15))]
    #[case("-0", json!(0))]
    fn numeric_values(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(coerce_value(raw), expected);
    }

    #[rstest]
    #[case("AUTO")]
    #[case("NaN")]
    #[case("Infinity")]
    #[case("inf")]
    #[case("12abc")]
    #[case("1_000")]
    #[case(".")]
    #[case("-0x10")]
    #[case("1e400")]
    fn non_numeric_values_stay_strings(#[case] raw: &str) {
        assert_eq!(coerce_value(raw), Value::String(raw.to_string()));
    }

    #[test]
    fn large_integers_stay_floats() {
        assert_eq!(coerce_value("1e20"), json!(1e20));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn well_formed_lines_keep_exactly_their_keys(
                pairs in proptest::collection::vec(("[A-Z]{1,6}", "[a-z0-9.]{0,6}"), 0..12)
            ) {
                let segments: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
                let line = format!("{STATUS_PREFIX}{}", segments.join(";"));
                let record = normalize(&line).unwrap();

                let mut expected = std::collections::BTreeMap::new();
                for (k, v) in &pairs {
                    expected.insert(k.clone(), coerce_value(v));
                }
                prop_assert_eq!(record.len(), expected.len());
                for (k, v) in &expected {
                    prop_assert_eq!(record.get(k), Some(v));
                }
            }

            #[test]
            fn never_panics_on_arbitrary_input(raw in ".*") {
                let _ = classify(&raw);
            }
        }
    }
}
