//! Static payload corpora used across harnesses.
//!
//! Each corpus is a `&'static [&'static str]` of payloads as the device (or a
//! misbehaving publisher) actually sends them on `@msg/stm32`.

/// Status lines in the `STATUS;K=V;...` format.
pub const CORPUS_STATUS_LINES: &[&str] = &[
    "STATUS;LIGHT=1;LDR=512;DIST=23.4;NOISE=41",
    "STATUS;LIGHT=0;LDR=87;DIST=120.0;NOISE=quiet",
    "STATUS;TEMP=23.5;MODE=AUTO",
    "STATUS;INTR=1",
    "STATUS;LIGHT=ON;LDR=;MODE=MANUAL",
];

/// JSON object payloads, as published by the ESP32 bridge firmware.
pub const CORPUS_JSON_OBJECTS: &[&str] = &[
    r#"{"LIGHT":1,"NOISE":"quiet"}"#,
    r#"{"LIGHT":0,"LDR":640,"DIST":15.2,"NOISE":38}"#,
    r#"{"LIGHT":"ON","meta":{"fw":"1.4.2","uptime":3600}}"#,
];

/// JSON strings, some wrapping status lines.
pub const CORPUS_JSON_STRINGS: &[&str] = &[
    r#""STATUS;INTR=1""#,
    r#""STATUS;LIGHT=1;LDR=300""#,
    r#""device booted""#,
];

/// Payloads that must never produce a record.
pub const CORPUS_UNPARSEABLE: &[&str] = &[
    "",
    "not json and not STATUS",
    "status;LIGHT=1",
    "[1,2,3]",
    "42",
    "true",
    "null",
    r#"{"LIGHT":1"#,
];

/// Every accepted payload across the three encodings.
pub fn corpus_accepted() -> Vec<&'static str> {
    CORPUS_STATUS_LINES
        .iter()
        .chain(CORPUS_JSON_OBJECTS)
        .chain(CORPUS_JSON_STRINGS)
        .copied()
        .collect()
}

/// `n` numbered status lines, for throughput and ordering tests.
pub fn corpus_sequence(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("STATUS;SEQ={i};LIGHT={};LDR={}", i % 2, 100 + i % 900))
        .collect()
}
