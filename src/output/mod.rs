use serde_json::{json, Map, Value};
use std::io::{self, Write};

use crate::TranscriptorError;

/// JSON layout of the emitted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Indented, used for transcripts
    Pretty,
    /// Single line
    Compact,
}

/// Success envelope: `"success": true` followed by the given fields in order
pub fn success_document(fields: Map<String, Value>, layout: Layout) -> String {
    let mut envelope = Map::new();
    envelope.insert("success".to_string(), Value::Bool(true));
    envelope.extend(fields.into_iter().filter(|(key, _)| key != "success"));

    render(&Value::Object(envelope), layout)
}

/// Failure envelope with the error message and its category tag
pub fn failure_document(err: &TranscriptorError) -> String {
    let envelope = json!({
        "success": false,
        "error": err.to_string(),
        "error_type": err.error_type(),
    });

    render(&envelope, Layout::Compact)
}

fn render(value: &Value, layout: Layout) -> String {
    match layout {
        Layout::Pretty => format!("{:#}", value),
        Layout::Compact => value.to_string(),
    }
}

/// Write the one document of this run and flush
pub fn emit<W: Write>(out: &mut W, document: &str) -> io::Result<()> {
    writeln!(out, "{}", document)?;
    out.flush()
}
