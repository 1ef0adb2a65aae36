//! Document header parsing.
//!
//! Documents may open with a YAML block delimited by `---` marker lines:
//!
//! ```markdown
//! ---
//! title: My Note
//! tags: [a, b]
//! ---
//!
//! # Content here
//! ```
//!
//! The block carries presentation metadata that must survive the round-trip
//! between the repository and the note server. Parsing is deliberately
//! forgiving: a missing or malformed header yields empty metadata, never an
//! error.

use std::collections::HashMap;

use serde_yaml::Value;

/// Marker line that opens and closes the header block. The match is against
/// the whole line, so `----` or an indented marker does not count.
const MARKER: &str = "---";

/// Metadata extracted from a document header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteMeta {
    /// Display title, if the header declares one.
    pub title: Option<String>,
    /// Tags in declaration order. A scalar `tags` value is a common
    /// authoring shorthand and is coerced to a one-element list.
    pub tags: Vec<String>,
}

impl NoteMeta {
    /// The title, or the empty string when the header declares none.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Extract header metadata from document content.
///
/// A header is present only when line 0 is exactly `---` and at least one
/// later line is exactly `---`.
pub fn extract(content: &str) -> NoteMeta {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.first() != Some(&MARKER) {
        return NoteMeta::default();
    }
    let Some(end) = lines.iter().skip(1).position(|line| *line == MARKER) else {
        return NoteMeta::default();
    };

    // `end` is relative to skip(1); the block sits between the two markers.
    let block = lines[1..end + 1].join("\n");
    match serde_yaml::from_str::<HashMap<String, Value>>(&block) {
        Ok(fields) => from_fields(&fields),
        Err(_) => NoteMeta::default(),
    }
}

fn from_fields(fields: &HashMap<String, Value>) -> NoteMeta {
    let title = fields.get("title").and_then(scalar_to_string);
    let tags = match fields.get("tags") {
        Some(Value::Sequence(values)) => values.iter().filter_map(scalar_to_string).collect(),
        Some(value) => scalar_to_string(value).into_iter().collect(),
        None => Vec::new(),
    };
    NoteMeta { title, tags }
}

/// Render a YAML scalar as a string. Nested structures have no string form
/// and are dropped.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
