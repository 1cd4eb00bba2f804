//! Detection of hook patterns in assistant text.
//!
//! A hook pattern is a markdown heading carrying the pattern name, followed
//! by the payload label and a JSON object, optionally fenced:
//!
//! ````text
//! ## Post Fix Push and Close
//! **Payload**:
//! ```json
//! {"issueID": "42"}
//! ```
//! ````
//!
//! The pattern name is compared literally, so punctuation in a name can
//! never change what is matched.

use serde_json::{Map, Value};

/// Label that must follow the heading
pub const PAYLOAD_LABEL: &str = "**Payload**:";

/// Result of scanning a block of text for a hook pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// No heading + label pair for this pattern
    NotFound,
    /// Heading, label and a JSON object span
    Found(String),
    /// Heading and label present, but no usable JSON object after them
    FoundButUnparseable(String),
}

/// Scan text for the named pattern. When the pattern occurs more than once
/// the last complete occurrence wins.
pub fn scan(text: &str, pattern_name: &str) -> Detection {
    let mut heading_ends = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if is_heading(line, pattern_name) {
            heading_ends.push(offset);
        }
    }

    for end in heading_ends.into_iter().rev() {
        if let Some(detection) = scan_after_heading(&text[end..]) {
            return detection;
        }
    }

    Detection::NotFound
}

/// `#`..`######`, whitespace, the exact name, trailing whitespace only
fn is_heading(line: &str, pattern_name: &str) -> bool {
    let line = line.trim();
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return false;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return false;
    }
    rest.trim() == pattern_name.trim()
}

/// Returns None when the label does not follow, so an earlier heading can
/// still be tried.
fn scan_after_heading(rest: &str) -> Option<Detection> {
    let mut cursor = Cursor::new(rest);
    cursor.skip_whitespace();
    if !cursor.eat(PAYLOAD_LABEL) {
        return None;
    }
    cursor.skip_whitespace();
    let fenced = cursor.eat_fence_open();
    cursor.skip_whitespace();

    let Some(span) = cursor.take_object() else {
        return Some(Detection::FoundButUnparseable(cursor.rest_of_line()));
    };

    if fenced {
        cursor.skip_whitespace();
        if !cursor.eat("```") {
            tracing::debug!("payload fence is not closed after the JSON object");
        }
    }

    match serde_json::from_str::<Map<String, Value>>(span) {
        Ok(_) => Some(Detection::Found(span.to_string())),
        Err(e) => {
            tracing::debug!("payload span is not a JSON object: {}", e);
            Some(Detection::FoundButUnparseable(span.to_string()))
        }
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// "```" plus an optional language tag such as `json`
    fn eat_fence_open(&mut self) -> bool {
        if !self.eat("```") {
            return false;
        }
        let tag_len = self
            .rest()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .count();
        self.pos += tag_len;
        true
    }

    /// Balanced `{`..`}` span, aware of JSON strings and escapes
    fn take_object(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        if !rest.starts_with('{') {
            return None;
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let span = &rest[..=i];
                        self.pos += span.len();
                        return Some(span);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn rest_of_line(&self) -> String {
        self.rest().lines().next().unwrap_or_default().to_string()
    }
}
