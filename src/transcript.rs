use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Represents a content block in a message
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    type_: Option<String>,
    text: Option<String>,
}

/// `message.content` is either a plain string or an array of blocks
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// Represents the message
#[derive(Debug, Deserialize)]
struct Message {
    role: Option<String>,
    content: Option<Content>,
}

/// Represents a transcript line with message
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    message: Option<Message>,
}

/// Return the text of the last assistant `text` block in a JSONL transcript.
/// Lines that are not valid UTF-8 or not valid JSON are skipped.
pub fn last_assistant_text(transcript_path: &Path) -> Result<Option<String>> {
    let file = File::open(transcript_path)
        .with_context(|| format!("Failed to open transcript: {}", transcript_path.display()))?;
    let reader = BufReader::new(file);
    let mut last = None;

    for line in reader.split(b'\n') {
        let bytes = line
            .with_context(|| format!("Failed to read transcript: {}", transcript_path.display()))?;
        let Ok(line) = std::str::from_utf8(&bytes) else {
            tracing::debug!("skipping transcript line that is not UTF-8");
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        let Ok(entry) = serde_json::from_str::<TranscriptLine>(line) else {
            continue;
        };
        let Some(message) = entry.message else {
            continue;
        };
        if message.role.as_deref() != Some("assistant") {
            continue;
        }

        match message.content {
            Some(Content::Text(text)) => last = Some(text),
            Some(Content::Blocks(blocks)) => {
                if let Some(text) = blocks
                    .into_iter()
                    .rev()
                    .filter(|b| b.type_.as_deref() == Some("text"))
                    .find_map(|b| b.text)
                {
                    last = Some(text);
                }
            }
            None => {}
        }
    }

    Ok(last)
}
