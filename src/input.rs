use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Input JSON from Claude Code hook system
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    /// Missing or empty means there is nothing for the hook to do
    #[serde(default)]
    pub transcript_path: String,
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub hook_event_name: Option<String>,
}

/// Read the hook input from stdin (or any reader).
/// Malformed input is treated like an empty object.
pub fn read_input(mut reader: impl Read) -> HookInput {
    let mut buffer = String::new();
    if let Err(e) = reader.read_to_string(&mut buffer) {
        tracing::warn!("could not read hook input: {}", e);
        return HookInput::default();
    }

    match serde_json::from_str(buffer.trim()) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!("hook input is not valid JSON: {}", e);
            HookInput::default()
        }
    }
}

/// Expand a leading `~` to the home directory.
/// Only `~` and `~/...` are expanded; `~user` forms are left alone.
pub fn expand_tilde(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    }
}

/// Resolve the transcript path from the hook input.
/// Returns None when the hook does not apply to this run: empty path,
/// missing file, unreadable file, or empty file.
pub fn locate_transcript(input: &HookInput, home: Option<&Path>) -> Option<PathBuf> {
    let raw = input.transcript_path.trim();
    if raw.is_empty() {
        tracing::info!("no transcript_path in hook input");
        return None;
    }

    let path = expand_tilde(raw, home);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            tracing::info!("transcript {} not readable: {}", path.display(), e);
            return None;
        }
    };

    match file.metadata() {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
        Ok(_) => {
            tracing::info!("transcript {} is empty or not a file", path.display());
            None
        }
        Err(e) => {
            tracing::info!("transcript {} has no metadata: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_input_full() {
        let json = r#"{"hook_event_name":"Stop","cwd":"/tmp","session_id":"abc","transcript_path":"/tmp/t.jsonl"}"#;
        let input = read_input(json.as_bytes());
        assert_eq!(input.transcript_path, "/tmp/t.jsonl");
        assert_eq!(input.session_id.as_deref(), Some("abc"));
        assert_eq!(input.cwd.as_deref(), Some("/tmp"));
    }

    #[test]
    fn test_read_input_missing_path_defaults_empty() {
        let input = read_input(r#"{"session_id":"abc"}"#.as_bytes());
        assert!(input.transcript_path.is_empty());
    }

    #[test]
    fn test_read_input_garbage_is_empty() {
        let input = read_input("not json".as_bytes());
        assert!(input.transcript_path.is_empty());
        assert!(input.session_id.is_none());
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_tilde("~/.claude/t.jsonl", Some(home)),
            PathBuf::from("/home/dev/.claude/t.jsonl")
        );
        assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/dev"));
        assert_eq!(expand_tilde("~other/x", Some(home)), PathBuf::from("~other/x"));
        assert_eq!(expand_tilde("/abs/t.jsonl", Some(home)), PathBuf::from("/abs/t.jsonl"));
        assert_eq!(expand_tilde("~/t.jsonl", None), PathBuf::from("~/t.jsonl"));
    }

    #[test]
    fn test_locate_transcript_under_home() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".claude")).unwrap();
        fs::write(temp.path().join(".claude/t.jsonl"), "{}\n").unwrap();

        let input = HookInput {
            transcript_path: "~/.claude/t.jsonl".to_string(),
            ..Default::default()
        };
        let located = locate_transcript(&input, Some(temp.path()));
        assert_eq!(located, Some(temp.path().join(".claude/t.jsonl")));
    }

    #[test]
    fn test_locate_transcript_noop_cases() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty.jsonl");
        fs::write(&empty, "").unwrap();

        for raw in [
            String::new(),
            "   ".to_string(),
            temp.path().join("missing.jsonl").display().to_string(),
            empty.display().to_string(),
            temp.path().display().to_string(),
        ] {
            let input = HookInput {
                transcript_path: raw.clone(),
                ..Default::default()
            };
            assert!(locate_transcript(&input, None).is_none(), "{raw:?}");
        }
    }
}
