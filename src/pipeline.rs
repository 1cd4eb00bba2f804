use crate::config;
use crate::error::{HookError, Stage};
use crate::input::{self, HookInput};
use crate::outcome::Outcome;
use crate::pattern::{self, Detection};
use crate::payload::Payload;
use crate::runner::CommandRunner;
use crate::transcript;
use crate::workflows::{Context, Hook};
use std::path::{Path, PathBuf};

/// Working directory for the workflows: the hook's `cwd` if given,
/// otherwise the process's own.
fn working_dir(input: &HookInput) -> PathBuf {
    match input.cwd.as_deref().map(str::trim) {
        Some(cwd) if !cwd.is_empty() => PathBuf::from(cwd),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Locate -> Detect/Extract -> Validate -> Prerequisites -> Execute.
/// Each stage either feeds the next or ends the run with an outcome.
pub fn run(
    hook: Hook,
    input: &HookInput,
    home: Option<&Path>,
    lock_dir: &Path,
    runner: &dyn CommandRunner,
) -> Outcome {
    tracing::info!(
        "event {} session {}",
        input.hook_event_name.as_deref().unwrap_or("unknown"),
        input.session_id.as_deref().unwrap_or("unknown")
    );

    let Some(transcript_path) = input::locate_transcript(input, home) else {
        return Outcome::skipped("no readable transcript");
    };
    tracing::info!("transcript {}", transcript_path.display());

    let text = match transcript::last_assistant_text(&transcript_path) {
        Ok(Some(text)) => text,
        Ok(None) => return Outcome::skipped("transcript has no assistant text"),
        Err(e) => {
            return Outcome::Failed {
                stage: Stage::Locate,
                error: format!("{:#}", e),
                remediation: None,
            }
        }
    };

    let raw = match pattern::scan(&text, hook.pattern_name()) {
        Detection::NotFound => {
            tracing::info!("pattern '{}' not in last assistant message", hook.pattern_name());
            return Outcome::skipped(format!("pattern '{}' not found", hook.pattern_name()));
        }
        Detection::FoundButUnparseable(raw) => {
            tracing::warn!(
                "pattern '{}' found but the payload is unusable: {}",
                hook.pattern_name(),
                raw
            );
            return HookError::MalformedPayload(raw).into();
        }
        Detection::Found(raw) => raw,
    };
    tracing::info!("payload: {}", raw);

    let payload = match Payload::parse(&raw) {
        Ok(payload) => payload,
        Err(e) => return e.into(),
    };

    let cwd = working_dir(input);
    let config = config::resolve(&cwd);
    let ctx = Context {
        cwd,
        lock_dir: lock_dir.to_path_buf(),
        config,
        runner,
    };

    match hook.run(&ctx, &payload) {
        Ok(outcome) => outcome,
        Err(e) => e.into(),
    }
}
