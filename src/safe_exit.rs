//! Every hook run ends here. Whatever happened, the host sees exit status 0;
//! failures are reported through the debug log, stderr and the outcome
//! record instead.

use crate::outcome::Outcome;
use crate::workflows::Hook;
use anyhow::{Context, Result};
use serde::Serialize;
use std::any::Any;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    timestamp: String,
    hook: &'a str,
    outcome: &'a Outcome,
}

/// Run the pipeline, turning a panic into a failed outcome
pub fn guard(pipeline: impl FnOnce() -> Outcome) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(outcome) => outcome,
        Err(payload) => Outcome::Failed {
            stage: crate::error::Stage::Execute,
            error: format!("internal error: {}", panic_message(payload.as_ref())),
            remediation: None,
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Log, echo and record the outcome
pub fn finish(hook: Hook, outcome: &Outcome, log_dir: &Path) {
    match outcome {
        Outcome::Skipped { reason } => {
            tracing::info!("nothing to do: {}", reason);
        }
        Outcome::Succeeded { summary, url } => {
            match url {
                Some(url) => tracing::info!("SUCCESS: {} ({})", summary, url),
                None => tracing::info!("SUCCESS: {}", summary),
            }
            echo(&success_text(summary, url.as_deref()));
        }
        Outcome::Failed {
            stage,
            error,
            remediation,
        } => {
            tracing::error!("FAILED at {}: {}", stage, error);
            if let Some(fix) = remediation {
                tracing::error!("manual fix: {}", fix);
            }
            echo(&failure_text(
                hook,
                &format!("{} ({})", error, stage),
                remediation.as_deref(),
                &hook.log_path(log_dir),
            ));
        }
    }

    if let Err(e) = record(hook, outcome, log_dir) {
        tracing::warn!("could not write outcome record: {:#}", e);
    }
}

fn success_text(summary: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("finisher: {}\n  {}", summary, url),
        None => format!("finisher: {}", summary),
    }
}

fn failure_text(hook: Hook, error: &str, remediation: Option<&str>, log_path: &Path) -> String {
    let mut text = format!("finisher: {} did not finish: {}", hook.slug(), error);
    if let Some(fix) = remediation {
        text.push_str(&format!("\n  To finish manually: {}", fix));
    }
    text.push_str(&format!("\n  Details: {}", log_path.display()));
    text
}

#[allow(clippy::print_stderr)]
fn echo(text: &str) {
    eprintln!("{}", text);
}

/// Append one JSON line to the hook's outcome file
fn record(hook: Hook, outcome: &Outcome, log_dir: &Path) -> Result<()> {
    let path = hook.outcome_path(log_dir);
    let line = serde_json::to_string(&OutcomeRecord {
        timestamp: chrono::Utc::now().to_rfc3339(),
        hook: hook.slug(),
        outcome,
    })?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(format!("{}\n", line).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
