use super::Context;
use crate::error::HookError;
use crate::git::{self, GitOutcome};
use crate::github::{self, IssueState};
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::prereq;

pub const PATTERN: &str = "Post Fix Push and Close";

const PROGRAMS: &[&str] = &["git", "gh"];

struct FixRequest {
    issue_id: String,
    run_id: String,
}

impl FixRequest {
    fn from_payload(payload: &Payload) -> Result<Self, HookError> {
        let issue_id = payload.require("issueID")?;
        let run_id = payload.field("runID");
        Ok(Self { issue_id, run_id })
    }
}

fn close_comment(base: &str, commit: Option<&str>, run_id: &str) -> String {
    let mut comment = base.to_string();
    if let Some(commit) = commit {
        comment.push_str(&format!("\n\nCommit: {}", commit));
    }
    if !run_id.is_empty() {
        comment.push_str(&format!("\nWorkflow run: {}", run_id));
    }
    comment
}

/// Git workflow, then VerifyIssueExists -> CloseIssueWithComment.
/// The issue is only touched once the git workflow succeeded or had
/// nothing to do.
pub fn run(ctx: &Context, payload: &Payload) -> Result<Outcome, HookError> {
    let request = FixRequest::from_payload(payload)?;
    if request.run_id.is_empty() {
        tracing::info!("fix for issue #{}", request.issue_id);
    } else {
        tracing::info!("fix for issue #{} (run {})", request.issue_id, request.run_id);
    }

    prereq::check(ctx.runner, &ctx.cwd, PROGRAMS)?;

    let message = ctx.config.fix_commit_message(&request.issue_id);
    let commit = match git::run_git_workflow(
        ctx.runner,
        &ctx.cwd,
        &ctx.lock_dir,
        &ctx.config.remote,
        &message,
    )? {
        GitOutcome::Pushed { commit, .. } => Some(commit),
        GitOutcome::NoChanges => {
            tracing::warn!(
                "nothing was committed; closing issue #{} on the assumption the fix is already pushed",
                request.issue_id
            );
            None
        }
    };

    if github::issue_state(ctx.runner, &ctx.cwd, &request.issue_id)? == IssueState::Closed {
        tracing::info!("issue #{} is already closed", request.issue_id);
        return Ok(Outcome::succeeded(match &commit {
            Some(commit) => format!("pushed {}; issue #{} was already closed", commit, request.issue_id),
            None => format!("issue #{} was already closed", request.issue_id),
        }));
    }

    let comment = close_comment(&ctx.config.close_comment, commit.as_deref(), &request.run_id);
    github::close_issue(ctx.runner, &ctx.cwd, &request.issue_id, &comment)?;
    tracing::info!("closed issue #{}", request.issue_id);

    Ok(Outcome::succeeded(match &commit {
        Some(commit) => format!("pushed {} and closed issue #{}", commit, request.issue_id),
        None => format!("closed issue #{} (nothing to commit)", request.issue_id),
    }))
}
