use crate::error::{HookError, Step};
use crate::runner::{CommandOutput, CommandRunner};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

/// `gh pr create` prints the new PR's URL on success
static PR_URL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"https://[^\s/]+/[^\s/]+/[^\s/]+/pull/\d+"));

#[derive(Debug, Deserialize)]
struct IssueView {
    state: String,
}

#[derive(Debug, Deserialize)]
struct PrView {
    url: String,
    state: String,
}

/// Issue state as reported by the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

/// A pull request to open
#[derive(Debug, Clone)]
pub struct PullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

fn gh(runner: &dyn CommandRunner, cwd: &Path, args: &[&str]) -> Result<CommandOutput, HookError> {
    runner
        .run("gh", args, cwd)
        .with_context(|| format!("Failed to run gh {}", args.first().unwrap_or(&"")))
        .map_err(HookError::from)
}

/// Look the issue up; a failed lookup means it does not exist or is not visible
pub fn issue_state(
    runner: &dyn CommandRunner,
    cwd: &Path,
    issue: &str,
) -> Result<IssueState, HookError> {
    let output = gh(runner, cwd, &["issue", "view", issue, "--json", "state"])?;
    if !output.success {
        return Err(HookError::step(
            Step::VerifyIssue,
            format!("issue #{} not found: {}", issue, output.combined()),
        ));
    }

    let view: IssueView = serde_json::from_str(output.stdout.trim())
        .with_context(|| format!("Unexpected gh issue view output: {}", output.stdout.trim()))?;
    Ok(if view.state.eq_ignore_ascii_case("closed") {
        IssueState::Closed
    } else {
        IssueState::Open
    })
}

pub fn close_issue(
    runner: &dyn CommandRunner,
    cwd: &Path,
    issue: &str,
    comment: &str,
) -> Result<(), HookError> {
    let output = gh(runner, cwd, &["issue", "close", issue, "--comment", comment])?;
    if !output.success {
        return Err(HookError::step(Step::CloseIssue, output.combined()));
    }
    Ok(())
}

/// URL of an open PR whose head is `branch`, if any. Closed and merged
/// PRs for the same branch do not count.
pub fn existing_pull_request(
    runner: &dyn CommandRunner,
    cwd: &Path,
    branch: &str,
) -> Option<String> {
    let output = gh(runner, cwd, &["pr", "view", branch, "--json", "url,state"]).ok()?;
    if !output.success {
        return None;
    }
    let view = serde_json::from_str::<PrView>(output.stdout.trim()).ok()?;
    if !view.state.eq_ignore_ascii_case("open") {
        tracing::info!("pull request {} for {} is {}", view.url, branch, view.state);
        return None;
    }
    Some(view.url).filter(|url| !url.is_empty())
}

/// Create the PR and return its URL. Success without a recognisable URL
/// yields Ok(None).
pub fn create_pull_request(
    runner: &dyn CommandRunner,
    cwd: &Path,
    pr: &PullRequest,
) -> Result<Option<String>, HookError> {
    let output = gh(
        runner,
        cwd,
        &[
            "pr", "create", "--title", pr.title, "--body", pr.body, "--head", pr.head, "--base",
            pr.base,
        ],
    )?;
    if !output.success {
        return Err(HookError::PullRequestFailed {
            output: output.combined(),
            manual: manual_create_command(pr),
        });
    }
    Ok(parse_pr_url(&output.stdout))
}

pub fn parse_pr_url(text: &str) -> Option<String> {
    let re = PR_URL.as_ref().ok()?;
    re.find(text).map(|m| m.as_str().to_string())
}

/// The command a user can paste to open the PR by hand
pub fn manual_create_command(pr: &PullRequest) -> String {
    format!(
        "gh pr create --head {} --base {} --title {} --fill",
        shell_quote(pr.head),
        shell_quote(pr.base),
        shell_quote(pr.title)
    )
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
