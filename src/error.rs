use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage at which a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Locate,
    Extract,
    Validate,
    Prerequisites,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Locate => "locate",
            Stage::Extract => "extract",
            Stage::Validate => "validate",
            Stage::Prerequisites => "prerequisites",
            Stage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// A single external-tool step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CheckDirty,
    Stage,
    Commit,
    VerifyRemoteBranch,
    VerifyIssue,
    CloseIssue,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CheckDirty => "git status",
            Step::Stage => "git add",
            Step::Commit => "git commit",
            Step::VerifyRemoteBranch => "remote branch check",
            Step::VerifyIssue => "issue lookup",
            Step::CloseIssue => "issue close",
        };
        f.write_str(name)
    }
}

/// Everything that aborts a hook run
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("pattern found but payload is unusable: {0:?}")]
    MalformedPayload(String),

    #[error("required payload field '{0}' is missing or null")]
    MissingField(String),

    #[error("{program} is not installed or not on PATH")]
    MissingProgram { program: String, hint: String },

    #[error("{} is not inside a git working tree", .0.display())]
    NotARepository(PathBuf),

    #[error("{step} failed: {output}")]
    StepFailed { step: Step, output: String },

    #[error("push failed, not pushed: local commit {commit} exists but is not on the remote: {output}")]
    PushFailed {
        commit: String,
        remote: String,
        output: String,
    },

    #[error("branch '{branch}' does not exist on {remote}")]
    RemoteBranchMissing { branch: String, remote: String },

    #[error("pull request creation failed: {output}")]
    PullRequestFailed { output: String, manual: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    pub fn step(step: Step, output: impl Into<String>) -> Self {
        HookError::StepFailed {
            step,
            output: output.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            HookError::MalformedPayload(_) => Stage::Extract,
            HookError::MissingField(_) => Stage::Validate,
            HookError::MissingProgram { .. } | HookError::NotARepository(_) => {
                Stage::Prerequisites
            }
            HookError::StepFailed { .. }
            | HookError::PushFailed { .. }
            | HookError::RemoteBranchMissing { .. }
            | HookError::PullRequestFailed { .. }
            | HookError::Other(_) => Stage::Execute,
        }
    }

    /// What the user can do about it, when there is something concrete
    pub fn remediation(&self) -> Option<String> {
        match self {
            HookError::MissingProgram { hint, .. } => Some(hint.clone()),
            HookError::NotARepository(_) => {
                Some("run the hook from inside the project's git checkout".to_string())
            }
            HookError::PushFailed { remote, .. } => Some(format!("git push {} HEAD", remote)),
            HookError::RemoteBranchMissing { branch, remote } => {
                Some(format!("git push -u {} {}", remote, branch))
            }
            HookError::PullRequestFailed { manual, .. } => Some(manual.clone()),
            _ => None,
        }
    }
}
