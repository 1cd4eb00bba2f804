use crate::config::FinisherConfig;
use crate::error::HookError;
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::runner::CommandRunner;
use clap::Subcommand;
use std::path::{Path, PathBuf};

pub mod feature_pr;
pub mod fix_and_close;
pub mod version_bump;

/// Hook variants, one per completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Hook {
    /// Commit and push a fix, then close its issue
    FixAndClose,
    /// Open a pull request for a pushed feature branch
    FeaturePr,
    /// Commit and push a version bump
    VersionBump,
}

impl Hook {
    /// Heading the assistant must emit to trigger this hook
    pub fn pattern_name(self) -> &'static str {
        match self {
            Hook::FixAndClose => fix_and_close::PATTERN,
            Hook::FeaturePr => feature_pr::PATTERN,
            Hook::VersionBump => version_bump::PATTERN,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Hook::FixAndClose => "post-fix-push-and-close",
            Hook::FeaturePr => "post-feature-push-pr",
            Hook::VersionBump => "post-version-bump",
        }
    }

    pub fn log_path(self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("{}-debug.log", self.slug()))
    }

    pub fn outcome_path(self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("{}-outcomes.jsonl", self.slug()))
    }

    pub fn run(self, ctx: &Context, payload: &Payload) -> Result<Outcome, HookError> {
        match self {
            Hook::FixAndClose => fix_and_close::run(ctx, payload),
            Hook::FeaturePr => feature_pr::run(ctx, payload),
            Hook::VersionBump => version_bump::run(ctx, payload),
        }
    }
}

/// Everything a workflow needs besides its payload
pub struct Context<'a> {
    pub cwd: PathBuf,
    /// Where repository lock files live
    pub lock_dir: PathBuf,
    pub config: FinisherConfig,
    pub runner: &'a dyn CommandRunner,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    pub fn context<'a>(temp: &TempDir, runner: &'a dyn CommandRunner) -> Context<'a> {
        Context {
            cwd: temp.path().to_path_buf(),
            lock_dir: temp.path().to_path_buf(),
            config: FinisherConfig::default(),
            runner,
        }
    }

    pub fn payload(json: &str) -> Payload {
        Payload::parse(json).unwrap()
    }
}
