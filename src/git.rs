use crate::error::{HookError, Step};
use crate::lock::RepoLock;
use crate::runner::{CommandOutput, CommandRunner};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// What the git workflow did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOutcome {
    /// Working tree and index were clean
    NoChanges,
    /// Changes were committed and pushed
    Pushed { commit: String, files: usize },
}

fn git(runner: &dyn CommandRunner, cwd: &Path, args: &[&str]) -> Result<CommandOutput, HookError> {
    runner
        .run("git", args, cwd)
        .with_context(|| format!("Failed to run git {}", args.join(" ")))
        .map_err(HookError::from)
}

/// Files changed in the working tree or the index, including untracked files
pub fn changed_files(runner: &dyn CommandRunner, cwd: &Path) -> Result<Vec<String>, HookError> {
    let output = git(runner, cwd, &["status", "--porcelain", "-uall"])?;
    if !output.success {
        return Err(HookError::step(Step::CheckDirty, output.combined()));
    }

    // Porcelain format: "XY filename" where XY is 2-char status, then space, then filename
    Ok(output
        .stdout
        .lines()
        .filter_map(|line| line.get(3..))
        .map(String::from)
        .collect())
}

pub fn stage_all(runner: &dyn CommandRunner, cwd: &Path) -> Result<(), HookError> {
    let output = git(runner, cwd, &["add", "-A"])?;
    if !output.success {
        return Err(HookError::step(Step::Stage, output.combined()));
    }
    Ok(())
}

/// Commit the index and return the short hash of the new commit
pub fn commit(runner: &dyn CommandRunner, cwd: &Path, message: &str) -> Result<String, HookError> {
    let output = git(runner, cwd, &["commit", "-m", message])?;
    if !output.success {
        return Err(HookError::step(Step::Commit, output.combined()));
    }

    let head = git(runner, cwd, &["rev-parse", "--short", "HEAD"])?;
    let hash = head.stdout.trim();
    Ok(if head.success && !hash.is_empty() {
        hash.to_string()
    } else {
        "HEAD".to_string()
    })
}

pub fn push(
    runner: &dyn CommandRunner,
    cwd: &Path,
    remote: &str,
    commit: &str,
) -> Result<(), HookError> {
    let output = git(runner, cwd, &["push", remote, "HEAD"])?;
    if !output.success {
        return Err(HookError::PushFailed {
            commit: commit.to_string(),
            remote: remote.to_string(),
            output: output.combined(),
        });
    }
    Ok(())
}

pub fn current_branch(runner: &dyn CommandRunner, cwd: &Path) -> Option<String> {
    let output = git(runner, cwd, &["rev-parse", "--abbrev-ref", "HEAD"]).ok()?;
    let branch = output.stdout.trim();
    (output.success && !branch.is_empty()).then(|| branch.to_string())
}

/// `git ls-remote --exit-code` fails silently when the ref is absent and
/// prints to stderr when the remote itself is unreachable.
pub fn remote_branch_exists(
    runner: &dyn CommandRunner,
    cwd: &Path,
    remote: &str,
    branch: &str,
) -> Result<bool, HookError> {
    let output = git(runner, cwd, &["ls-remote", "--exit-code", "--heads", remote, branch])?;
    if output.success {
        return Ok(true);
    }
    if output.stderr.trim().is_empty() {
        return Ok(false);
    }
    Err(HookError::step(Step::VerifyRemoteBranch, output.combined()))
}

pub fn is_inside_work_tree(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    git(runner, cwd, &["rev-parse", "--is-inside-work-tree"]).is_ok_and(|o| o.success)
}

/// Get the git repository root directory, falling back to cwd.
pub fn repo_root(runner: &dyn CommandRunner, cwd: &Path) -> PathBuf {
    match git(runner, cwd, &["rev-parse", "--show-toplevel"]) {
        Ok(output) if output.success && !output.stdout.trim().is_empty() => {
            PathBuf::from(output.stdout.trim())
        }
        _ => cwd.to_path_buf(),
    }
}

/// CheckDirty -> Stage -> Commit -> Push, stopping at the first failure.
/// Nothing is rolled back: a failed push leaves the local commit in place.
pub fn run_git_workflow(
    runner: &dyn CommandRunner,
    cwd: &Path,
    lock_dir: &Path,
    remote: &str,
    message: &str,
) -> Result<GitOutcome, HookError> {
    let root = repo_root(runner, cwd);
    let _lock = match RepoLock::acquire(lock_dir, &root) {
        Ok(lock) => {
            tracing::debug!("holding repository lock {}", lock.path().display());
            Some(lock)
        }
        Err(e) => {
            tracing::warn!("could not lock {}: {}; continuing unlocked", root.display(), e);
            None
        }
    };

    let files = changed_files(runner, cwd)?;
    if files.is_empty() {
        tracing::info!("no uncommitted changes; nothing to commit or push");
        return Ok(GitOutcome::NoChanges);
    }
    tracing::info!("{} changed files", files.len());

    stage_all(runner, cwd)?;
    tracing::info!("staged all changes");

    let commit = commit(runner, cwd, message)?;
    tracing::info!("committed {}: {}", commit, message);

    if let Err(e) = push(runner, cwd, remote, &commit) {
        tracing::warn!("push failed, not pushed: commit {} exists only locally", commit);
        return Err(e);
    }
    tracing::info!("pushed {} to {}", commit, remote);

    Ok(GitOutcome::Pushed {
        commit,
        files: files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;
    use tempfile::TempDir;

    fn dirty(runner: &FakeRunner) {
        runner.on(&["git", "status"], CommandOutput::ok(" M src/app.rs\nA  src/new.rs\n"));
    }

    #[test]
    fn test_changed_files_parses_porcelain() {
        let runner = FakeRunner::new();
        runner.on(
            &["git", "status"],
            CommandOutput::ok(" M src/app.rs\nM  staged.rs\n?? notes.md\n"),
        );
        let files = changed_files(&runner, Path::new("/repo")).unwrap();
        assert_eq!(files, vec!["src/app.rs", "staged.rs", "notes.md"]);
    }

    #[test]
    fn test_clean_tree_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();

        let outcome =
            run_git_workflow(&runner, temp.path(), temp.path(), "origin", "Fix issue #1").unwrap();
        assert_eq!(outcome, GitOutcome::NoChanges);
        assert!(!runner.called("git add"));
        assert!(!runner.called("git commit"));
        assert!(!runner.called("git push"));
    }

    #[test]
    fn test_full_sequence() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        dirty(&runner);
        runner.on(&["git", "rev-parse", "--short"], CommandOutput::ok("abc1234\n"));

        let outcome =
            run_git_workflow(&runner, temp.path(), temp.path(), "origin", "Fix issue #42").unwrap();
        assert_eq!(
            outcome,
            GitOutcome::Pushed {
                commit: "abc1234".to_string(),
                files: 2
            }
        );

        let calls = runner.calls();
        let pos = |prefix: &str| calls.iter().position(|c| c.starts_with(prefix)).unwrap();
        assert!(pos("git status") < pos("git add -A"));
        assert!(pos("git add -A") < pos("git commit -m Fix issue #42"));
        assert!(pos("git commit") < pos("git push origin HEAD"));
    }

    #[test]
    fn test_commit_failure_stops_before_push() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        dirty(&runner);
        runner.on(&["git", "commit"], CommandOutput::failed("hook rejected commit"));

        let err = run_git_workflow(&runner, temp.path(), temp.path(), "origin", "msg").unwrap_err();
        assert!(matches!(err, HookError::StepFailed { step: Step::Commit, .. }));
        assert!(!runner.called("git push"));
    }

    #[test]
    fn test_stage_failure_stops_before_commit() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        dirty(&runner);
        runner.on(&["git", "add"], CommandOutput::failed("index.lock exists"));

        let err = run_git_workflow(&runner, temp.path(), temp.path(), "origin", "msg").unwrap_err();
        assert!(matches!(err, HookError::StepFailed { step: Step::Stage, .. }));
        assert!(!runner.called("git commit"));
    }

    #[test]
    fn test_push_failure_keeps_commit_and_reports_it() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        dirty(&runner);
        runner.on(&["git", "rev-parse", "--short"], CommandOutput::ok("abc1234\n"));
        runner.on(&["git", "push"], CommandOutput::failed("rejected: non-fast-forward"));

        let err = run_git_workflow(&runner, temp.path(), temp.path(), "upstream", "msg").unwrap_err();
        match &err {
            HookError::PushFailed { commit, remote, output } => {
                assert_eq!(commit, "abc1234");
                assert_eq!(remote, "upstream");
                assert!(output.contains("non-fast-forward"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!runner.called("git reset"));
    }

    #[test]
    fn test_second_run_without_changes_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new();
        runner.on_seq(
            &["git", "status"],
            vec![CommandOutput::ok(" M src/app.rs\n"), CommandOutput::ok("")],
        );

        let first = run_git_workflow(&runner, temp.path(), temp.path(), "origin", "msg").unwrap();
        let second = run_git_workflow(&runner, temp.path(), temp.path(), "origin", "msg").unwrap();
        assert!(matches!(first, GitOutcome::Pushed { .. }));
        assert_eq!(second, GitOutcome::NoChanges);
        assert_eq!(runner.count("git commit"), 1);
        assert_eq!(runner.count("git push"), 1);
    }

    #[test]
    fn test_remote_branch_exists() {
        let cwd = Path::new("/repo");
        let runner = FakeRunner::new();
        assert!(remote_branch_exists(&runner, cwd, "origin", "feature/x").unwrap());

        let runner = FakeRunner::new();
        runner.on(&["git", "ls-remote"], CommandOutput::failed(""));
        assert!(!remote_branch_exists(&runner, cwd, "origin", "feature/x").unwrap());

        let runner = FakeRunner::new();
        runner.on(&["git", "ls-remote"], CommandOutput::failed("fatal: could not read from remote"));
        assert!(remote_branch_exists(&runner, cwd, "origin", "feature/x").is_err());
    }

    #[test]
    fn test_repo_root_falls_back_to_cwd() {
        let runner = FakeRunner::new();
        assert_eq!(repo_root(&runner, Path::new("/work")), PathBuf::from("/work"));

        runner.on(&["git", "rev-parse", "--show-toplevel"], CommandOutput::ok("/repo\n"));
        assert_eq!(repo_root(&runner, Path::new("/repo/sub")), PathBuf::from("/repo"));
    }
}
