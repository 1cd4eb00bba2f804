use super::Context;
use crate::error::HookError;
use crate::git::{self, GitOutcome};
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::prereq;

pub const PATTERN: &str = "Post Version Bump";

const PROGRAMS: &[&str] = &["git"];

/// Pick the version to commit. The frontend version is authoritative; a
/// different backend version is only worth a warning.
fn resolve_version(frontend: &str, backend: &str) -> String {
    if frontend != backend {
        tracing::warn!(
            "frontend version {} and backend version {} differ; using {}",
            frontend,
            backend,
            frontend
        );
    }
    frontend.to_string()
}

pub fn run(ctx: &Context, payload: &Payload) -> Result<Outcome, HookError> {
    let frontend = payload.require("frontendVersion")?;
    let backend = payload.require("backendVersion")?;
    let version = resolve_version(&frontend, &backend);
    tracing::info!("version bump to {}", version);

    prereq::check(ctx.runner, &ctx.cwd, PROGRAMS)?;

    let message = ctx.config.version_commit_message(&version);
    match git::run_git_workflow(
        ctx.runner,
        &ctx.cwd,
        &ctx.lock_dir,
        &ctx.config.remote,
        &message,
    )? {
        GitOutcome::NoChanges => Ok(Outcome::skipped(format!(
            "no uncommitted changes for version {}",
            version
        ))),
        GitOutcome::Pushed { commit, files } => Ok(Outcome::succeeded(format!(
            "pushed version {} ({}, {} files)",
            version, commit, files
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::runner::fake::FakeRunner;
    use crate::runner::CommandOutput;
    use crate::workflows::testing::{context, payload};
    use tempfile::TempDir;

    fn scripted() -> FakeRunner {
        let runner = FakeRunner::new().without_program("gh");
        runner.on(
            &["git", "status"],
            CommandOutput::ok(" M frontend/package.json\n M backend/pyproject.toml\n"),
        );
        runner.on(&["git", "rev-parse", "--short"], CommandOutput::ok("f00d123\n"));
        runner
    }

    #[test]
    fn test_resolve_version() {
        assert_eq!(resolve_version("1.2.0", "1.2.0"), "1.2.0");
        assert_eq!(resolve_version("1.2.0", "1.1.9"), "1.2.0");
    }

    #[test]
    fn test_matching_versions() {
        let temp = TempDir::new().unwrap();
        let runner = scripted();
        let ctx = context(&temp, &runner);

        let outcome = run(
            &ctx,
            &payload(r#"{"frontendVersion": "1.2.0", "backendVersion": "1.2.0"}"#),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::succeeded("pushed version 1.2.0 (f00d123, 2 files)"));
        assert!(runner.called("git commit -m chore: bump version to 1.2.0"));
        assert!(runner.called("git push origin HEAD"));
    }

    #[test]
    fn test_mismatch_uses_frontend_version() {
        let temp = TempDir::new().unwrap();
        let runner = scripted();
        let ctx = context(&temp, &runner);

        let outcome = run(
            &ctx,
            &payload(r#"{"frontendVersion": "1.2.0", "backendVersion": "1.1.9"}"#),
        )
        .unwrap();
        assert!(matches!(outcome, Outcome::Succeeded { .. }));
        assert!(runner.called("git commit -m chore: bump version to 1.2.0"));
        assert!(!runner.called("git commit -m chore: bump version to 1.1.9"));
    }

    #[test]
    fn test_no_changes_is_skipped() {
        let temp = TempDir::new().unwrap();
        let runner = scripted();
        runner.on(&["git", "status"], CommandOutput::ok(""));
        let ctx = context(&temp, &runner);

        let outcome = run(
            &ctx,
            &payload(r#"{"frontendVersion": "1.2.0", "backendVersion": "1.2.0"}"#),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::skipped("no uncommitted changes for version 1.2.0"));
        assert!(!runner.called("git push"));
    }

    #[test]
    fn test_missing_backend_version() {
        let temp = TempDir::new().unwrap();
        let runner = scripted();
        let ctx = context(&temp, &runner);

        let err = run(&ctx, &payload(r#"{"frontendVersion": "1.2.0"}"#)).unwrap_err();
        assert_eq!(err.stage(), Stage::Validate);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_custom_commit_message() {
        let temp = TempDir::new().unwrap();
        let runner = scripted();
        let mut ctx = context(&temp, &runner);
        ctx.config.version_commit_message = "release: v{version}".to_string();

        run(
            &ctx,
            &payload(r#"{"frontendVersion": "2.0.0", "backendVersion": "2.0.0"}"#),
        )
        .unwrap();
        assert!(runner.called("git commit -m release: v2.0.0"));
    }
}
