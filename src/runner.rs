use std::io;
use std::path::Path;
use std::process::Command;

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[cfg(test)]
    pub fn ok(stdout: &str) -> Self {
        Self {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[cfg(test)]
    pub fn failed(stderr: &str) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// stderr and stdout together, for log lines and error messages
    pub fn combined(&self) -> String {
        let parts: Vec<&str> = [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        parts.join("\n")
    }
}

/// Seam between the workflows and the external tools they drive
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput>;

    /// Whether the program resolves on PATH
    fn has_program(&self, program: &str) -> bool;
}

/// Runs real processes. Blocks until each one exits.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> io::Result<CommandOutput> {
        tracing::debug!("running {} {}", program, args.join(" "));
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeRunner;
    use super::*;

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            success: false,
            stdout: "partial\n".into(),
            stderr: "error: boom\n".into(),
        };
        assert_eq!(out.combined(), "error: boom\npartial");
        assert_eq!(CommandOutput::ok("").combined(), "");
    }

    #[test]
    fn test_system_runner_reports_exit_status() {
        let runner = SystemRunner;
        let cwd = std::env::temp_dir();
        if runner.has_program("sh") {
            let ok = runner.run("sh", &["-c", "echo hi"], &cwd).unwrap();
            assert!(ok.success);
            assert_eq!(ok.stdout.trim(), "hi");

            let failed = runner.run("sh", &["-c", "echo nope >&2; exit 3"], &cwd).unwrap();
            assert!(!failed.success);
            assert_eq!(failed.stderr.trim(), "nope");
        }
        assert!(!runner.has_program("definitely-not-a-real-program-xyz"));
    }

    #[test]
    fn test_fake_runner_sequences_and_records() {
        let runner = FakeRunner::new();
        runner.on_seq(
            &["git", "status"],
            vec![CommandOutput::ok(" M a.rs\n"), CommandOutput::ok("")],
        );
        let cwd = Path::new("/");

        let first = runner.run("git", &["status", "--porcelain"], cwd).unwrap();
        let second = runner.run("git", &["status", "--porcelain"], cwd).unwrap();
        let third = runner.run("git", &["status", "--porcelain"], cwd).unwrap();
        assert_eq!(first.stdout, " M a.rs\n");
        assert_eq!(second.stdout, "");
        assert_eq!(third.stdout, "");
        assert_eq!(runner.count("git status"), 3);
        assert!(!runner.called("gh"));
    }
}
