use crate::error::HookError;
use crate::git;
use crate::runner::CommandRunner;
use std::path::Path;

fn install_hint(program: &str) -> String {
    match program {
        "gh" => "install the GitHub CLI (https://cli.github.com) and run `gh auth login`".to_string(),
        "git" => "install git and make sure it is on PATH".to_string(),
        other => format!("install {} and make sure it is on PATH", other),
    }
}

/// Every program must resolve on PATH and cwd must be inside a git working tree
pub fn check(runner: &dyn CommandRunner, cwd: &Path, programs: &[&str]) -> Result<(), HookError> {
    for program in programs {
        if !runner.has_program(program) {
            tracing::error!("prerequisite missing: {}", program);
            return Err(HookError::MissingProgram {
                program: program.to_string(),
                hint: install_hint(program),
            });
        }
    }

    if !git::is_inside_work_tree(runner, cwd) {
        tracing::error!("{} is not inside a git working tree", cwd.display());
        return Err(HookError::NotARepository(cwd.to_path_buf()));
    }

    tracing::debug!("prerequisites ok: {}", programs.join(", "));
    Ok(())
}
