use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod error;
mod feature_docs;
mod git;
mod github;
mod input;
mod lock;
mod logging;
mod outcome;
mod pattern;
mod payload;
mod pipeline;
mod prereq;
mod runner;
mod safe_exit;
mod transcript;
mod workflows;

use runner::SystemRunner;
use workflows::Hook;

/// Claude Code stop hook that finishes the task the assistant signalled:
/// commits, pushes, opens pull requests and closes issues.
#[derive(Debug, Parser)]
#[command(name = "finisher", version)]
struct Cli {
    /// Directory for debug logs, outcome records and repository locks
    #[arg(long, global = true, env = "FINISHER_LOG_DIR", default_value = "/tmp")]
    log_dir: PathBuf,

    #[command(subcommand)]
    hook: Hook,
}

/// Always exits 0: a failing stop hook must never block the host.
fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Also covers --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    logging::init(&cli.hook.log_path(&cli.log_dir));
    tracing::info!("{} hook started", cli.hook.slug());

    let outcome = safe_exit::guard(|| {
        let input = input::read_input(io::stdin().lock());
        let home = home::home_dir();
        pipeline::run(
            cli.hook,
            &input,
            home.as_deref(),
            &cli.log_dir,
            &SystemRunner,
        )
    });

    safe_exit::finish(cli.hook, &outcome, &cli.log_dir);
    ExitCode::SUCCESS
}
