use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Env var holding an EnvFilter directive, e.g. `FINISHER_LOG=debug`
const LOG_FILTER_ENV: &str = "FINISHER_LOG";

/// Send tracing output to the hook's append-only debug log.
/// Never fails: if the file cannot be opened, events are discarded.
pub fn init(log_path: &Path) {
    if let Some(dir) = log_path.parent() {
        let _ = fs::create_dir_all(dir);
    }

    let writer = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(io::sink),
    };

    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init in the same process keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
