use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock on a repository's working tree, shared by every
/// hook run on this machine. Released when dropped.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Block until the lock for `repo_root` is held
    pub fn acquire(lock_dir: &Path, repo_root: &Path) -> io::Result<Self> {
        let path = lock_path(lock_dir, repo_root);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        tracing::debug!("released repository lock {}", self.path.display());
    }
}

/// One lock file per repository root
fn lock_path(lock_dir: &Path, repo_root: &Path) -> PathBuf {
    let key: String = repo_root
        .to_string_lossy()
        .trim_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    lock_dir.join(format!("finisher-{}.lock", key))
}
