use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "finisher.yaml";

/// Per-repository settings for the workflows
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinisherConfig {
    /// Remote that commits and feature branches are pushed to
    pub remote: String,
    /// Target branch for feature pull requests
    pub base_branch: String,
    /// Commit message for the fix workflow; `{issue}` is replaced
    pub fix_commit_message: String,
    /// Commit message for the version workflow; `{version}` is replaced
    pub version_commit_message: String,
    /// Comment left on an issue when it is closed
    pub close_comment: String,
    /// Directory holding one folder per feature (relative to repo root)
    pub feature_docs_dir: String,
    /// File inside a feature folder listing its user stories
    pub user_stories_file: String,
}

impl Default for FinisherConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            base_branch: "main".to_string(),
            fix_commit_message: "Fix issue #{issue}".to_string(),
            version_commit_message: "chore: bump version to {version}".to_string(),
            close_comment: "Fixed and pushed automatically by the post-fix stop hook."
                .to_string(),
            feature_docs_dir: "docs/features".to_string(),
            user_stories_file: "user-stories.md".to_string(),
        }
    }
}

impl FinisherConfig {
    pub fn fix_commit_message(&self, issue: &str) -> String {
        self.fix_commit_message.replace("{issue}", issue)
    }

    pub fn version_commit_message(&self, version: &str) -> String {
        self.version_commit_message.replace("{version}", version)
    }
}

/// Validates a parsed config
fn validate(config: &FinisherConfig, config_path: &Path) -> Result<()> {
    if !config.fix_commit_message.contains("{issue}") {
        bail!(
            "Invalid config at {}: 'fix_commit_message' must contain {{issue}}",
            config_path.display()
        );
    }
    if !config.version_commit_message.contains("{version}") {
        bail!(
            "Invalid config at {}: 'version_commit_message' must contain {{version}}",
            config_path.display()
        );
    }
    for (key, value) in [
        ("remote", &config.remote),
        ("base_branch", &config.base_branch),
        ("feature_docs_dir", &config.feature_docs_dir),
        ("user_stories_file", &config.user_stories_file),
    ] {
        if value.trim().is_empty() {
            bail!(
                "Invalid config at {}: '{}' must not be empty",
                config_path.display(),
                key
            );
        }
    }
    Ok(())
}

/// Loads and parses a finisher.yaml config file.
pub fn load_config(config_path: &Path) -> Result<FinisherConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    // An empty file means "all defaults"
    if content.trim().is_empty() {
        return Ok(FinisherConfig::default());
    }

    let config: FinisherConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    validate(&config, config_path)?;
    Ok(config)
}

/// Finds the nearest finisher.yaml by walking up from a directory.
/// Stops at the first directory containing `.git` (does not leave the repo).
pub fn find_config_path(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.is_file() {
            return Some(config_path);
        }

        // Stop if we've reached repo root
        if current.join(".git").exists() {
            return None;
        }

        // Move up
        if !current.pop() {
            return None;
        }
    }
}

/// Load the nearest config, or defaults. Invalid configs are logged and
/// ignored.
pub fn resolve(start_dir: &Path) -> FinisherConfig {
    let Some(path) = find_config_path(start_dir) else {
        tracing::debug!("no {} found, using defaults", CONFIG_FILENAME);
        return FinisherConfig::default();
    };

    match load_config(&path) {
        Ok(config) => {
            tracing::info!("loaded config {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("{:#}; using defaults", e);
            FinisherConfig::default()
        }
    }
}
