use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Lines kept from the Overview section
const MAX_OVERVIEW_LINES: usize = 10;
/// Bullets kept from the User Stories section
const MAX_STORY_BULLETS: usize = 20;

/// Find the feature's documentation folder.
/// Feature folders may carry a `-` suffix (`docs/features/012-export`);
/// without a match the bare ID is assumed.
pub fn feature_folder(repo_root: &Path, docs_dir: &str, feature_id: &str) -> PathBuf {
    let base = repo_root.join(docs_dir);
    let pattern = format!(
        "{}/{}*",
        Pattern::escape(&base.to_string_lossy()),
        Pattern::escape(feature_id)
    );

    let mut matches: Vec<PathBuf> = match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|p| p.is_dir() && names_feature(p, feature_id))
            .collect(),
        Err(e) => {
            tracing::warn!("bad feature folder pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    matches.sort();

    match matches.into_iter().next() {
        Some(folder) => folder,
        None => base.join(feature_id),
    }
}

/// `1` names `1` and `1-search`, never `10-search`
fn names_feature(folder: &Path, feature_id: &str) -> bool {
    let Some(name) = folder.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == feature_id || name.starts_with(&format!("{}-", feature_id))
}

/// Contents of the user stories file, if there is one
pub fn read_user_stories(folder: &Path, file_name: &str) -> Option<String> {
    let path = folder.join(file_name);
    match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::info!("no user stories at {}: {}", path.display(), e);
            None
        }
    }
}

/// Lines of the section under `## <title>`, up to the next heading of the
/// same or higher level
fn section<'a>(markdown: &'a str, title: &str) -> impl Iterator<Item = &'a str> + 'a {
    let heading = format!("## {}", title);
    markdown
        .lines()
        .skip_while(move |line| !line.trim().eq_ignore_ascii_case(&heading))
        .skip(1)
        .take_while(|line| {
            let line = line.trim_start();
            !(line.starts_with("# ") || line.starts_with("## "))
        })
}

/// First non-blank lines of the Overview section
pub fn overview(markdown: &str) -> Vec<String> {
    section(markdown, "Overview")
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_OVERVIEW_LINES)
        .map(String::from)
        .collect()
}

/// First bullet lines of the User Stories section, normalised to `- `
pub fn story_bullets(markdown: &str) -> Vec<String> {
    section(markdown, "User Stories")
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| line.strip_prefix("+ "))
        })
        .map(|item| format!("- {}", item.trim()))
        .take(MAX_STORY_BULLETS)
        .collect()
}

pub fn compose_title(feature_id: &str, feature_title: &str) -> String {
    format!("Feature {}: {}", feature_id, feature_title)
}

/// Markdown body for the feature PR. `docs_ref` is the documentation folder
/// relative to the repository root.
pub fn compose_body(
    feature_id: &str,
    feature_title: &str,
    docs_ref: &str,
    user_stories: Option<&str>,
) -> String {
    let mut body = format!(
        "## Summary\n\nImplements **{}**.\n",
        compose_title(feature_id, feature_title)
    );

    match user_stories {
        Some(markdown) => {
            let overview = overview(markdown);
            if !overview.is_empty() {
                body.push_str(&format!("\n## Overview\n\n{}\n", overview.join("\n")));
            }

            let bullets = story_bullets(markdown);
            body.push_str("\n## User Stories\n\n");
            if bullets.is_empty() {
                body.push_str("_No user stories listed._\n");
            } else {
                body.push_str(&format!("{}\n", bullets.join("\n")));
            }

            body.push_str(&format!(
                "\n## Documentation\n\nSee `{}/` for the full feature documentation.\n",
                docs_ref
            ));
        }
        None => {
            body.push_str(&format!(
                "\n## Documentation\n\nSee `{}/` for the feature documentation.\n",
                docs_ref
            ));
        }
    }

    body.push_str("\n---\nOpened automatically by the post-feature stop hook.\n");
    body
}
