use super::Context;
use crate::error::HookError;
use crate::feature_docs;
use crate::git;
use crate::github::{self, PullRequest};
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::prereq;
use std::path::Path;

pub const PATTERN: &str = "Post Feature Push and PR";

const PROGRAMS: &[&str] = &["git", "gh"];

struct FeatureRequest {
    id: String,
    title: String,
    branch: String,
}

impl FeatureRequest {
    fn from_payload(payload: &Payload) -> Result<Self, HookError> {
        Ok(Self {
            id: payload.require("featureID")?,
            title: payload.require("featureTitle")?,
            branch: payload.require("featureBranch")?,
        })
    }
}

/// Documentation folder as shown in the PR body
fn docs_ref(repo_root: &Path, folder: &Path) -> String {
    folder
        .strip_prefix(repo_root)
        .unwrap_or(folder)
        .to_string_lossy()
        .to_string()
}

/// VerifyBranch -> VerifyRemoteBranchExists -> ReadUserStoriesFile ->
/// ComposeTitleAndBody -> CreatePullRequest
pub fn run(ctx: &Context, payload: &Payload) -> Result<Outcome, HookError> {
    let request = FeatureRequest::from_payload(payload)?;
    tracing::info!(
        "feature {} '{}' on branch {}",
        request.id,
        request.title,
        request.branch
    );

    prereq::check(ctx.runner, &ctx.cwd, PROGRAMS)?;

    match git::current_branch(ctx.runner, &ctx.cwd) {
        Some(branch) if branch == request.branch => {}
        Some(branch) => tracing::warn!(
            "current branch '{}' is not the feature branch '{}'; continuing",
            branch,
            request.branch
        ),
        None => tracing::warn!("could not determine the current branch; continuing"),
    }

    let remote = &ctx.config.remote;
    if !git::remote_branch_exists(ctx.runner, &ctx.cwd, remote, &request.branch)? {
        tracing::error!("branch {} has not been pushed to {}", request.branch, remote);
        return Err(HookError::RemoteBranchMissing {
            branch: request.branch,
            remote: remote.clone(),
        });
    }

    if let Some(url) = github::existing_pull_request(ctx.runner, &ctx.cwd, &request.branch) {
        tracing::info!("pull request already open for {}: {}", request.branch, url);
        return Ok(Outcome::succeeded_with_url("pull request already open", url));
    }

    let repo_root = git::repo_root(ctx.runner, &ctx.cwd);
    let folder = feature_docs::feature_folder(&repo_root, &ctx.config.feature_docs_dir, &request.id);
    let stories = feature_docs::read_user_stories(&folder, &ctx.config.user_stories_file);
    if stories.is_none() {
        tracing::warn!("user stories not found; using the minimal PR description");
    }

    let title = feature_docs::compose_title(&request.id, &request.title);
    let body = feature_docs::compose_body(
        &request.id,
        &request.title,
        &docs_ref(&repo_root, &folder),
        stories.as_deref(),
    );
    let pr = PullRequest {
        title: &title,
        body: &body,
        head: &request.branch,
        base: &ctx.config.base_branch,
    };

    match github::create_pull_request(ctx.runner, &ctx.cwd, &pr)? {
        Some(url) => {
            tracing::info!("created pull request {}", url);
            Ok(Outcome::succeeded_with_url(format!("created pull request '{}'", title), url))
        }
        None => {
            tracing::warn!("gh reported success but printed no pull request URL");
            Ok(Outcome::succeeded(format!("created pull request '{}'", title)))
        }
    }
}
