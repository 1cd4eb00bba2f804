use crate::error::{HookError, Stage};
use serde::Serialize;

/// Typed result of one hook run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The hook did not apply; nothing was touched
    Skipped { reason: String },
    Succeeded {
        summary: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Failed {
        stage: Stage,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        remediation: Option<String>,
    },
}

impl Outcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Outcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn succeeded(summary: impl Into<String>) -> Self {
        Outcome::Succeeded {
            summary: summary.into(),
            url: None,
        }
    }

    pub fn succeeded_with_url(summary: impl Into<String>, url: impl Into<String>) -> Self {
        Outcome::Succeeded {
            summary: summary.into(),
            url: Some(url.into()),
        }
    }
}

impl From<HookError> for Outcome {
    fn from(err: HookError) -> Self {
        Outcome::Failed {
            stage: err.stage(),
            error: format!("{:#}", err),
            remediation: err.remediation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Step;

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Outcome::succeeded_with_url(
            "created pull request",
            "https://github.com/acme/app/pull/1",
        ))
        .unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["url"], "https://github.com/acme/app/pull/1");

        let json = serde_json::to_value(Outcome::skipped("pattern not found")).unwrap();
        assert_eq!(json["status"], "skipped");
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_from_error() {
        let outcome: Outcome = HookError::step(Step::CloseIssue, "HTTP 403").into();
        match &outcome {
            Outcome::Failed {
                stage,
                error,
                remediation,
            } => {
                assert_eq!(*stage, Stage::Execute);
                assert_eq!(error, "issue close failed: HTTP 403");
                assert!(remediation.is_none());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["stage"], "execute");
    }
}
