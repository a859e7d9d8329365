//! Component lifecycle value types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to each component deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(Uuid);

impl DeploymentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Explicit completion signal returned by a component's start procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    StartFailed(String),
}

impl StartOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::StartFailed(reason.into())
    }
}

/// Lifecycle state of a deployed component.
///
/// `Pending -> Starting -> {Started, StartFailed}`; `Started -> Stopped` on undeploy.
/// `StartFailed` and `Stopped` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ComponentState {
    Pending,
    Starting,
    Started,
    StartFailed(String),
    Stopped,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Starting => write!(f, "starting"),
            Self::Started => write!(f, "started"),
            Self::StartFailed(reason) => write!(f, "start failed: {reason}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serde_shape() {
        let json = serde_json::to_string(&ComponentState::StartFailed("boom".into())).unwrap();
        assert_eq!(json, r#"{"state":"start_failed","reason":"boom"}"#);
        let json = serde_json::to_string(&ComponentState::Started).unwrap();
        assert_eq!(json, r#"{"state":"started"}"#);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(
            ComponentState::StartFailed("boom".into()).to_string(),
            "start failed: boom"
        );
    }
}
