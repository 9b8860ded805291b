use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownTool,
    ExecutionError,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::ExecutionError => "execution_error",
        }
    }
}

/// Normalized result of one tool execution.
///
/// Every tool, registered or not, reports through this shape so the
/// orchestrator can fold it into an interaction record without knowing which
/// tool ran.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Found { payload: Value },
    NotFound { message: String },
    Failed { kind: FailureKind, error: String },
}

impl ToolOutcome {
    pub fn found(payload: Value) -> Self {
        Self::Found { payload }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::Failed { kind: FailureKind::UnknownTool, error: format!("Unknown tool: {name}") }
    }

    pub fn execution_error(error: impl Into<String>) -> Self {
        Self::Failed { kind: FailureKind::ExecutionError, error: error.into() }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message explaining why the exchange did not fully succeed, if it didn't.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Found { .. } => None,
            Self::NotFound { message } => Some(message),
            Self::Failed { error, .. } => Some(error),
        }
    }
}
