use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::outcome::ToolOutcome;
use crate::domain::session::SessionId;
use crate::errors::DomainError;

/// Name under which the built-in knowledge-base search is tracked.
pub const RETRIEVAL_TOOL: &str = "file_search";

/// Placeholder on the "actual" axis when no tool was selected.
pub const NO_TOOL: &str = "none";

/// Fields the orchestrator collects during one exchange.
#[derive(Clone, Debug, Default)]
pub struct InteractionDraft {
    pub user_question: String,
    pub tool_selected: Option<String>,
    pub expected_tool: Option<String>,
    pub tool_args: Option<Value>,
    pub tool_result: Option<ToolOutcome>,
    pub elapsed: Duration,
    pub success: bool,
    pub response_text: String,
    pub error: Option<String>,
}

/// One completed exchange, immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub user_question: String,
    pub tool_selected: Option<String>,
    pub expected_tool: Option<String>,
    pub tool_match: Option<bool>,
    pub tool_args: Option<Value>,
    pub tool_result: Option<ToolOutcome>,
    pub response_time_seconds: f64,
    pub success: bool,
    pub response_length: usize,
    pub error: Option<String>,
}

impl InteractionRecord {
    pub fn from_draft(
        draft: InteractionDraft,
        session_id: SessionId,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let tool_selected = non_empty(draft.tool_selected);
        let expected_tool = non_empty(draft.expected_tool);
        let error = non_empty(draft.error);

        let not_found = draft.tool_result.as_ref().is_some_and(ToolOutcome::is_not_found);
        if !draft.success && error.is_none() && !not_found {
            return Err(DomainError::InvariantViolation(
                "failed interaction requires an error message or a not-found tool outcome"
                    .to_string(),
            ));
        }

        Ok(Self {
            timestamp,
            session_id,
            tool_match: tool_match(tool_selected.as_deref(), expected_tool.as_deref()),
            user_question: draft.user_question,
            tool_selected,
            expected_tool,
            tool_args: draft.tool_args,
            tool_result: draft.tool_result,
            response_time_seconds: round_millis(draft.elapsed),
            success: draft.success,
            response_length: draft.response_text.chars().count(),
            error,
        })
    }

    /// Tool name for the "actual" axis of accuracy reports.
    pub fn actual_tool(&self) -> &str {
        self.tool_selected.as_deref().unwrap_or(NO_TOOL)
    }
}

/// `None` without an expectation, otherwise whether the selection matched it.
pub fn tool_match(selected: Option<&str>, expected: Option<&str>) -> Option<bool> {
    expected.map(|expected| selected == Some(expected))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn round_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}
