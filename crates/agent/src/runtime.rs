use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use portside_core::domain::interaction::{InteractionDraft, InteractionRecord, RETRIEVAL_TOOL};
use portside_core::errors::ApplicationError;
use portside_core::observability::{InteractionObserver, LogError};

use crate::llm::{
    DecisionRequest, InvocationResult, LanguageModelClient, ModelDecision, ModelError,
    SynthesisRequest,
};
use crate::prompts::{SELECTION_POLICY, SYNTHESIS_INSTRUCTION};
use crate::tools::ToolRegistry;

/// Stage of a single exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeState {
    AwaitingToolDecision,
    ExecutingTools { index: usize, total: usize },
    AwaitingSynthesis,
    Done,
}

impl ExchangeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingToolDecision => "awaiting_tool_decision",
            Self::ExecutingTools { .. } => "executing_tools",
            Self::AwaitingSynthesis => "awaiting_synthesis",
            Self::Done => "done",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeReply {
    pub answer: String,
    pub record: InteractionRecord,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Log(#[from] LogError),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::Model(error @ ModelError::Configuration(_)) => {
                Self::Configuration(error.to_string())
            }
            AgentError::Model(error) => Self::Integration(error.to_string()),
            AgentError::Log(error) => error.into(),
        }
    }
}

/// Runs the decide, execute, synthesize protocol and records each exchange.
pub struct SupportAgent {
    model: Arc<dyn LanguageModelClient>,
    tools: Arc<ToolRegistry>,
    observer: Arc<InteractionObserver>,
}

impl SupportAgent {
    pub fn new(
        model: Arc<dyn LanguageModelClient>,
        tools: Arc<ToolRegistry>,
        observer: Arc<InteractionObserver>,
    ) -> Self {
        Self { model, tools, observer }
    }

    pub fn observer(&self) -> &Arc<InteractionObserver> {
        &self.observer
    }

    /// Handles one question end to end.
    ///
    /// Tool failures and not-found lookups are folded into the reply and the
    /// record. A failed model call returns an error and records nothing.
    pub async fn handle_question(
        &self,
        question: &str,
        expected_tool: Option<&str>,
    ) -> Result<ExchangeReply, AgentError> {
        let started = Instant::now();
        let mut draft = InteractionDraft {
            user_question: question.to_string(),
            expected_tool: expected_tool.map(str::to_string),
            success: true,
            ..InteractionDraft::default()
        };

        self.enter(ExchangeState::AwaitingToolDecision);
        let decision = self
            .model
            .decide(&DecisionRequest {
                question: question.to_string(),
                catalog: self.tools.catalog(),
                policy: SELECTION_POLICY.to_string(),
            })
            .await
            .map_err(|error| self.model_failed("decide", error))?;

        let answer = match decision {
            ModelDecision::Answer(text) => {
                draft.tool_selected = Some(RETRIEVAL_TOOL.to_string());
                text
            }
            // no invocation requests means retrieval answered, and there is nothing to synthesize
            ModelDecision::Invoke(invocations) if invocations.is_empty() => {
                draft.tool_selected = Some(RETRIEVAL_TOOL.to_string());
                String::new()
            }
            ModelDecision::Invoke(invocations) => {
                let total = invocations.len();
                let mut results = Vec::with_capacity(total);

                for (index, invocation) in invocations.into_iter().enumerate() {
                    self.enter(ExchangeState::ExecutingTools { index: index + 1, total });
                    let outcome =
                        self.tools.dispatch(&invocation.name, &invocation.arguments).await;

                    if index == 0 {
                        draft.tool_selected = Some(invocation.name.clone());
                        draft.tool_args = Some(invocation.arguments.clone());
                        draft.tool_result = Some(outcome.clone());
                    }
                    if let Some(message) = outcome.failure_message() {
                        draft.success = false;
                        if draft.error.is_none() {
                            draft.error = Some(if message.trim().is_empty() {
                                format!("{} did not return a result", invocation.name)
                            } else {
                                message.to_string()
                            });
                        }
                    }

                    results.push(InvocationResult { invocation, outcome });
                }

                self.enter(ExchangeState::AwaitingSynthesis);
                self.model
                    .synthesize(&SynthesisRequest {
                        question: question.to_string(),
                        results,
                        instruction: SYNTHESIS_INSTRUCTION.to_string(),
                    })
                    .await
                    .map_err(|error| self.model_failed("synthesize", error))?
            }
        };

        draft.elapsed = started.elapsed();
        draft.response_text = answer.clone();
        let record = self.observer.record(draft)?;
        self.enter(ExchangeState::Done);

        tracing::info!(
            event_name = "agent.exchange.completed",
            session_id = %record.session_id,
            tool = record.actual_tool(),
            success = record.success,
            response_time_seconds = record.response_time_seconds,
            "exchange completed"
        );
        Ok(ExchangeReply { answer, record })
    }

    fn enter(&self, state: ExchangeState) {
        match state {
            ExchangeState::ExecutingTools { index, total } => tracing::debug!(
                event_name = "agent.exchange.state",
                state = state.as_str(),
                index,
                total,
                "exchange state changed"
            ),
            _ => tracing::debug!(
                event_name = "agent.exchange.state",
                state = state.as_str(),
                "exchange state changed"
            ),
        }
    }

    fn model_failed(&self, call: &'static str, error: ModelError) -> ModelError {
        tracing::error!(
            event_name = "agent.exchange.model_failed",
            session_id = %self.observer.session_id(),
            call,
            error = %error,
            "model call failed, exchange not recorded"
        );
        error
    }
}
