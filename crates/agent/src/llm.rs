use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use portside_core::domain::outcome::ToolOutcome;

use crate::tools::CatalogEntry;

/// A tool call requested by the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
}

/// What the model chose to do with a question.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelDecision {
    /// Answered directly, which implies the retrieval capability was used.
    Answer(String),
    Invoke(Vec<ToolInvocation>),
}

#[derive(Clone, Debug)]
pub struct DecisionRequest {
    pub question: String,
    pub catalog: Vec<CatalogEntry>,
    pub policy: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvocationResult {
    pub invocation: ToolInvocation,
    pub outcome: ToolOutcome,
}

#[derive(Clone, Debug)]
pub struct SynthesisRequest {
    pub question: String,
    pub results: Vec<InvocationResult>,
    pub instruction: String,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model transport failure: {0}")]
    Transport(String),
    #[error("model api returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not decode model response: {0}")]
    Decode(String),
    #[error("model client is misconfigured: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> Result<ModelDecision, ModelError>;

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, ModelError>;
}

/// Tool outcome in the flat shape handed back to the model.
pub fn outcome_for_model(outcome: &ToolOutcome) -> Value {
    match outcome {
        ToolOutcome::Found { payload } => {
            let mut output = serde_json::Map::new();
            output.insert("found".to_string(), Value::Bool(true));
            match payload {
                Value::Object(fields) => output.extend(fields.clone()),
                other => {
                    output.insert("result".to_string(), other.clone());
                }
            }
            Value::Object(output)
        }
        ToolOutcome::NotFound { message } => {
            serde_json::json!({"found": false, "message": message})
        }
        ToolOutcome::Failed { kind, error } => {
            serde_json::json!({"error": error, "kind": kind.as_str()})
        }
    }
}
