//! Client for the OpenAI Responses API.
//!
//! The decision call offers the function tools plus, when vector stores are
//! configured, the hosted `file_search` tool. The synthesis call replays the
//! function calls and their outputs with `tool_choice: "none"`.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use portside_core::config::LlmConfig;

use crate::llm::{
    outcome_for_model, DecisionRequest, LanguageModelClient, ModelDecision, ModelError,
    SynthesisRequest, ToolInvocation,
};
use crate::tools::CatalogEntry;

pub struct OpenAiResponsesClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
    vector_store_ids: Vec<String>,
}

impl OpenAiResponsesClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ModelError::Configuration("llm.api_key is not configured".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ModelError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            vector_store_ids: config.vector_store_ids.clone(),
        })
    }

    async fn post(&self, body: &Value) -> Result<Value, ModelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|error| {
                tracing::error!(
                    event_name = "agent.model.transport_failed",
                    endpoint = %self.endpoint,
                    error = %error,
                    "model request failed"
                );
                ModelError::Transport(error.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                event_name = "agent.model.api_error",
                status = status.as_u16(),
                "model api rejected request"
            );
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        response.json::<Value>().await.map_err(|error| ModelError::Decode(error.to_string()))
    }
}

#[async_trait::async_trait]
impl LanguageModelClient for OpenAiResponsesClient {
    async fn decide(&self, request: &DecisionRequest) -> Result<ModelDecision, ModelError> {
        let body = decision_body(&self.model, request, &self.vector_store_ids);
        let response = self.post(&body).await?;
        parse_decision(response)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, ModelError> {
        let body = synthesis_body(&self.model, request)?;
        let response = self.post(&body).await?;
        let parsed = parse_response(response)?;
        Ok(parsed.output_text())
    }
}

fn decision_body(model: &str, request: &DecisionRequest, vector_store_ids: &[String]) -> Value {
    let tools = request
        .catalog
        .iter()
        .filter_map(|entry| match entry {
            CatalogEntry::Function(descriptor) => Some(json!({
                "type": "function",
                "name": descriptor.name,
                "description": descriptor.description,
                "parameters": descriptor.parameters_schema(),
            })),
            // without a vector store there is nothing to search
            CatalogEntry::Retrieval if vector_store_ids.is_empty() => None,
            CatalogEntry::Retrieval => Some(json!({
                "type": "file_search",
                "vector_store_ids": vector_store_ids,
            })),
        })
        .collect::<Vec<_>>();

    json!({
        "model": model,
        "instructions": request.policy,
        "input": [{"role": "user", "content": request.question}],
        "tools": tools,
    })
}

fn synthesis_body(model: &str, request: &SynthesisRequest) -> Result<Value, ModelError> {
    let mut input = vec![json!({"role": "user", "content": request.question})];
    for result in &request.results {
        let arguments = serde_json::to_string(&result.invocation.arguments)
            .map_err(|error| ModelError::Decode(error.to_string()))?;
        let output = serde_json::to_string(&outcome_for_model(&result.outcome))
            .map_err(|error| ModelError::Decode(error.to_string()))?;

        input.push(json!({
            "type": "function_call",
            "call_id": result.invocation.call_id,
            "name": result.invocation.name,
            "arguments": arguments,
        }));
        input.push(json!({
            "type": "function_call_output",
            "call_id": result.invocation.call_id,
            "output": output,
        }));
    }

    Ok(json!({
        "model": model,
        "instructions": request.instruction,
        "input": input,
        "tool_choice": "none",
    }))
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    OutputText {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ResponseBody {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                _ => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                ContentPart::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

fn parse_response(body: Value) -> Result<ResponseBody, ModelError> {
    serde_json::from_value(body).map_err(|error| ModelError::Decode(error.to_string()))
}

fn parse_decision(body: Value) -> Result<ModelDecision, ModelError> {
    let parsed = parse_response(body)?;

    let mut invocations = Vec::new();
    for item in &parsed.output {
        if let OutputItem::FunctionCall { call_id, name, arguments } = item {
            let arguments = serde_json::from_str::<Value>(arguments).map_err(|error| {
                ModelError::Decode(format!("arguments for `{name}` are not JSON: {error}"))
            })?;
            invocations.push(ToolInvocation {
                call_id: call_id.clone(),
                name: name.clone(),
                arguments,
            });
        }
    }

    if invocations.is_empty() {
        Ok(ModelDecision::Answer(parsed.output_text()))
    } else {
        Ok(ModelDecision::Invoke(invocations))
    }
}
