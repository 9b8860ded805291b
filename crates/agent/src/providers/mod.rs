pub mod offline;
pub mod openai;

use std::sync::Arc;

use portside_core::config::{LlmConfig, LlmProvider};

use crate::llm::{LanguageModelClient, ModelError};

pub use offline::PolicyRoutingModel;
pub use openai::OpenAiResponsesClient;

/// Builds the model client named by the configuration.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LanguageModelClient>, ModelError> {
    match config.provider {
        LlmProvider::OpenAi => Ok(Arc::new(OpenAiResponsesClient::from_config(config)?)),
        LlmProvider::Offline => Ok(Arc::new(PolicyRoutingModel::default())),
    }
}
