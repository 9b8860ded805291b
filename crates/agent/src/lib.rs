//! Customer-support agent runtime.
//!
//! A [`SupportAgent`](runtime::SupportAgent) asks a [`LanguageModelClient`]
//! which tool fits a question, runs the requested tools through a
//! [`ToolRegistry`], asks the model to phrase the final answer, and records
//! the exchange with the shared
//! [`InteractionObserver`](portside_core::observability::InteractionObserver).
//!
//! Model providers live in [`providers`]: the OpenAI Responses API client and
//! an offline policy router that needs no network.

pub mod llm;
pub mod prompts;
pub mod providers;
pub mod runtime;
pub mod support_tools;
pub mod tools;

pub use llm::{
    DecisionRequest, InvocationResult, LanguageModelClient, ModelDecision, ModelError,
    SynthesisRequest, ToolInvocation,
};
pub use runtime::{AgentError, ExchangeReply, ExchangeState, SupportAgent};
pub use support_tools::{support_registry, CheckOrderStatusTool, GetTrackingInfoTool};
pub use tools::{
    CatalogEntry, ParameterKind, ParameterSpec, Tool, ToolDescriptor, ToolRegistry,
    ToolRegistryError,
};
