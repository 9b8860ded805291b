use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use portside_core::domain::interaction::RETRIEVAL_TOOL;
use portside_core::domain::outcome::ToolOutcome;

#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    /// Runs the tool. An `Err` is a failure of the tool itself; a missing
    /// entity is reported as [`ToolOutcome::NotFound`].
    async fn execute(&self, arguments: &Value) -> Result<ToolOutcome>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(kind: ParameterKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into(), required: true }
    }

    pub fn optional(kind: ParameterKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into(), required: false }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), parameters: BTreeMap::new() }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    /// JSON-schema object describing the parameters, as function-calling
    /// models expect it.
    pub fn parameters_schema(&self) -> Value {
        let properties = self
            .parameters
            .iter()
            .map(|(name, spec)| {
                (name.clone(), json!({"type": spec.kind.as_str(), "description": spec.description}))
            })
            .collect::<Map<_, _>>();
        let required = self
            .parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| Value::String(name.clone()))
            .collect::<Vec<_>>();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// One entry in the catalog offered to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogEntry {
    Function(ToolDescriptor),
    /// The built-in knowledge-base search; never dispatched locally.
    Retrieval,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Function(descriptor) => &descriptor.name,
            Self::Retrieval => RETRIEVAL_TOOL,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolRegistryError {
    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolRegistryError>
    where
        T: Tool + 'static,
    {
        let name = tool.descriptor().name;
        if name == RETRIEVAL_TOOL || self.tools.contains_key(&name) {
            return Err(ToolRegistryError::DuplicateTool(name));
        }

        self.tools.insert(name, Box::new(tool));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tools sorted by name, followed by the retrieval tool.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let mut descriptors = self.tools.values().map(|tool| tool.descriptor()).collect::<Vec<_>>();
        descriptors.sort_by(|left, right| left.name.cmp(&right.name));

        descriptors
            .into_iter()
            .map(CatalogEntry::Function)
            .chain(std::iter::once(CatalogEntry::Retrieval))
            .collect()
    }

    /// Runs the named tool. Never fails: unknown names and executor errors
    /// come back as [`ToolOutcome::Failed`].
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(
                event_name = "agent.tool.unknown",
                tool = name,
                "model requested a tool that is not registered"
            );
            return ToolOutcome::unknown_tool(name);
        };

        let outcome = match tool.execute(arguments).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.tool.failed",
                    tool = name,
                    error = %error,
                    "tool execution failed"
                );
                ToolOutcome::execution_error(format!("{error:#}"))
            }
        };

        tracing::debug!(
            event_name = "agent.tool.dispatched",
            tool = name,
            found = outcome.is_found(),
            "tool dispatched"
        );
        outcome
    }
}

/// Reads a required, non-blank string argument.
pub fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("missing required string argument `{name}`"))
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use portside_core::domain::outcome::{FailureKind, ToolOutcome};

    use super::{
        required_str, CatalogEntry, ParameterKind, ParameterSpec, Tool, ToolDescriptor,
        ToolRegistry, ToolRegistryError,
    };

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(self.0, "Echoes its input").with_parameter(
                "text",
                ParameterSpec::required(ParameterKind::String, "Text to echo"),
            )
        }

        async fn execute(&self, arguments: &Value) -> Result<ToolOutcome> {
            Ok(ToolOutcome::found(json!({"echo": required_str(arguments, "text")?})))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("broken", "Always fails")
        }

        async fn execute(&self, _arguments: &Value) -> Result<ToolOutcome> {
            bail!("order database unavailable")
        }
    }

    #[test]
    fn duplicate_and_reserved_names_are_rejected() {
        let mut registry = ToolRegistry::default();
        registry.register(EchoTool("echo")).expect("first registration");

        assert_eq!(
            registry.register(EchoTool("echo")),
            Err(ToolRegistryError::DuplicateTool("echo".to_string()))
        );
        assert_eq!(
            registry.register(EchoTool("file_search")),
            Err(ToolRegistryError::DuplicateTool("file_search".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn catalog_ends_with_retrieval_tool() {
        let mut registry = ToolRegistry::default();
        registry.register(EchoTool("zeta")).expect("register");
        registry.register(EchoTool("alpha")).expect("register");

        let names = registry.catalog().iter().map(|entry| entry.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["alpha", "zeta", "file_search"]);
        assert_eq!(registry.catalog().last(), Some(&CatalogEntry::Retrieval));
    }

    #[test]
    fn parameters_schema_lists_required_fields() {
        let descriptor = ToolDescriptor::new("lookup", "Looks things up")
            .with_parameter("key", ParameterSpec::required(ParameterKind::String, "Lookup key"))
            .with_parameter("limit", ParameterSpec::optional(ParameterKind::Integer, "Max rows"));

        let schema = descriptor.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["key"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], json!(["key"]));
    }

    #[tokio::test]
    async fn dispatch_normalizes_every_failure() {
        let mut registry = ToolRegistry::default();
        registry.register(EchoTool("echo")).expect("register");
        registry.register(BrokenTool).expect("register");

        let found = registry.dispatch("echo", &json!({"text": "hi"})).await;
        assert_eq!(found, ToolOutcome::found(json!({"echo": "hi"})));

        let unknown = registry.dispatch("teleport", &json!({})).await;
        assert!(matches!(unknown, ToolOutcome::Failed { kind: FailureKind::UnknownTool, .. }));
        assert_eq!(unknown.failure_message(), Some("Unknown tool: teleport"));

        let broken = registry.dispatch("broken", &json!({})).await;
        assert_eq!(broken, ToolOutcome::execution_error("order database unavailable"));

        let missing_argument = registry.dispatch("echo", &json!({"text": "  "})).await;
        assert!(matches!(
            missing_argument,
            ToolOutcome::Failed { kind: FailureKind::ExecutionError, .. }
        ));
    }
}
