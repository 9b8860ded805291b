pub mod ask;
pub mod chat;
pub mod config;
pub mod export;
pub mod migrate;
pub mod report;
pub mod scenarios;
pub mod seed;

use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Runtime;

use portside_agent::{providers, support_registry, ModelError, SupportAgent};
use portside_core::config::{AppConfig, LoadOptions};
use portside_core::errors::ApplicationError;
use portside_core::observability::{InteractionLog, InteractionObserver};
use portside_db::repositories::{OrderRepository, SqlOrderRepository};
use portside_db::{connect_with_settings, migrations, DbPool, DemoOrderDataset};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Plain rendered text, for reports meant to be read rather than parsed.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Opens the order database, migrating and seeding the demo dataset when the
/// order table is empty.
pub(crate) async fn open_orders(config: &AppConfig) -> Result<DbPool, ApplicationError> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ApplicationError::Persistence(format!("database connection: {error}")))?;

    migrations::run_pending(&pool)
        .await
        .map_err(|error| ApplicationError::Persistence(format!("migration: {error}")))?;

    let orders = SqlOrderRepository::new(pool.clone())
        .count()
        .await
        .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
    if orders == 0 {
        tracing::info!(
            event_name = "cli.orders.seeding",
            "order table is empty, loading demo order dataset"
        );
        DemoOrderDataset::load(&pool)
            .await
            .map_err(|error| ApplicationError::Persistence(format!("seed: {error}")))?;
    }

    Ok(pool)
}

/// Wires the agent for one run: order source, tools, model provider, and a
/// fresh session over the configured interaction log.
pub(crate) async fn build_agent(config: &AppConfig) -> Result<SupportAgent, ApplicationError> {
    let pool = open_orders(config).await?;
    let orders: Arc<dyn OrderRepository> = Arc::new(SqlOrderRepository::new(pool));
    let tools = support_registry(orders)
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
    let model = providers::from_config(&config.llm).map_err(|error| match error {
        ModelError::Configuration(_) => ApplicationError::Configuration(error.to_string()),
        other => ApplicationError::Integration(other.to_string()),
    })?;
    let observer =
        InteractionObserver::new(InteractionLog::new(config.observability.log_file.clone()));

    tracing::info!(
        event_name = "cli.session.started",
        session_id = %observer.session_id(),
        provider = ?config.llm.provider,
        log_file = %config.observability.log_file.display(),
        "support session started"
    );
    Ok(SupportAgent::new(model, Arc::new(tools), Arc::new(observer)))
}
