use portside_agent::ExchangeReply;
use portside_core::config::LoadOptions;
use portside_core::errors::ApplicationError;

use crate::commands::{build_agent, build_runtime, load_config, CommandResult};

pub fn run(options: &LoadOptions, question: &str, expected_tool: Option<&str>) -> CommandResult {
    let question = question.trim();
    if question.is_empty() {
        return CommandResult::failure("ask", "invalid_input", "question must not be empty", 2);
    }

    let config = match load_config("ask", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("ask") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let agent = build_agent(&config).await?;
        agent.handle_question(question, expected_tool).await.map_err(ApplicationError::from)
    });

    match result {
        Ok(reply) => CommandResult::text(render_reply(&reply)),
        Err(error) => CommandResult::from_error("ask", &error),
    }
}

pub(crate) fn render_reply(reply: &ExchangeReply) -> String {
    let status = if reply.record.success { "success" } else { "failed" };
    format!(
        "{}\n[tool: {} | {} | {:.2}s]",
        reply.answer,
        reply.record.actual_tool(),
        status,
        reply.record.response_time_seconds
    )
}
