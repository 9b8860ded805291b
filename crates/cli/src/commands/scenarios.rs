use portside_agent::SupportAgent;
use portside_core::config::LoadOptions;
use portside_core::errors::ApplicationError;

use crate::commands::{build_agent, build_runtime, load_config, CommandResult};
use crate::render;

/// Routing checks: a question and the tool the agent should pick for it.
pub const SCENARIOS: [(&str, &str); 6] = [
    ("What's the status of my order ORD-1005?", "check_order_status"),
    ("Can you track container MAEU7654321?", "get_tracking_info"),
    ("What is your return policy?", "file_search"),
    ("Do you ship dangerous goods?", "file_search"),
    ("When will order ORD-1010 be delivered?", "check_order_status"),
    ("What documents do I need for international shipping?", "file_search"),
];

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("scenarios", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("scenarios") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let agent = build_agent(&config).await?;
        run_scenarios(&agent).await
    });

    match result {
        Ok(output) => CommandResult::text(output),
        Err(error) => CommandResult::from_error("scenarios", &error),
    }
}

/// Runs every scenario in the agent's current session and renders the
/// per-question verdicts followed by the session reports.
pub(crate) async fn run_scenarios(agent: &SupportAgent) -> Result<String, ApplicationError> {
    let mut lines = vec![format!("Running {} routing scenarios", SCENARIOS.len())];

    for (index, (question, expected)) in SCENARIOS.iter().enumerate() {
        let reply = agent.handle_question(question, Some(expected)).await?;
        let verdict = if reply.record.tool_match == Some(true) { "PASS" } else { "FAIL" };
        lines.push(format!(
            "[{}/{}] {verdict} {question} -> {} (expected {expected})",
            index + 1,
            SCENARIOS.len(),
            reply.record.actual_tool(),
        ));
    }

    let observer = agent.observer();
    let summary = observer.session_summary();
    lines.push(String::new());
    lines.push(render::summary("SESSION SUMMARY", Some(&summary.session_id), &summary.stats));
    lines.push(String::new());
    lines.push(render::accuracy(&observer.tool_accuracy_report()));
    lines.push(String::new());
    lines.push(render::confusion(&observer.confusion_matrix()));

    Ok(lines.join("\n"))
}
