use std::io::{self, BufRead, Write};
use std::path::Path;

use tokio::runtime::Runtime;

use portside_agent::SupportAgent;
use portside_core::config::LoadOptions;
use portside_core::errors::ApplicationError;

use crate::commands::ask::render_reply;
use crate::commands::scenarios::run_scenarios;
use crate::commands::{build_agent, build_runtime, load_config, CommandResult};
use crate::render;

const BANNER: &str = "Portside customer support. Ask a question, or type:
  test    run the routing scenarios
  stats   show session statistics
  export  export this session to CSV
  exit    quit";

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("chat", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("chat") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };
    let agent = match runtime.block_on(build_agent(&config)) {
        Ok(agent) => agent,
        Err(error) => return CommandResult::from_error("chat", &error),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let export_path = config.observability.export_path.clone();
    match run_with_io(&runtime, &agent, &export_path, stdin.lock(), stdout.lock()) {
        Ok(()) => CommandResult::text(format!("Session {} ended.", agent.observer().session_id())),
        Err(error) => CommandResult::failure("chat", "terminal_io", error.to_string(), 1),
    }
}

/// Line-driven session loop. Failed questions are reported inline and the
/// loop keeps going; end of input behaves like `exit`.
pub fn run_with_io<R: BufRead, W: Write>(
    runtime: &Runtime,
    agent: &SupportAgent,
    export_path: &Path,
    input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(output, "{BANNER}")?;

    for line in input.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.to_ascii_lowercase().as_str() {
            "exit" | "quit" => break,
            "stats" => writeln!(output, "{}", session_stats(agent))?,
            "export" => {
                let message = match agent.observer().export_csv(export_path) {
                    Ok(rows) => format!("Exported {rows} interactions to {}", export_path.display()),
                    Err(error) => format!("Export failed: {error}"),
                };
                writeln!(output, "{message}")?;
            }
            "test" => {
                let report = runtime.block_on(run_scenarios(agent));
                writeln!(output, "{}", report.unwrap_or_else(|error| failure_line(&error)))?;
            }
            _ => {
                let reply = runtime
                    .block_on(agent.handle_question(entry, None))
                    .map_err(ApplicationError::from);
                let text = match reply {
                    Ok(reply) => render_reply(&reply),
                    Err(error) => failure_line(&error),
                };
                writeln!(output, "{text}")?;
            }
        }
        output.flush()?;
    }

    Ok(())
}

fn session_stats(agent: &SupportAgent) -> String {
    let observer = agent.observer();
    let summary = observer.session_summary();
    [
        render::summary("SESSION SUMMARY", Some(&summary.session_id), &summary.stats),
        render::accuracy(&observer.tool_accuracy_report()),
        render::failed(&observer.failed_interactions()),
    ]
    .join("\n\n")
}

fn failure_line(error: &ApplicationError) -> String {
    format!("Sorry, that request failed ({}): {error}", error.error_class())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use portside_agent::providers::PolicyRoutingModel;
    use portside_agent::{support_registry, SupportAgent};
    use portside_core::observability::{InteractionLog, InteractionObserver};
    use portside_db::{DemoOrderDataset, InMemoryOrderRepository};
    use tempfile::TempDir;

    use super::run_with_io;

    fn offline_agent(dir: &TempDir) -> SupportAgent {
        let orders = Arc::new(InMemoryOrderRepository::with_orders(DemoOrderDataset::orders()));
        let tools = support_registry(orders).expect("registry");
        let observer = InteractionObserver::new(InteractionLog::new(dir.path().join("log.jsonl")));
        SupportAgent::new(Arc::new(PolicyRoutingModel), Arc::new(tools), Arc::new(observer))
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime")
    }

    #[test]
    fn questions_are_answered_and_blank_lines_skipped() {
        let dir = TempDir::new().expect("temp dir");
        let agent = offline_agent(&dir);
        let input = Cursor::new("\n   \nWhat's the status of order ORD-1005?\nexit\nignored\n");
        let mut output = Vec::new();

        run_with_io(&runtime(), &agent, &dir.path().join("out.csv"), input, &mut output)
            .expect("session");

        let output = String::from_utf8(output).expect("utf8");
        assert!(output.contains("[tool: check_order_status | success"));
        assert_eq!(agent.observer().records().len(), 1);
    }

    #[test]
    fn stats_and_export_cover_the_current_session() {
        let dir = TempDir::new().expect("temp dir");
        let agent = offline_agent(&dir);
        let export_path = dir.path().join("session.csv");
        let input = Cursor::new("Track MAEU7654321\nstats\nEXPORT\n");
        let mut output = Vec::new();

        run_with_io(&runtime(), &agent, &export_path, input, &mut output).expect("session");

        let output = String::from_utf8(output).expect("utf8");
        assert!(output.contains("SESSION SUMMARY"));
        assert!(output.contains("Exported 1 interactions"));
        let csv = std::fs::read_to_string(&export_path).expect("csv");
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_command_runs_every_scenario() {
        let dir = TempDir::new().expect("temp dir");
        let agent = offline_agent(&dir);
        let mut output = Vec::new();

        let input = Cursor::new("test\nquit\n");
        run_with_io(&runtime(), &agent, &dir.path().join("out.csv"), input, &mut output)
            .expect("session");

        let output = String::from_utf8(output).expect("utf8");
        assert_eq!(output.matches("PASS").count(), 6);
        assert_eq!(agent.observer().records().len(), 6);
    }
}
