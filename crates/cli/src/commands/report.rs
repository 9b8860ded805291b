use portside_core::config::LoadOptions;
use portside_core::errors::ApplicationError;
use portside_core::observability::{metrics, InteractionLog};

use crate::commands::{load_config, CommandResult};
use crate::render;

/// Reports over the whole interaction log. `historical` adds the session
/// count and the most frequent questions.
pub fn run(options: &LoadOptions, historical: bool) -> CommandResult {
    let config = match load_config("report", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let log = InteractionLog::new(config.observability.log_file.clone());
    let records = match log.load_all() {
        Ok(records) => records,
        Err(error) => return CommandResult::from_error("report", &ApplicationError::from(error)),
    };

    if records.is_empty() {
        return CommandResult::text(format!(
            "No interactions recorded yet in {}.",
            config.observability.log_file.display()
        ));
    }

    let mut sections = Vec::new();
    if historical {
        sections.push(render::historical(&metrics::historical_summary(
            &records,
            config.observability.top_questions,
        )));
    } else {
        sections.push(render::summary("INTERACTION SUMMARY", None, &metrics::summarize(&records)));
    }
    sections.push(render::accuracy(&metrics::tool_accuracy_report(&records)));
    sections.push(render::confusion(&metrics::confusion_matrix(&records)));
    let failed =
        metrics::failed_interactions(&records).into_iter().cloned().collect::<Vec<_>>();
    sections.push(render::failed(&failed));

    CommandResult::text(sections.join("\n\n"))
}
