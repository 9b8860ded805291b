use std::path::Path;

use portside_core::config::LoadOptions;
use portside_core::errors::ApplicationError;
use portside_core::observability::{export, InteractionLog};

use crate::commands::{load_config, CommandResult};

/// Writes every logged interaction, across sessions, to CSV.
pub fn run(options: &LoadOptions, out: Option<&Path>) -> CommandResult {
    let config = match load_config("export", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let log = InteractionLog::new(config.observability.log_file.clone());
    let records = match log.load_all() {
        Ok(records) => records,
        Err(error) => return CommandResult::from_error("export", &ApplicationError::from(error)),
    };

    let path = out.unwrap_or(&config.observability.export_path);
    match export::write_csv(&records, path) {
        Ok(rows) => {
            tracing::info!(
                event_name = "cli.export.completed",
                path = %path.display(),
                rows,
                "interaction log exported"
            );
            CommandResult::success(
                "export",
                format!("exported {rows} interactions to {}", path.display()),
            )
        }
        Err(error) => CommandResult::failure("export", "export_write", error.to_string(), 4),
    }
}
