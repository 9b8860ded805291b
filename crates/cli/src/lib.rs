pub mod commands;
pub mod logging;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use portside_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "portside",
    about = "Portside customer-support agent CLI",
    long_about = "Ask the support agent questions, run routing scenarios, and report on recorded interactions.",
    after_help = "Examples:\n  portside ask \"What's the status of order ORD-1005?\"\n  portside scenarios\n  portside report --historical"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a portside.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Ask the agent one question and print its answer")]
    Ask {
        question: String,
        #[arg(long, help = "Tool the agent is expected to select, for accuracy tracking")]
        expect: Option<String>,
    },
    #[command(about = "Interactive session; type stats, export, test, or exit")]
    Chat,
    #[command(about = "Run the built-in routing scenarios and print accuracy reports")]
    Scenarios,
    #[command(about = "Report on every interaction in the log")]
    Report {
        #[arg(long, help = "Include session count and most frequent questions")]
        historical: bool,
    },
    #[command(about = "Export every logged interaction to CSV")]
    Export {
        #[arg(long, help = "Output path (defaults to observability.export_path)")]
        out: Option<PathBuf>,
    },
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic demo order dataset")]
    Seed,
    #[command(about = "Show the effective configuration with secrets redacted")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    if let Ok(config) = AppConfig::load(options.clone()) {
        logging::init_logging(&config);
    }

    let result = match cli.command {
        Command::Ask { question, expect } => {
            commands::ask::run(&options, &question, expect.as_deref())
        }
        Command::Chat => commands::chat::run(&options),
        Command::Scenarios => commands::scenarios::run(&options),
        Command::Report { historical } => commands::report::run(&options, historical),
        Command::Export { out } => commands::export::run(&options, out.as_deref()),
        Command::Migrate => commands::migrate::run(&options),
        Command::Seed => commands::seed::run(&options),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
