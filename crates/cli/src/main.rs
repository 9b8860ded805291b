use std::process::ExitCode;

fn main() -> ExitCode {
    portside_cli::run()
}
