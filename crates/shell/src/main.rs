use std::process::ExitCode;

use anyhow::Context;
use safecampus_auth::Navigator;
use safecampus_session::SessionStore;
use safecampus_shell::{Command, Shell, ShellConfig, USAGE};

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = ShellConfig::from_env();
    safecampus_observability::init(config.log_format);

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if command == Command::Help {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(&config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "command failed");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ShellConfig, command: Command) -> anyhow::Result<()> {
    let storage = config.open_storage()?;
    let navigator = Navigator::new(config.route_table()?);
    let mut shell = Shell::new(SessionStore::load(storage), navigator);

    let output = shell.run(command)?;
    let json = serde_json::to_string_pretty(&output).context("failed to encode output")?;
    println!("{json}");
    Ok(())
}
