use std::process::ExitCode;

use clap::Parser;
use devdash::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match logging::init(cli.log_file.as_deref()) {
        Ok(()) => commands::execute(&cli).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "exiting");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
