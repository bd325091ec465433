use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use redline::cli::CliApp;
use redline::cli_types::Cli;
use redline::config::CliConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Ctrl-C is a clean stop, not a failure.
    tokio::select! {
        result = run(&args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error during review: {:#}", err);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReview interrupted");
            ExitCode::SUCCESS
        }
    }
}

async fn run(args: &Cli) -> Result<()> {
    let config = if args.config.exists() {
        CliConfig::load(&args.config)?
    } else {
        eprintln!(
            "Warning: configuration file '{}' not found, using default settings",
            args.config.display()
        );
        CliConfig::default()
    };

    let app = CliApp::new(config, args.verbose, !args.no_color)?;
    app.run(&args.path).await
}
