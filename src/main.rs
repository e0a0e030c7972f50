use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use stream_monitor::{Cli, Config, Monitor, run_with_shutdown};

fn init_tracing(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "warn,stream_monitor=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    // stdout belongs to the console sink
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let monitor = Monitor::new(Config::from(cli))?;
    let summary = run_with_shutdown(monitor).await;

    if let Some(error) = &summary.connection_error {
        println!("Connection error: {error}");
    }

    let mut exit = ExitCode::SUCCESS;
    for report in &summary.sinks {
        if let Some(error) = &report.error {
            eprintln!("{error} ({} samples not written)", report.dropped);
            exit = ExitCode::FAILURE;
        }
    }
    Ok(exit)
}
