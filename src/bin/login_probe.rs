//! Login probe
//!
//! Sends three login attempts (empty username, empty password, valid
//! credentials) and prints every decoded value the server sends back.

use anyhow::{anyhow, Context};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use book_client::logging::init_tracing;
use book_client::probe::{run_probe, ProbeReport};
use book_client::{Config, EXIT_INTERRUPTED};

#[derive(Parser, Debug)]
#[command(name = "login-probe", version, about = "login test client")]
struct Cli {
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
    /// Seconds to wait for replies
    #[arg(long, value_name = "SECS", default_value_t = 5.0)]
    timeout: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    tokio::select! {
        result = run(args) => match result {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = interrupted() => ExitCode::from(EXIT_INTERRUPTED),
    }
}

async fn run(args: Cli) -> anyhow::Result<ProbeReport> {
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    init_tracing(&config.log_level)?;
    config.validate()?;
    let wait = Duration::try_from_secs_f64(args.timeout)
        .map_err(|e| anyhow!("invalid --timeout {}: {}", args.timeout, e))?;

    let mut stdout = std::io::stdout();
    let report = run_probe(&config, wait, &mut stdout)
        .await
        .context("login probe failed")?;

    info!(
        values = report.values_seen,
        login_replies = report.login_replies,
        timed_out = report.timed_out,
        "Probe finished"
    );
    Ok(report)
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
