//! Book Client - market data viewer
//!
//! Connects to the market data server and redraws the top five levels of
//! every symbol each time a snapshot arrives.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use book_client::logging::init_tracing;
use book_client::{
    Config, Connection, JsonStream, Renderer, StreamDecoder, Viewer, ViewerOutcome,
    EXIT_INTERRUPTED,
};

#[derive(Parser, Debug)]
#[command(name = "book-client", version, about = "Top-5 book client")]
struct Cli {
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
    /// Exit after N frames (0 = infinite)
    #[arg(long, value_name = "N")]
    frames: Option<u64>,
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

async fn run(args: Cli) -> anyhow::Result<ViewerOutcome> {
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(frames) = args.frames {
        config.frames = frames;
    }

    init_tracing(&config.log_level)?;
    config.validate()?;
    info!(host = %config.host, port = config.port, frames = config.frames, "Configuration loaded");

    let connection = Connection::connect(&config).await?;
    let stream = JsonStream::with_decoder(
        connection,
        StreamDecoder::with_max_buffer(config.max_buffer_bytes),
    );
    let renderer = Renderer::new(std::io::stdout(), config.depth);

    let outcome = Viewer::new(stream, renderer, config.depth)
        .with_frame_limit(config.frame_limit())
        .run()
        .await
        .context("market data stream failed")?;

    info!(frames = outcome.frames_rendered, stop = ?outcome.stop, "Viewer finished");
    Ok(outcome)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
