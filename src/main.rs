mod geo;
mod ingest;
mod stitch;
mod web;
mod wind;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::ingest::UpstreamClient;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "balloon-tracks")]
#[command(about = "Balloon constellation track reconstruction service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "config.yaml")]
        config: String,
    },
    /// Fetch the current window, stitch it, and print tracks as JSON
    Snapshot {
        #[arg(long, default_value = "config.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Snapshot { config } => snapshot(&config).await,
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error reading config {}: {}", path, e);
            None
        }
    }
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn snapshot(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    let upstream = match UpstreamClient::new(&config.upstream) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Client error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let frames = upstream.fetch_window(config.upstream.window_hours).await;
    let tracks = stitch::stitch(&frames);
    let points: usize = tracks.values().map(Vec::len).sum();
    log::info!(
        "snapshot: frames={} balloons={} points={}",
        frames.len(),
        tracks.len(),
        points
    );

    match serde_json::to_string_pretty(&tracks) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}
