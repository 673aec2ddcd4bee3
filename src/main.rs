//! genspark2api server binary
//!
//! Serves an OpenAI-style video generation API backed by a pool of Genspark
//! session cookies.
//!
//! # Usage
//!
//! ```bash
//! GS_COOKIE="session_id=...,session_id=..." genspark2api --port 7055
//! ```
//!
//! # API Endpoints
//!
//! - `POST /v1/videos/generations`: Generate videos
//! - `GET /v1/models`: List supported video models
//! - `GET /ping`: Health check endpoint

use clap::Parser;
use genspark2api::cli::{ServerArgs, run_server_mode};
use std::path::PathBuf;

/// OpenAI-compatible video generation adapter for Genspark
#[derive(Parser)]
#[command(name = "genspark2api", author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on [default: 7055]
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to [default: ::]
    #[arg(long)]
    host: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    run_server_mode(ServerArgs {
        port: cli.port,
        host: cli.host,
        config: cli.config,
        verbose: cli.verbose,
    })
    .await
}
