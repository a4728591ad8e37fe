use anyhow::{Context, Result};
use clap::Parser;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve boolean queries over an index written by `indexer build`.
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    #[arg(long, default_value = "./index")]
    index: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let Args { index, host, port } = Args::parse();

    let app = build_app(index.clone()).with_context(|| format!("opening index at {index}"))?;
    let addr: SocketAddr = format!("{host}:{port}").parse().context("invalid bind address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, %index, "serving boolean search");
    axum::serve(listener, app).await?;
    Ok(())
}
