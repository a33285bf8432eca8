use anyhow::{Context, Result};
use clap::Parser;
use frontier_service::http::{self, ServerConfig};
use frontier_service::{AnalysisService, ServiceConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(name = "frontier-server", about = "Efficient frontier HTTP API")]
struct Args {
    /// YAML service configuration; FRONTIER_* environment variables when omitted
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(short, long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Directory served for non-API paths
    #[clap(long, default_value = "./static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading {:?}", path))?;
            ServiceConfig::from_yaml(&yaml)?
        }
        None => ServiceConfig::from_env().context("loading configuration")?,
    };

    let service = Arc::new(AnalysisService::with_yahoo(config)?);
    http::serve(
        service,
        ServerConfig {
            bind_addr: args.bind,
            static_dir: args.static_dir,
        },
    )
    .await;

    Ok(())
}
