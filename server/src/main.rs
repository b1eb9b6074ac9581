use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use study_search::persist::DEFAULT_INDEX_FILE;
use study_search::SearchConfig;
use tracing_subscriber::{fmt, EnvFilter};
use server::{build_app, Settings};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Material catalog (JSON/JSONL file or directory)
    #[arg(long, default_value = "./materials.json")]
    catalog: PathBuf,
    /// Persisted index file
    #[arg(long, env = "STUDY_SEARCH_INDEX", default_value = DEFAULT_INDEX_FILE)]
    index: PathBuf,
    /// Minimum similarity for a result to be returned
    #[arg(long, default_value_t = SearchConfig::default().min_score)]
    min_score: f32,
    /// Maximum number of ranked results per query
    #[arg(long, default_value_t = SearchConfig::default().top_k)]
    top_k: usize,
    /// Token required by admin endpoints
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = SearchConfig { index_path: args.index, min_score: args.min_score, top_k: args.top_k, ..Default::default() };
    let app: Router = build_app(Settings { catalog_path: args.catalog, config, admin_token: args.admin_token })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
