use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logvault_core::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "logvault")]
#[command(about = "Per-project log ingestion and query server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the ingestion and query server")]
    Run {
        #[arg(long)]
        db_path: Option<PathBuf>,
        #[arg(long)]
        http_addr: Option<String>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        ingest_parallelism: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            db_path,
            http_addr,
            batch_size,
            ingest_parallelism,
        } => run_server(db_path, http_addr, batch_size, ingest_parallelism).await,
    }
}

async fn run_server(
    db_path: Option<PathBuf>,
    http_addr: Option<String>,
    batch_size: Option<usize>,
    ingest_parallelism: Option<usize>,
) -> anyhow::Result<()> {
    let mut cfg = Config::load().context("load config")?;
    if let Some(v) = db_path {
        cfg.db_path = v;
    }
    if let Some(v) = http_addr {
        cfg.http_addr = v;
    }
    if let Some(v) = batch_size {
        cfg.batch_size = v;
    }
    if let Some(v) = ingest_parallelism {
        cfg.ingest_parallelism = v;
    }

    let store = logvault_store::Store::open(&cfg.db_path)?;

    eprintln!("logvault run");
    eprintln!("  db: {}", cfg.db_path.display());
    eprintln!("  http: {}", cfg.http_addr);
    eprintln!("  batch size: {}", cfg.batch_size);
    eprintln!("  ingest parallelism: {}", cfg.ingest_parallelism);

    let listener = tokio::net::TcpListener::bind(&cfg.http_addr)
        .await
        .context("bind http listener")?;
    let app = logvault::server::router(store, cfg);

    let server_task = tokio::spawn(async move { axum::serve(listener, app).await });

    tokio::select! {
        res = server_task => {
            let inner = res.context("server task join failed")?;
            inner.context("http server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    Ok(())
}
