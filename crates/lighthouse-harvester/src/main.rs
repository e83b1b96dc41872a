//! `harvest` — the Lighthouse harvester binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite archive, and sweeps the activity id space forward from
//! `--start` until interrupted.
//!
//! ```
//! harvest --start 13000000000 --api-key <key>
//! LIGHTHOUSE_API_KEY=<key> harvest --start 13000000000
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use lighthouse_harvester::{
  HarvesterConfig,
  client::ApiClient,
  sweep::Harvester,
};
use lighthouse_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Trials match-report harvester")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// API key sent as the X-API-Key header on every request.
  #[arg(long, env = "LIGHTHOUSE_API_KEY", hide_env_values = true)]
  api_key: String,

  /// First activity id of the forward scan.
  #[arg(long)]
  start: i64,

  /// Override the configured concurrency (rate-gate capacity).
  #[arg(long)]
  concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration; missing file means all defaults.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LIGHTHOUSE"))
    .build()
    .context("failed to read config file")?;

  let mut cfg: HarvesterConfig = settings
    .try_deserialize()
    .context("failed to deserialise HarvesterConfig")?;
  if let Some(concurrency) = cli.concurrency {
    cfg.concurrency = concurrency;
  }

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let client = ApiClient::new(
    &cfg.api_base,
    cli.api_key,
    cfg.request_timeout(),
    cfg.backoff(),
  )
  .context("failed to build API client")?;

  let harvester = Harvester::new(
    client,
    store,
    cfg.concurrency,
    cfg.retry_interval(),
  );

  // Ctrl-C flips the shutdown signal; the running round drains first.
  let (tx, rx) = watch::channel(false);
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("interrupt received, finishing the current round");
      let _ = tx.send(true);
    }
  });

  info!(
    start = cli.start,
    concurrency = cfg.concurrency,
    store = ?cfg.store_path,
    "starting sweep"
  );
  harvester.run(cli.start, rx).await;

  Ok(())
}
