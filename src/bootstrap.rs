//! Binary wiring: environment, logging and the `ingest` / `reprocess` subcommands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::bail;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{chains_from_lookup, SwapscanConfig, DEFAULT_FEED_BASE_URL};
use crate::errors::ConfigError;
use crate::extract::SwapExtractor;
use crate::feed::ArkhamFeed;
use crate::ingest::IngestionPipeline;
use crate::internal::{AssetTransfersClient, ExplorerClient, InternalTransferResolver};
use crate::provider::ChainClientRegistry;
use crate::reprocess::ReprocessJob;
use crate::store::{PgStore, SwapStore};
use crate::tokens::TokenMetadataResolver;

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pull the feed and ingest; `full` ignores the latest stored timestamp.
    Ingest { full: bool },
    /// Replay quarantined transactions.
    Reprocess,
}

/// Parse the arguments following the program name.
pub fn parse_args<I>(args: I) -> anyhow::Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = match args.next().as_deref() {
        Some("ingest") => match args.next().as_deref() {
            None => Command::Ingest { full: false },
            Some("--full") => Command::Ingest { full: true },
            Some(other) => bail!("unknown ingest flag {other:?}"),
        },
        Some("reprocess") => Command::Reprocess,
        Some(other) => bail!("unknown command {other:?}; expected `ingest [--full]` or `reprocess`"),
        None => bail!("missing command; expected `ingest [--full]` or `reprocess`"),
    };
    if let Some(extra) = args.next() {
        bail!("unexpected argument {extra:?}");
    }
    Ok(command)
}

/// Install the global subscriber.
///
/// `RUST_LOG` selects levels (default `info`); `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = dotenvy::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    dotenvy::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVar { name })
}

fn cancel_on_interrupt(flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing in-flight transactions");
            flag.store(true, Ordering::Relaxed);
        }
    });
}

/// Connection pool size: one per worker plus two spare.
fn pool_size(workers: usize) -> u32 {
    u32::try_from(workers).unwrap_or(u32::MAX).saturating_add(2)
}

/// Main entry point for the application.
pub async fn run(command: Command) -> anyhow::Result<()> {
    let config = SwapscanConfig::from_env()?;
    let chains = chains_from_lookup(|name| dotenvy::var(name).ok());

    let database_url = required("DATABASE_URL")?;
    let feed_key = match command {
        Command::Ingest { .. } => required("ARKHAM_API_KEY")?,
        Command::Reprocess => dotenvy::var("ARKHAM_API_KEY").unwrap_or_default(),
    };
    let feed_base =
        dotenvy::var("ARKHAM_API_BASE").unwrap_or_else(|_| DEFAULT_FEED_BASE_URL.to_string());

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let pg = PgStore::connect(&database_url, pool_size(config.worker_concurrency)).await?;
    pg.migrate().await?;
    let store: Arc<dyn SwapStore> = Arc::new(pg);

    let internal = InternalTransferResolver::new(
        Arc::new(AssetTransfersClient::new(
            http.clone(),
            dotenvy::var("ALCHEMY_API_KEY").ok(),
        )),
        Arc::new(ExplorerClient::new(http.clone(), &chains)),
    );
    let extractor = SwapExtractor::new(
        Arc::new(ChainClientRegistry::new(chains.clone(), &config)),
        internal,
        Arc::new(TokenMetadataResolver::new(config.rpc_timeout)),
        config.fee_collector,
    );
    let feed = ArkhamFeed::new(http, feed_base, feed_key, &config);

    let pipeline = IngestionPipeline::new(
        Arc::new(feed),
        Arc::new(extractor),
        Arc::clone(&store),
        &chains,
        &config,
    );
    cancel_on_interrupt(pipeline.cancel_handle());

    match command {
        Command::Ingest { full } => {
            let summary = if full {
                pipeline.run_full().await?
            } else {
                pipeline.run_incremental().await?
            };
            info!(?summary, "Ingestion finished");
        }
        Command::Reprocess => {
            let summary = ReprocessJob::new(pipeline, store, &config).run().await?;
            info!(?summary, "Reprocessing finished");
        }
    }

    Ok(())
}
