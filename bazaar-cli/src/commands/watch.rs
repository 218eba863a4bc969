//! `bazaar watch` — follow one roster live until ctrl-c.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use bazaar_core::{AppRecord, Category, DeveloperRecord, Entity, UserRecord};
use bazaar_directory::{DirectoryFeed, DocumentFetcher};
use bazaar_roster::{worker, Reconciler};

use crate::commands::{category_value, resolve_root};

/// Arguments for `bazaar watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Roster category (users, developers, apps:<status>).
    #[arg(value_parser = category_value)]
    pub category: Category,

    /// Catalog root directory (defaults to `~/.bazaar/catalog`).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl WatchArgs {
    pub async fn run(self) -> Result<()> {
        init_tracing();
        let root = resolve_root(self.root.clone())?;

        match self.category {
            Category::Users => watch_roster::<UserRecord>(&root, self.category).await,
            Category::Developers => watch_roster::<DeveloperRecord>(&root, self.category).await,
            Category::Apps(_) => watch_roster::<AppRecord>(&root, self.category).await,
        }
    }
}

async fn watch_roster<E>(root: &Path, category: Category) -> Result<()>
where
    E: Entity + Clone + DeserializeOwned + Send + Sync + 'static,
{
    let feed = DirectoryFeed::new(root);
    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let subscription = feed
        .subscribe(category, shutdown_tx.subscribe())
        .with_context(|| format!("failed to subscribe to {category} feed"))?;
    let reconciler = Arc::new(Reconciler::new(DocumentFetcher::<E>::new(root, category)));

    let worker_handle = tokio::spawn(worker::run(
        reconciler.clone(),
        category,
        subscription.receiver,
        shutdown_tx.subscribe(),
    ));

    tracing::info!(%category, root = %root.display(), "watching roster; ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .context("ctrl-c handler failed")?;
    tracing::info!(%category, "received ctrl-c, stopping watch");
    let _ = shutdown_tx.send(());

    worker_handle
        .await
        .context("worker task panicked")?
        .context("roster worker failed")?;
    subscription
        .task
        .await
        .context("feed task panicked")?
        .context("identifier feed failed")?;

    println!(
        "Final roster for {category}: {} record(s).",
        reconciler.len().await
    );
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
