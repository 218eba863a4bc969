//! Feed-driven roster worker task.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use bazaar_core::{Category, Entity, FeedError, IdentifierSet};

use crate::fetch::DetailFetcher;
use crate::reconcile::{PassSummary, Reconciler};

/// Drive a reconciler from an identifier feed subscription until shutdown.
///
/// Reconciles the snapshot present at subscription time, then once per feed
/// emission. Consecutive emissions between passes coalesce: `changed()` plus
/// `borrow_and_update()` always reconciles the newest snapshot, never a
/// backlog. A closed feed is terminal and surfaces as [`FeedError::Closed`];
/// resubscription is the caller's responsibility.
pub async fn run<E, F>(
    reconciler: Arc<Reconciler<E, F>>,
    category: Category,
    mut feed_rx: watch::Receiver<IdentifierSet>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), FeedError>
where
    E: Entity,
    F: DetailFetcher<E>,
{
    let initial = feed_rx.borrow_and_update().clone();
    let summary = reconciler.reconcile(initial).await;
    log_pass(category, &summary);

    loop {
        tokio::select! {
            // Shutdown wins when the feed closes in the same teardown.
            biased;
            _ = shutdown_rx.recv() => break,
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    tracing::warn!(%category, "identifier feed closed");
                    return Err(FeedError::Closed { category });
                }
                let snapshot = feed_rx.borrow_and_update().clone();
                let summary = reconciler.reconcile(snapshot).await;
                log_pass(category, &summary);
            }
        }
    }

    Ok(())
}

fn log_pass(category: Category, summary: &PassSummary) {
    tracing::info!(
        %category,
        added = summary.added,
        removed = summary.removed,
        failed = summary.failed,
        missing = summary.missing,
        stale_dropped = summary.stale_dropped,
        "roster pass completed",
    );
}
