//! Diff-and-fetch reconciliation between an identifier feed and a roster.
//!
//! Pass shape:
//! 1. Record the snapshot as the latest identifier set.
//! 2. Synchronously remove roster entries absent from the snapshot.
//! 3. Concurrently fetch details for identifiers new to the roster.
//! 4. Commit each result only if its identifier is still in the *latest*
//!    snapshot, which may have been replaced by an overlapping pass.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;

use bazaar_core::{Entity, EntityId, IdentifierSet};

use crate::fetch::DetailFetcher;
use crate::roster::Roster;

/// Default cap on concurrent detail fetches per pass.
pub const DEFAULT_FAN_OUT: usize = 16;

/// Outcome counters for one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    /// Records committed to the roster this pass.
    pub added: usize,
    /// Entries removed because their identifier left the snapshot.
    pub removed: usize,
    /// Fetches that errored; their identifiers stay unhydrated.
    pub failed: usize,
    /// Fetches that returned no record.
    pub missing: usize,
    /// Successful fetches discarded at commit time, either because a newer
    /// snapshot dropped the identifier or an overlapping pass won the commit.
    pub stale_dropped: usize,
}

/// Keeps one roster synchronized with successive identifier snapshots.
///
/// State is owned by the instance and injected by the view that mounts it;
/// nothing here is global. `reconcile` takes `&self` and tolerates
/// overlapping invocations: the feed may emit snapshots faster than fetches
/// resolve, and results from a superseded pass are revalidated against the
/// newest snapshot before they commit.
pub struct Reconciler<E, F> {
    fetcher: F,
    fan_out: usize,
    // Lock order is latest → roster → failures wherever held together.
    latest: RwLock<IdentifierSet>,
    roster: RwLock<Roster<E>>,
    failures: RwLock<HashMap<EntityId, u32>>,
}

impl<E, F> Reconciler<E, F>
where
    E: Entity,
    F: DetailFetcher<E>,
{
    pub fn new(fetcher: F) -> Self {
        Self::with_fan_out(fetcher, DEFAULT_FAN_OUT)
    }

    /// Create a reconciler with an explicit concurrent-fetch cap.
    pub fn with_fan_out(fetcher: F, fan_out: usize) -> Self {
        Self {
            fetcher,
            fan_out: fan_out.max(1),
            latest: RwLock::new(IdentifierSet::new()),
            roster: RwLock::new(Roster::new()),
            failures: RwLock::new(HashMap::new()),
        }
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// The injected fetch capability.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run one reconcile pass against a full identifier snapshot.
    ///
    /// After the returned future resolves, the roster key set equals the
    /// snapshot minus identifiers whose fetch failed or returned no record
    /// (those retry on the next pass). Prior entries keep their insertion
    /// order; new entries are appended in fetch-completion order, so callers
    /// needing a display order sort via [`crate::view`].
    pub async fn reconcile(&self, snapshot: IdentifierSet) -> PassSummary {
        let mut summary = PassSummary::default();

        {
            let mut latest = self.latest.write().await;
            *latest = snapshot.clone();
        }

        // Removal is synchronous and committed before any fetch is issued,
        // so entries absent from this snapshot never outlive it.
        let to_add: Vec<EntityId> = {
            let mut roster = self.roster.write().await;
            let stale: Vec<EntityId> = roster
                .ids()
                .iter()
                .filter(|id| !snapshot.contains(*id))
                .cloned()
                .collect();
            for id in &stale {
                roster.remove(id);
            }
            summary.removed = stale.len();
            // The ledger is keyed by snapshot membership, not roster
            // membership: a failing identifier was never committed, so its
            // entry must still clear when the identifier departs.
            self.failures
                .write()
                .await
                .retain(|id, _| snapshot.contains(id));
            snapshot
                .iter()
                .filter(|id| !roster.contains(id))
                .cloned()
                .collect::<Vec<_>>()
        };

        let mut fetches = stream::iter(to_add.into_iter().map(|id| async move {
            let result = self.fetcher.fetch(&id).await;
            (id, result)
        }))
        .buffer_unordered(self.fan_out);

        while let Some((id, result)) = fetches.next().await {
            match result {
                Ok(Some(record)) => {
                    if self.commit(&id, record).await {
                        summary.added += 1;
                        self.failures.write().await.remove(&id);
                    } else {
                        summary.stale_dropped += 1;
                    }
                }
                Ok(None) => {
                    tracing::debug!(%id, "entity missing from backing store");
                    summary.missing += 1;
                }
                Err(err) => {
                    let attempts = {
                        let mut failures = self.failures.write().await;
                        let count = failures.entry(id.clone()).or_insert(0);
                        *count += 1;
                        *count
                    };
                    tracing::warn!(
                        %id,
                        attempts,
                        error = %err,
                        "detail fetch failed; identifier left unhydrated",
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Commit a fetched record, rechecking membership in the latest snapshot
    /// so a removed identifier is never resurrected by a slow fetch.
    async fn commit(&self, id: &EntityId, record: E) -> bool {
        let latest = self.latest.read().await;
        let mut roster = self.roster.write().await;
        if !latest.contains(id) || roster.contains(id) {
            return false;
        }
        roster.insert(record);
        true
    }

    pub async fn contains(&self, id: &EntityId) -> bool {
        self.roster.read().await.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.roster.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.roster.read().await.is_empty()
    }

    /// Roster identifiers in insertion order.
    pub async fn ids(&self) -> Vec<EntityId> {
        self.roster.read().await.ids().to_vec()
    }

    /// Consecutive failed fetch attempts for an identifier; reset on success
    /// or when the identifier leaves the snapshot.
    pub async fn failure_count(&self, id: &EntityId) -> u32 {
        self.failures
            .read()
            .await
            .get(id)
            .copied()
            .unwrap_or_default()
    }

    /// Identifiers currently stuck unhydrated behind at least one failed
    /// fetch, sorted for stable presentation.
    pub async fn failing_ids(&self) -> Vec<EntityId> {
        let failures = self.failures.read().await;
        let mut ids: Vec<EntityId> = failures.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl<E, F> Reconciler<E, F>
where
    E: Entity + Clone,
    F: DetailFetcher<E>,
{
    /// Clone out the hydrated records in insertion order.
    pub async fn records(&self) -> Vec<E> {
        self.roster.read().await.to_vec()
    }

    /// Record for a single identifier, if hydrated.
    pub async fn get(&self, id: &EntityId) -> Option<E> {
        self.roster.read().await.get(id).cloned()
    }
}
