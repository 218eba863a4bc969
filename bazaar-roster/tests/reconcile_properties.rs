//! End-to-end reconciliation behavior under snapshot churn, fetch failure,
//! and overlapping passes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Notify;

use bazaar_core::{EntityId, FetchError, IdentifierSet, UserRecord};
use bazaar_roster::{DetailFetcher, Reconciler};

#[derive(Clone)]
enum Behavior {
    Succeed,
    Fail,
    Missing,
    /// Succeed only after the gate is released.
    Gated(Arc<Notify>),
}

/// Scripted fetcher: per-identifier behavior plus a call counter.
#[derive(Default)]
struct ScriptedFetcher {
    behaviors: Mutex<HashMap<EntityId, Behavior>>,
    calls: Mutex<HashMap<EntityId, usize>>,
}

impl ScriptedFetcher {
    fn set(&self, id: &str, behavior: Behavior) {
        self.behaviors
            .lock()
            .expect("behaviors lock")
            .insert(EntityId::from(id), behavior);
    }

    fn succeed_all(&self, ids: &[&str]) {
        for id in ids {
            self.set(id, Behavior::Succeed);
        }
    }

    fn calls(&self, id: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(&EntityId::from(id))
            .copied()
            .unwrap_or(0)
    }
}

fn user(id: &EntityId) -> UserRecord {
    UserRecord {
        id: id.clone(),
        name: id.0.to_uppercase(),
        handle: id.0.clone(),
        email: None,
        review_count: 0,
        joined_at: Utc::now(),
    }
}

impl DetailFetcher<UserRecord> for ScriptedFetcher {
    fn fetch<'a>(
        &'a self,
        id: &'a EntityId,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, FetchError>> {
        async move {
            {
                let mut calls = self.calls.lock().expect("calls lock");
                *calls.entry(id.clone()).or_insert(0) += 1;
            }
            let behavior = self
                .behaviors
                .lock()
                .expect("behaviors lock")
                .get(id)
                .cloned()
                .unwrap_or(Behavior::Missing);
            match behavior {
                Behavior::Succeed => Ok(Some(user(id))),
                Behavior::Missing => Ok(None),
                Behavior::Fail => Err(FetchError::Backend {
                    id: id.clone(),
                    message: "backend unavailable".to_string(),
                }),
                Behavior::Gated(gate) => {
                    gate.notified().await;
                    Ok(Some(user(id)))
                }
            }
        }
        .boxed()
    }
}

fn snapshot(ids: &[&str]) -> IdentifierSet {
    ids.iter().map(|id| EntityId::from(*id)).collect()
}

fn id_strings(ids: Vec<EntityId>) -> Vec<String> {
    ids.into_iter().map(|id| id.0).collect()
}

#[tokio::test]
async fn converges_to_final_stable_snapshot() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a", "b", "c", "d"]);
    let reconciler = Reconciler::new(fetcher);

    for ids in [
        vec!["a"],
        vec!["a", "b", "c"],
        vec!["b", "c", "d"],
        vec!["b", "c", "d"],
    ] {
        reconciler.reconcile(snapshot(&ids)).await;
    }

    let mut ids = id_strings(reconciler.ids().await);
    ids.sort();
    assert_eq!(ids, ["b", "c", "d"]);
}

#[tokio::test]
async fn no_duplicates_even_under_overlapping_passes() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a", "b", "c"]);
    let reconciler = Arc::new(Reconciler::new(fetcher));

    // Two passes over the same snapshot racing each other.
    let (first, second) = futures::join!(
        reconciler.reconcile(snapshot(&["a", "b", "c"])),
        reconciler.reconcile(snapshot(&["a", "b", "c"])),
    );

    let ids = id_strings(reconciler.ids().await);
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len(), "duplicate identifier in roster");
    assert_eq!(reconciler.len().await, 3);
    // Every identifier was committed by exactly one of the passes.
    assert_eq!(first.added + second.added, 3);
}

#[tokio::test]
async fn removal_wins_over_stale_in_flight_fetch() {
    let gate = Arc::new(Notify::new());
    let fetcher = ScriptedFetcher::default();
    fetcher.set("x", Behavior::Gated(gate.clone()));
    fetcher.set("y", Behavior::Succeed);
    let reconciler = Arc::new(Reconciler::new(fetcher));

    // Pass N sees {x, y}; x's fetch hangs on the gate.
    let pass_n = {
        let reconciler = reconciler.clone();
        tokio::spawn(async move { reconciler.reconcile(snapshot(&["x", "y"])).await })
    };

    while !reconciler.contains(&EntityId::from("y")).await {
        tokio::task::yield_now().await;
    }

    // Pass N+1 drops x while its fetch is still in flight.
    reconciler.reconcile(snapshot(&["y"])).await;

    // The late fetch result must not resurrect x.
    gate.notify_one();
    let summary = pass_n.await.expect("join pass N");
    assert_eq!(summary.stale_dropped, 1);
    assert!(!reconciler.contains(&EntityId::from("x")).await);
    assert_eq!(id_strings(reconciler.ids().await), ["y"]);
}

#[tokio::test]
async fn hydrated_identifiers_are_not_refetched() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a", "b"]);
    let reconciler = Reconciler::new(fetcher);

    reconciler.reconcile(snapshot(&["a", "b"])).await;
    let summary = reconciler.reconcile(snapshot(&["a", "b"])).await;

    assert_eq!(summary.added, 0);
    assert_eq!(reconciler.fetcher_calls("a"), 1);
    assert_eq!(reconciler.fetcher_calls("b"), 1);
}

#[tokio::test]
async fn partial_failure_commits_successes_and_retries_only_failures() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a", "c"]);
    fetcher.set("b", Behavior::Fail);
    let reconciler = Reconciler::new(fetcher);

    let summary = reconciler.reconcile(snapshot(&["a", "b", "c"])).await;
    assert_eq!(summary.added, 2);
    assert_eq!(summary.failed, 1);
    let mut ids = id_strings(reconciler.ids().await);
    ids.sort();
    assert_eq!(ids, ["a", "c"]);
    assert_eq!(reconciler.failure_count(&EntityId::from("b")).await, 1);
    assert_eq!(
        id_strings(reconciler.failing_ids().await),
        ["b"],
        "failure ledger should expose the stuck identifier"
    );

    // Same snapshot again: only b is retried.
    reconciler.reconcile(snapshot(&["a", "b", "c"])).await;
    assert_eq!(reconciler.fetcher_calls("a"), 1);
    assert_eq!(reconciler.fetcher_calls("c"), 1);
    assert_eq!(reconciler.fetcher_calls("b"), 2);
    assert_eq!(reconciler.failure_count(&EntityId::from("b")).await, 2);

    // Backend recovers; b hydrates and its failure count resets.
    reconciler.set_behavior("b", Behavior::Succeed);
    reconciler.reconcile(snapshot(&["a", "b", "c"])).await;
    assert!(reconciler.contains(&EntityId::from("b")).await);
    assert_eq!(reconciler.failure_count(&EntityId::from("b")).await, 0);
    assert!(reconciler.failing_ids().await.is_empty());
}

#[tokio::test]
async fn failure_ledger_clears_when_identifier_leaves_snapshot() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a"]);
    fetcher.set("b", Behavior::Fail);
    let reconciler = Reconciler::new(fetcher);

    reconciler.reconcile(snapshot(&["a", "b"])).await;
    assert_eq!(reconciler.failure_count(&EntityId::from("b")).await, 1);

    // b never reached the roster, so the clear must key off the snapshot.
    reconciler.reconcile(snapshot(&["a"])).await;
    assert_eq!(reconciler.failure_count(&EntityId::from("b")).await, 0);
    assert!(reconciler.failing_ids().await.is_empty());
}

#[tokio::test]
async fn missing_entities_are_dropped_without_error() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["a"]);
    fetcher.set("ghost", Behavior::Missing);
    let reconciler = Reconciler::new(fetcher);

    let summary = reconciler.reconcile(snapshot(&["a", "ghost"])).await;
    assert_eq!(summary.added, 1);
    assert_eq!(summary.missing, 1);
    assert_eq!(summary.failed, 0);
    assert!(!reconciler.contains(&EntityId::from("ghost")).await);
}

#[tokio::test]
async fn scenario_u1_u2_then_u2_u3() {
    let fetcher = ScriptedFetcher::default();
    fetcher.succeed_all(&["u1", "u2", "u3"]);
    let reconciler = Reconciler::new(fetcher);

    reconciler.reconcile(snapshot(&["u1", "u2"])).await;
    let mut ids = id_strings(reconciler.ids().await);
    ids.sort();
    assert_eq!(ids, ["u1", "u2"]);

    reconciler.reconcile(snapshot(&["u2", "u3"])).await;
    let mut ids = id_strings(reconciler.ids().await);
    ids.sort();
    assert_eq!(ids, ["u2", "u3"]);

    assert_eq!(reconciler.fetcher_calls("u1"), 1, "u1 never retried");
    assert_eq!(reconciler.fetcher_calls("u2"), 1, "u2 fetched exactly once");
    assert_eq!(reconciler.fetcher_calls("u3"), 1, "u3 fetched exactly once");
}

// Test-only conveniences over the scripted fetcher.
trait ScriptedAccess {
    fn fetcher_calls(&self, id: &str) -> usize;
    fn set_behavior(&self, id: &str, behavior: Behavior);
}

impl ScriptedAccess for Reconciler<UserRecord, ScriptedFetcher> {
    fn fetcher_calls(&self, id: &str) -> usize {
        self.fetcher().calls(id)
    }

    fn set_behavior(&self, id: &str, behavior: Behavior) {
        self.fetcher().set(id, behavior);
    }
}
