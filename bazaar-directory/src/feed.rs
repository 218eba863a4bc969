//! Identifier feed over the document tree.
//!
//! Every emission is a full [`IdentifierSet`] snapshot for one category,
//! published on a `watch` channel. Filesystem events from `notify` trigger a
//! debounced rescan; the feed never emits deltas and never emits an
//! unchanged set.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecursiveMode, Watcher};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use bazaar_core::{AppStatus, Category, EntityId, IdentifierSet};

use crate::error::{io_err, DirectoryError};
use crate::layout::{category_dir, is_json_document};

/// Rapid saves of the same document collapse into one rescan.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// A live feed subscription: the snapshot receiver plus the task driving it.
pub struct FeedSubscription {
    pub receiver: watch::Receiver<IdentifierSet>,
    pub task: JoinHandle<Result<(), DirectoryError>>,
}

/// Push-based identifier feed rooted at a document tree.
///
/// Each [`subscribe`](DirectoryFeed::subscribe) call is independent; the
/// category split (users, developers, apps per status) mirrors the admin
/// screens.
pub struct DirectoryFeed {
    root: PathBuf,
}

impl DirectoryFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One-shot snapshot of a category's current identifier set.
    pub fn scan(&self, category: Category) -> Result<IdentifierSet, DirectoryError> {
        scan_category(&self.root, category)
    }

    /// Subscribe to snapshots for one category.
    ///
    /// The receiver starts at the current scan; the spawned task rescans on
    /// filesystem changes until shutdown or watcher loss. A failed task is
    /// terminal; resubscription is up to the caller.
    pub fn subscribe(
        &self,
        category: Category,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<FeedSubscription, DirectoryError> {
        let dir = category_dir(&self.root, category);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }

        let initial = scan_category(&self.root, category)?;
        let (tx, rx) = watch::channel(initial);

        let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let root = self.root.clone();
        let task = tokio::spawn(async move {
            // Tie the watcher's lifetime to the subscription task.
            let _watcher = watcher;
            feed_task(root, category, tx, event_rx, shutdown_rx).await
        });

        Ok(FeedSubscription { receiver: rx, task })
    }
}

/// Scan a category directory into an identifier set.
///
/// Identifiers are document file stems. App categories additionally filter
/// on the document's `status` field; documents that cannot be read or parsed
/// are skipped with a warning so one bad file never hides the rest.
pub fn scan_category(root: &Path, category: Category) -> Result<IdentifierSet, DirectoryError> {
    let dir = category_dir(root, category);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(IdentifierSet::new()),
        Err(err) => return Err(io_err(&dir, err)),
    };

    let mut ids = IdentifierSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(&dir, e))?;
        let path = entry.path();
        if !is_json_document(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        match category {
            Category::Apps(status) => match document_status(&path) {
                Ok(doc_status) if doc_status == status => {
                    ids.insert(EntityId::from(stem));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable app document during scan",
                    );
                }
            },
            Category::Users | Category::Developers => {
                ids.insert(EntityId::from(stem));
            }
        }
    }
    Ok(ids)
}

fn document_status(path: &Path) -> Result<AppStatus, DirectoryError> {
    #[derive(Deserialize)]
    struct StatusProbe {
        status: AppStatus,
    }

    let raw = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let probe: StatusProbe = serde_json::from_str(&raw).map_err(|source| DirectoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(probe.status)
}

pub(crate) async fn feed_task(
    root: PathBuf,
    category: Category,
    tx: watch::Sender<IdentifierSet>,
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DirectoryError> {
    let mut debounce = HashMap::<PathBuf, Instant>::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_relevant_event_kind(&event.kind) {
                    continue;
                }

                let mut rescan = false;
                for path in &event.paths {
                    if !is_json_document(path) {
                        continue;
                    }
                    if should_process_event(&mut debounce, path, Instant::now()) {
                        rescan = true;
                    }
                }
                if !rescan {
                    continue;
                }

                let scan_root = root.clone();
                let snapshot = tokio::task::spawn_blocking(move || {
                    scan_category(&scan_root, category)
                })
                .await
                .map_err(|err| DirectoryError::Task(format!("scan join error: {err}")))??;

                let published = tx.send_if_modified(|current| {
                    if *current == snapshot {
                        return false;
                    }
                    *current = snapshot;
                    true
                });
                if published {
                    tracing::debug!(%category, "published identifier snapshot");
                }
            }
        }
    }

    Ok(())
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn should_process_event(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
) -> bool {
    should_process_event_with_threshold(debounce, path, now, DEBOUNCE_WINDOW)
}

fn should_process_event_with_threshold(
    debounce: &mut HashMap<PathBuf, Instant>,
    path: &Path,
    now: Instant,
    threshold: Duration,
) -> bool {
    debounce.retain(|_, seen_at| now.duration_since(*seen_at) <= Duration::from_secs(30));
    match debounce.get(path) {
        Some(last_seen) if now.duration_since(*last_seen) < threshold => false,
        _ => {
            debounce.insert(path.to_path_buf(), now);
            true
        }
    }
}
