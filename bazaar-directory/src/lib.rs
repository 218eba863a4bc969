//! # bazaar-directory
//!
//! File-backed marketplace collaborator: one JSON document per entity under
//! a category directory tree. Implements both sides of the roster contract —
//! [`DirectoryFeed`] pushes full identifier snapshots (scan + `notify`
//! watcher), [`DocumentFetcher`] hydrates single records on demand.

pub mod error;
pub mod feed;
pub mod fetch;
pub mod layout;

pub use error::DirectoryError;
pub use feed::{scan_category, DirectoryFeed, FeedSubscription, DEBOUNCE_WINDOW};
pub use fetch::DocumentFetcher;
pub use layout::{category_dir, document_path, ensure_layout};
