//! Error types shared across the roster crates.

use thiserror::Error;

use crate::types::{Category, EntityId};

/// Failure of a single detail fetch.
///
/// A missing entity is not an error; fetchers return `Ok(None)` for that.
/// These variants cover backend and decode failures, both of which the
/// reconciler treats as "leave the identifier unhydrated for this pass".
#[derive(Debug, Error)]
pub enum FetchError {
    /// The backing store could not serve the document at all.
    #[error("backend error fetching {id}: {message}")]
    Backend { id: EntityId, message: String },

    /// The document was served but is not a valid record.
    #[error("malformed record for {id}: {message}")]
    Decode { id: EntityId, message: String },
}

/// Terminal failure of an identifier feed subscription.
///
/// The reconciler never resubscribes; recovery is the caller's concern.
/// Subscription setup failures surface as the feed implementation's own
/// error type before a worker ever runs.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("identifier feed for {category} closed")]
    Closed { category: Category },
}
