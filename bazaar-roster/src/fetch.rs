//! Detail-fetch capability consumed by the reconciler.

use bazaar_core::{EntityId, FetchError};
use futures::future::BoxFuture;

/// Fetches the full record for one identifier.
///
/// Implementations must be idempotent and safe to call concurrently; the
/// reconciler fans out one call per missing identifier. `Ok(None)` means the
/// entity does not exist in the backing store. Errors leave the identifier
/// unhydrated for the current pass; a later pass retries it because absence
/// from the roster lookup is exactly the retry trigger.
pub trait DetailFetcher<E>: Send + Sync {
    fn fetch<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Option<E>, FetchError>>;
}

impl<E, T> DetailFetcher<E> for std::sync::Arc<T>
where
    T: DetailFetcher<E> + ?Sized,
{
    fn fetch<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Option<E>, FetchError>> {
        (**self).fetch(id)
    }
}
