//! Bazaar core library — marketplace domain types and shared errors.
//!
//! Public API surface:
//! - [`types`] — identifier newtype, category enum, domain records
//! - [`error`] — [`FetchError`] and [`FeedError`]

pub mod error;
pub mod types;

pub use error::{FeedError, FetchError};
pub use types::{
    AppRecord, AppStatus, Category, DeveloperRecord, Entity, EntityId, IdentifierSet, Searchable,
    UserRecord,
};
