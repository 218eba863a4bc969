//! # bazaar-roster
//!
//! Roster reconciliation for the marketplace admin screens.
//!
//! A [`Reconciler`] keeps a [`Roster`] synchronized with a live identifier
//! feed: it diffs each full snapshot against the roster, removes departed
//! identifiers synchronously, hydrates new ones through a [`DetailFetcher`]
//! with capped concurrent fan-out, and revalidates every fetch result
//! against the newest snapshot before committing it. [`worker::run`] drives
//! a reconciler from a `watch` feed subscription; [`view`] provides the
//! filter/sort stage the screens apply before rendering.

pub mod fetch;
pub mod reconcile;
pub mod roster;
pub mod view;
pub mod worker;

pub use fetch::DetailFetcher;
pub use reconcile::{PassSummary, Reconciler, DEFAULT_FAN_OUT};
pub use roster::Roster;
pub use view::{filter_records, sort_records, SortDirection, SortKey};
