//! Domain types for the Bazaar marketplace admin surface.
//!
//! Entity identifiers are opaque strings wrapped in [`EntityId`]; never pass
//! bare `String` identifiers between crates. All records are
//! serializable/deserializable via serde + serde_json.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed opaque identifier for a marketplace entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The complete identifier list for one category, as pushed by the feed.
///
/// Every emission is a full snapshot, never a delta; consumers diff
/// successive snapshots themselves.
pub type IdentifierSet = BTreeSet<EntityId>;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Review lifecycle state of a published app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Pending,
    Published,
    Rejected,
    Suspended,
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppStatus::Pending => write!(f, "pending"),
            AppStatus::Published => write!(f, "published"),
            AppStatus::Rejected => write!(f, "rejected"),
            AppStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl FromStr for AppStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppStatus::Pending),
            "published" => Ok(AppStatus::Published),
            "rejected" => Ok(AppStatus::Rejected),
            "suspended" => Ok(AppStatus::Suspended),
            other => Err(format!(
                "unknown app status '{other}' (expected pending|published|rejected|suspended)"
            )),
        }
    }
}

/// An admin roster category. Each category has its own identifier feed.
///
/// App rosters are split per status, matching the admin screens
/// (published, pending, rejected, suspended queues).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Users,
    Developers,
    Apps(AppStatus),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Users => write!(f, "users"),
            Category::Developers => write!(f, "developers"),
            Category::Apps(status) => write!(f, "apps:{status}"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Category::Users),
            "developers" => Ok(Category::Developers),
            other => match other.strip_prefix("apps:") {
                Some(status) => Ok(Category::Apps(status.parse()?)),
                None => Err(format!(
                    "unknown category '{other}' \
                     (expected users|developers|apps:<status>)"
                )),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A hydrated detail record keyed by its [`EntityId`].
pub trait Entity {
    fn entity_id(&self) -> &EntityId;
}

/// Display fields a record exposes to the case-insensitive roster filter.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// A marketplace end-user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: EntityId,
    pub name: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub review_count: u32,
    pub joined_at: DateTime<Utc>,
}

/// A registered developer (publisher) account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperRecord {
    pub id: EntityId,
    pub name: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub published_apps: u32,
    pub joined_at: DateTime<Utc>,
}

/// A distributed app listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    pub id: EntityId,
    pub name: String,
    pub developer: EntityId,
    /// Store genre label ("games", "productivity", ...), free-form.
    pub category: String,
    pub status: AppStatus,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating_sum: u64,
    #[serde(default)]
    pub rating_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl AppRecord {
    /// Mean star rating, `0.0` when the app has no reviews yet.
    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            return 0.0;
        }
        self.rating_sum as f64 / self.rating_count as f64
    }
}

impl Entity for UserRecord {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for DeveloperRecord {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for AppRecord {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Searchable for UserRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.id.0, &self.name, &self.handle]
    }
}

impl Searchable for DeveloperRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.id.0, &self.name, &self.handle]
    }
}

impl Searchable for AppRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.id.0, &self.name, &self.category]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
