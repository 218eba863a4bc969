//! `bazaar list` — hydrate a roster once, then filter/sort and print it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use bazaar_core::{
    AppRecord, Category, DeveloperRecord, Entity, EntityId, IdentifierSet, Searchable, UserRecord,
};
use bazaar_directory::{DirectoryFeed, DocumentFetcher};
use bazaar_roster::{filter_records, sort_records, Reconciler, SortDirection, SortKey};

use crate::commands::{category_value, resolve_root};

/// Arguments for `bazaar list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Roster category (users, developers, apps:<status>).
    #[arg(value_parser = category_value)]
    pub category: Category,

    /// Case-insensitive substring filter over display fields.
    #[arg(long)]
    pub filter: Option<String>,

    /// Sort key; valid keys depend on the category.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Catalog root directory (defaults to `~/.bazaar/catalog`).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl ListArgs {
    pub async fn run(self) -> Result<()> {
        let root = resolve_root(self.root.clone())?;
        let snapshot = DirectoryFeed::new(&root)
            .scan(self.category)
            .with_context(|| format!("failed to scan {} at {}", self.category, root.display()))?;

        match self.category {
            Category::Users => {
                self.render::<UserRecord, UserRow>(&root, snapshot, user_sort_key)
                    .await
            }
            Category::Developers => {
                self.render::<DeveloperRecord, DeveloperRow>(&root, snapshot, developer_sort_key)
                    .await
            }
            Category::Apps(_) => {
                self.render::<AppRecord, AppRow>(&root, snapshot, app_sort_key)
                    .await
            }
        }
    }

    async fn render<E, R>(
        &self,
        root: &Path,
        snapshot: IdentifierSet,
        sort_key: fn(&str) -> Option<SortKey<E>>,
    ) -> Result<()>
    where
        E: Entity + Searchable + Clone + Serialize + DeserializeOwned + Send + Sync,
        R: Tabled + for<'a> From<&'a E>,
    {
        let reconciler = Reconciler::new(DocumentFetcher::<E>::new(root, self.category));
        reconciler.reconcile(snapshot).await;

        let records = reconciler.records().await;
        let mut rows: Vec<E> = filter_records(&records, self.filter.as_deref().unwrap_or(""))
            .into_iter()
            .cloned()
            .collect();

        if let Some(sort) = self.sort.as_deref() {
            let key = sort_key(sort)
                .with_context(|| format!("unknown sort key '{sort}' for {}", self.category))?;
            let direction = if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            sort_records(&mut rows, &key, direction);
        }

        report_unhydrated(&reconciler.failing_ids().await);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No {} records match.", self.category);
            return Ok(());
        }
        let table_rows: Vec<R> = rows.iter().map(R::from).collect();
        println!("{}", Table::new(table_rows).with(Style::rounded()));
        Ok(())
    }
}

/// Warn on stderr so `--json` stdout stays machine-readable.
fn report_unhydrated(failing: &[EntityId]) {
    if failing.is_empty() {
        return;
    }
    let ids: Vec<String> = failing.iter().map(|id| id.0.clone()).collect();
    eprintln!(
        "{}",
        format!(
            "! {} identifier(s) left unhydrated after fetch failures: {}",
            failing.len(),
            ids.join(", ")
        )
        .yellow()
    );
}

// ---------------------------------------------------------------------------
// Sort keys per category
// ---------------------------------------------------------------------------

fn user_sort_key(name: &str) -> Option<SortKey<UserRecord>> {
    match name {
        "name" => Some(SortKey::Text(|u: &UserRecord| u.name.clone())),
        "handle" => Some(SortKey::Text(|u: &UserRecord| u.handle.clone())),
        "reviews" => Some(SortKey::Numeric(|u: &UserRecord| u.review_count as i64)),
        "joined" => Some(SortKey::Timestamp(|u: &UserRecord| u.joined_at)),
        _ => None,
    }
}

fn developer_sort_key(name: &str) -> Option<SortKey<DeveloperRecord>> {
    match name {
        "name" => Some(SortKey::Text(|d: &DeveloperRecord| d.name.clone())),
        "handle" => Some(SortKey::Text(|d: &DeveloperRecord| d.handle.clone())),
        "apps" => Some(SortKey::Numeric(|d: &DeveloperRecord| {
            d.published_apps as i64
        })),
        "joined" => Some(SortKey::Timestamp(|d: &DeveloperRecord| d.joined_at)),
        _ => None,
    }
}

fn app_sort_key(name: &str) -> Option<SortKey<AppRecord>> {
    match name {
        "name" => Some(SortKey::Text(|a: &AppRecord| a.name.clone())),
        "category" => Some(SortKey::Text(|a: &AppRecord| a.category.clone())),
        "downloads" => Some(SortKey::Numeric(|a: &AppRecord| a.downloads as i64)),
        "rating" => Some(SortKey::Float(AppRecord::average_rating)),
        "updated" => Some(SortKey::Timestamp(|a: &AppRecord| a.updated_at)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "handle")]
    handle: String,
    #[tabled(rename = "reviews")]
    reviews: u32,
    #[tabled(rename = "joined")]
    joined: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            handle: user.handle.clone(),
            reviews: user.review_count,
            joined: user.joined_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Tabled)]
struct DeveloperRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "handle")]
    handle: String,
    #[tabled(rename = "apps")]
    apps: u32,
    #[tabled(rename = "joined")]
    joined: String,
}

impl From<&DeveloperRecord> for DeveloperRow {
    fn from(developer: &DeveloperRecord) -> Self {
        Self {
            id: developer.id.to_string(),
            name: developer.name.clone(),
            handle: developer.handle.clone(),
            apps: developer.published_apps,
            joined: developer.joined_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "developer")]
    developer: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "downloads")]
    downloads: u64,
    #[tabled(rename = "rating")]
    rating: String,
    #[tabled(rename = "updated")]
    updated: String,
}

impl From<&AppRecord> for AppRow {
    fn from(app: &AppRecord) -> Self {
        Self {
            id: app.id.to_string(),
            name: app.name.clone(),
            developer: app.developer.to_string(),
            category: app.category.clone(),
            status: app.status.to_string(),
            downloads: app.downloads,
            rating: format!("{:.1}", app.average_rating()),
            updated: app.updated_at.format("%Y-%m-%d").to_string(),
        }
    }
}
