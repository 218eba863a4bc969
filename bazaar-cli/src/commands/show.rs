//! `bazaar show` — fetch and print one entity record.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;

use bazaar_core::{AppRecord, Category, DeveloperRecord, EntityId, UserRecord};
use bazaar_directory::DocumentFetcher;
use bazaar_roster::DetailFetcher;

use crate::commands::{category_value, resolve_root};

/// Arguments for `bazaar show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Roster category (users, developers, apps:<status>).
    #[arg(value_parser = category_value)]
    pub category: Category,

    /// Entity identifier.
    pub id: String,

    /// Catalog root directory (defaults to `~/.bazaar/catalog`).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl ShowArgs {
    pub async fn run(self) -> Result<()> {
        let root = resolve_root(self.root.clone())?;
        let id = EntityId::from(self.id.as_str());

        match self.category {
            Category::Users => {
                print_record::<UserRecord>(DocumentFetcher::users(&root), &self.category, &id)
                    .await
            }
            Category::Developers => {
                print_record::<DeveloperRecord>(
                    DocumentFetcher::developers(&root),
                    &self.category,
                    &id,
                )
                .await
            }
            Category::Apps(_) => {
                print_record::<AppRecord>(DocumentFetcher::apps(&root), &self.category, &id).await
            }
        }
    }
}

async fn print_record<E>(
    fetcher: DocumentFetcher<E>,
    category: &Category,
    id: &EntityId,
) -> Result<()>
where
    E: Serialize + DeserializeOwned + Send + Sync,
{
    let record = fetcher
        .fetch(id)
        .await
        .with_context(|| format!("failed to fetch {category} record '{id}'"))?;
    let Some(record) = record else {
        bail!("no {category} record for '{id}'");
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
