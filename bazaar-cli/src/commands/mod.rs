pub mod list;
pub mod seed;
pub mod show;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};

use bazaar_core::Category;

/// Resolve the catalog root: explicit flag or `~/.bazaar/catalog`.
pub(crate) fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = root {
        return Ok(root);
    }
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".bazaar").join("catalog"))
}

/// clap value parser for roster categories.
pub(crate) fn category_value(raw: &str) -> Result<Category, String> {
    raw.parse()
}
