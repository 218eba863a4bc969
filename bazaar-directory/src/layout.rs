//! Document tree layout.
//!
//! One JSON document per entity:
//! `<root>/users/<id>.json`, `<root>/developers/<id>.json`,
//! `<root>/apps/<id>.json`. All app statuses share one directory; status
//! lives inside the document and the feed filters on it per category.

use std::fs;
use std::path::{Path, PathBuf};

use bazaar_core::{Category, EntityId};

use crate::error::{io_err, DirectoryError};

/// Directory holding a category's documents.
pub fn category_dir(root: &Path, category: Category) -> PathBuf {
    match category {
        Category::Users => root.join("users"),
        Category::Developers => root.join("developers"),
        Category::Apps(_) => root.join("apps"),
    }
}

/// Path of one entity's document.
pub fn document_path(root: &Path, category: Category, id: &EntityId) -> PathBuf {
    category_dir(root, category).join(format!("{id}.json"))
}

/// Create the per-category directories under `root`.
pub fn ensure_layout(root: &Path) -> Result<(), DirectoryError> {
    for dir in ["users", "developers", "apps"] {
        let path = root.join(dir);
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }
    }
    Ok(())
}

/// Whether a path looks like an entity document.
pub(crate) fn is_json_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
