//! `bazaar seed` — write a deterministic sample catalog.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;
use serde::Serialize;

use bazaar_core::{AppRecord, AppStatus, Category, DeveloperRecord, EntityId, UserRecord};
use bazaar_directory::{document_path, ensure_layout};

use crate::commands::resolve_root;

/// Arguments for `bazaar seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Catalog root directory (defaults to `~/.bazaar/catalog`).
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl SeedArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.root)?;
        ensure_layout(&root).context("failed to create catalog layout")?;

        let users = sample_users();
        let developers = sample_developers();
        let apps = sample_apps();

        for user in &users {
            write_document(&root, Category::Users, &user.id, user)?;
        }
        for developer in &developers {
            write_document(&root, Category::Developers, &developer.id, developer)?;
        }
        for app in &apps {
            write_document(&root, Category::Apps(app.status), &app.id, app)?;
        }

        println!(
            "✓ seeded sample catalog at {} ({} users, {} developers, {} apps)",
            root.display(),
            users.len(),
            developers.len(),
            apps.len(),
        );
        Ok(())
    }
}

fn write_document<E: Serialize>(
    root: &Path,
    category: Category,
    id: &EntityId,
    record: &E,
) -> Result<()> {
    let path = document_path(root, category, id);
    let payload = serde_json::to_string_pretty(record)?;
    fs::write(&path, payload).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn sample_users() -> Vec<UserRecord> {
    vec![
        UserRecord {
            id: EntityId::from("u-amara"),
            name: "Amara Okafor".to_string(),
            handle: "amara".to_string(),
            email: Some("amara@example.com".to_string()),
            review_count: 12,
            joined_at: day(2024, 3, 11),
        },
        UserRecord {
            id: EntityId::from("u-bela"),
            name: "Bela Varga".to_string(),
            handle: "bela".to_string(),
            email: None,
            review_count: 3,
            joined_at: day(2025, 1, 2),
        },
        UserRecord {
            id: EntityId::from("u-chen"),
            name: "Chen Wei".to_string(),
            handle: "chen".to_string(),
            email: Some("chen@example.com".to_string()),
            review_count: 27,
            joined_at: day(2023, 7, 30),
        },
        UserRecord {
            id: EntityId::from("u-devi"),
            name: "Devi Nair".to_string(),
            handle: "devi".to_string(),
            email: None,
            review_count: 0,
            joined_at: day(2026, 2, 14),
        },
    ]
}

fn sample_developers() -> Vec<DeveloperRecord> {
    vec![
        DeveloperRecord {
            id: EntityId::from("d-nimbus"),
            name: "Nimbus Labs".to_string(),
            handle: "nimbus".to_string(),
            website: Some("https://nimbus.example".to_string()),
            published_apps: 2,
            joined_at: day(2023, 5, 4),
        },
        DeveloperRecord {
            id: EntityId::from("d-orchid"),
            name: "Orchid Works".to_string(),
            handle: "orchid".to_string(),
            website: None,
            published_apps: 0,
            joined_at: day(2025, 9, 21),
        },
    ]
}

fn sample_apps() -> Vec<AppRecord> {
    vec![
        AppRecord {
            id: EntityId::from("app-skylark"),
            name: "Skylark Weather".to_string(),
            developer: EntityId::from("d-nimbus"),
            category: "weather".to_string(),
            status: AppStatus::Published,
            downloads: 52_300,
            rating_sum: 412,
            rating_count: 100,
            updated_at: day(2026, 1, 18),
        },
        AppRecord {
            id: EntityId::from("app-ledgerly"),
            name: "Ledgerly".to_string(),
            developer: EntityId::from("d-nimbus"),
            category: "finance".to_string(),
            status: AppStatus::Published,
            downloads: 18_100,
            rating_sum: 260,
            rating_count: 61,
            updated_at: day(2026, 2, 2),
        },
        AppRecord {
            id: EntityId::from("app-pixelforge"),
            name: "PixelForge".to_string(),
            developer: EntityId::from("d-orchid"),
            category: "graphics".to_string(),
            status: AppStatus::Pending,
            downloads: 0,
            rating_sum: 0,
            rating_count: 0,
            updated_at: day(2026, 2, 20),
        },
        AppRecord {
            id: EntityId::from("app-quietude"),
            name: "Quietude".to_string(),
            developer: EntityId::from("d-orchid"),
            category: "wellness".to_string(),
            status: AppStatus::Rejected,
            downloads: 0,
            rating_sum: 0,
            rating_count: 0,
            updated_at: day(2025, 12, 9),
        },
        AppRecord {
            id: EntityId::from("app-gizmo"),
            name: "Gizmo Deals".to_string(),
            developer: EntityId::from("d-nimbus"),
            category: "shopping".to_string(),
            status: AppStatus::Suspended,
            downloads: 9_400,
            rating_sum: 31,
            rating_count: 14,
            updated_at: day(2025, 11, 27),
        },
    ]
}
