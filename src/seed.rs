use anyhow::Context;
use std::path::Path;
use tracing::info;

use crate::config::Args;
use crate::importer::{self, ImportReport, Upload};
use crate::models::{EntityKind, User};
use crate::store::Store;

// Create users from comma-separated names "alice, bob"
pub async fn seed_users(store: &Store, names: &str) -> anyhow::Result<Vec<User>> {
    let mut users = Vec::new();
    for name in names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let user = store
            .create_user(name)
            .await
            .with_context(|| format!("seeding user '{name}'"))?;
        users.push(user);
    }
    Ok(users)
}

pub async fn seed_products(store: &Store, path: &Path) -> anyhow::Result<ImportReport> {
    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path.to_string_lossy();

    let report = importer::import(
        store,
        EntityKind::Product,
        Upload {
            file_name: &file_name,
            body: &body,
            encoding: None,
        },
    )
    .await
    .with_context(|| format!("importing products from {}", path.display()))?;

    Ok(report)
}

pub async fn run(store: &Store, args: &Args) -> anyhow::Result<()> {
    let users = seed_users(store, &args.seed_users).await?;
    if !users.is_empty() {
        info!(count = users.len(), "seeded users");
    }

    if let Some(path) = &args.seed_products {
        let report = seed_products(store, path).await?;
        info!(count = report.count(), path = %path.display(), "seeded products");
    }

    Ok(())
}
