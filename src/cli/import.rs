use anyhow::{Context, Result};
use std::path::Path;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::db::migrations::STORE_FORMAT;
use gabu_tutor::store::Store;

use super::export::ExportData;

/// Import documents from an export file. Existing documents with the same
/// key are replaced; everything else is left alone.
pub fn import(config: &TutorConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;
    anyhow::ensure!(
        data.format == STORE_FORMAT,
        "unsupported export format {:?} (expected {STORE_FORMAT})",
        data.format
    );

    let conn = gabu_tutor::db::open_database(config.resolved_db_path())?;
    let store = Store::new(conn);

    println!("Importing {} documents...", data.documents.len());
    let imported = store.import_all(&data.documents)?;
    println!("Import complete: {imported} documents written.");
    Ok(())
}
