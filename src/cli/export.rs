use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::db::migrations::STORE_FORMAT;
use gabu_tutor::store::Store;

/// Export format: every stored document keyed by its storage key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub format: String,
    pub exported_at: DateTime<Utc>,
    pub documents: BTreeMap<String, serde_json::Value>,
}

/// Export all documents as JSON to stdout.
pub fn export(config: &TutorConfig) -> Result<()> {
    let conn = gabu_tutor::db::open_database(config.resolved_db_path())?;
    let store = Store::new(conn);

    let data = ExportData {
        format: STORE_FORMAT.to_string(),
        exported_at: Utc::now(),
        documents: store.export_all()?,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!("Exported {} documents.", data.documents.len());
    Ok(())
}
