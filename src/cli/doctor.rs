//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use gabu_tutor::config::TutorConfig;
use gabu_tutor::db;
use gabu_tutor::store::{keys, Store};

/// Run database diagnostics and print a health report.
pub fn doctor(config: &TutorConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("Gabu Health Report");
    println!("==================");
    println!();
    println!("AI model:          {}", config.ai.model);
    println!(
        "API key:           {}",
        if config.ai.api_key.is_some() { "configured" } else { "MISSING (set GEMINI_API_KEY)" }
    );
    println!();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run any command, e.g. `gabu progress`, to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!(
        "Store format:      {}",
        report.store_format.as_deref().unwrap_or("(not set)")
    );
    println!("Documents:         {}", report.document_count);

    let store = Store::new(conn);
    let unreadable: Vec<&str> = [
        keys::SETTINGS,
        keys::PROGRESS,
        keys::BOOKMARKS,
        keys::STUDY_SESSIONS,
        keys::LEARNING_PROFILE,
        keys::REMINDERS,
    ]
    .into_iter()
    .filter(|key| {
        matches!(store.get_raw(key), Ok(Some(raw)) if serde_json::from_str::<serde_json::Value>(&raw).is_err())
    })
    .collect();
    println!();
    if unreadable.is_empty() {
        println!("Documents:         all readable");
    } else {
        println!("Corrupt documents: {} (defaults will be used)", unreadable.join(", "));
    }

    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.gabu/tutor.db");
        println!("  2. Or export from a good copy and reimport:");
        println!("     gabu export > backup.json");
        println!("     gabu import backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
