//! Typed JSON document repository.
//!
//! [`Store`] is the persistence seam every service holds a handle to. Each
//! document lives under a namespaced string key in the `kv_store` table.
//! Reads never fail on bad data: a document that no longer deserializes is
//! logged and treated as missing so callers fall back to their defaults.

pub mod keys;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to the document store. Cloning is cheap and every clone
/// sees the same connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// In-memory store with the schema applied. Used by tests and dry runs.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(crate::db::open_memory_database()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))
    }

    /// Raw JSON text stored under `key`.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to read key {key}"))?;
        Ok(value)
    }

    /// Store raw text under `key` without validating it.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .with_context(|| format!("failed to write key {key}"))?;
        Ok(())
    }

    /// Deserialize the document under `key`. Corrupt JSON is logged and
    /// reported as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable document");
                Ok(None)
            }
        }
    }

    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.get(key)?.unwrap_or_default())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize document for {key}"))?;
        self.set_raw(key, &json)?;
        tracing::debug!(key, bytes = json.len(), "document written");
        Ok(())
    }

    /// Delete the document under `key`. Returns `true` if something was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let pattern = format!("{}%", escape_like(prefix));
        let mut stmt =
            conn.prepare("SELECT key FROM kv_store WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")?;
        let keys = stmt
            .query_map(params![pattern], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Every document as parsed JSON. Documents that fail to parse are kept
    /// as JSON strings so an export never silently drops data.
    pub fn export_all(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, value FROM kv_store ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(key, raw)| {
                let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
                (key, value)
            })
            .collect())
    }

    /// Write every document in `documents`, replacing existing keys.
    /// Returns the number of documents written.
    pub fn import_all(&self, documents: &BTreeMap<String, serde_json::Value>) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in documents {
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value.to_string(), now],
            )?;
        }
        tx.commit()?;
        Ok(documents.len())
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Doc {
        title: String,
        created_at: DateTime<Utc>,
        tags: Vec<String>,
    }

    #[test]
    fn round_trip_preserves_document() {
        let store = Store::in_memory().unwrap();
        let doc = Doc {
            title: "Fractions".into(),
            created_at: "2026-03-01T10:15:30.123Z".parse().unwrap(),
            tags: vec!["math".into()],
        };

        store.set("doc", &doc).unwrap();
        let back: Doc = store.get("doc").unwrap().unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn corrupt_json_reads_as_missing() {
        let store = Store::in_memory().unwrap();
        store.set_raw("gabu-progress", "{not json").unwrap();

        let value: Option<Doc> = store.get("gabu-progress").unwrap();
        assert!(value.is_none());

        let list: Vec<String> = store.get_or_default("gabu-progress").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let store = Store::in_memory().unwrap();
        let value: Option<Vec<String>> = store.get("nope").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let store = Store::in_memory().unwrap();
        store.set("a", &1).unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
    }

    #[test]
    fn prefix_listing_matches_only_prefix() {
        let store = Store::in_memory().unwrap();
        store.set("gabu-offline-notes", &1).unwrap();
        store.set("gabu-offline-quiz", &2).unwrap();
        store.set("gabu-offlineXnotes", &3).unwrap();
        store.set("gabu-progress", &4).unwrap();

        let keys = store.keys_with_prefix("gabu-offline-").unwrap();
        assert_eq!(keys, vec!["gabu-offline-notes", "gabu-offline-quiz"]);
    }

    #[test]
    fn export_then_import_restores_documents() {
        let source = Store::in_memory().unwrap();
        source.set("gabu-recent-topics", &vec!["Fractions"]).unwrap();
        source.set("gabu-settings", &serde_json::json!({"name": "Ana"})).unwrap();

        let dump = source.export_all().unwrap();
        let target = Store::in_memory().unwrap();
        assert_eq!(target.import_all(&dump).unwrap(), 2);

        let topics: Vec<String> = target.get("gabu-recent-topics").unwrap().unwrap();
        assert_eq!(topics, vec!["Fractions"]);
    }
}
