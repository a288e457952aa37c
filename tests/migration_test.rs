mod helpers;

use gabu_tutor::db;
use gabu_tutor::db::migrations::{
    get_schema_version, get_store_format, run_migrations, CURRENT_SCHEMA_VERSION, STORE_FORMAT,
};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = db::open_memory_database().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migration_records_store_format() {
    let conn = db::open_memory_database().unwrap();
    assert_eq!(get_store_format(&conn).unwrap(), Some(STORE_FORMAT.to_string()));
}

#[test]
fn migrations_are_idempotent() {
    let conn = db::open_memory_database().unwrap();
    // Running again should be a no-op
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    // A v1 database that hasn't been migrated
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(get_store_format(&conn).unwrap().is_none());

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(get_store_format(&conn).unwrap().is_some());
}

#[test]
fn v1_documents_survive_upgrade() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES ('gabu-settings', ?1, '2026-01-01T00:00:00Z')",
        [r#"{"name":"Ada","gradeLevel":"5th grade"}"#],
    )
    .unwrap();

    run_migrations(&conn).unwrap();

    let store = gabu_tutor::store::Store::new(conn);
    let settings: gabu_tutor::settings::UserSettings =
        store.get("gabu-settings").unwrap().unwrap();
    assert_eq!(settings.name, "Ada");
    assert_eq!(settings.grade_level, "5th grade");
    // fields missing from the old document take their defaults
    assert_eq!(settings.language, "English");
}
