//! CLI integration tests
//!
//! Drive the built binary against a temporary database file.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_relmap-cli");
    Command::new(cli_bin)
        .current_dir(dir)
        .env_remove("RELMAP_DB_PATH")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn migrated_db(temp_dir: &TempDir) -> PathBuf {
    let db_path = temp_dir.path().join("store.db");
    let output = run(
        temp_dir.path(),
        &["migrate", "--db", db_path.to_str().unwrap()],
    );
    assert_success(&output);
    db_path
}

fn saved_id(output: &Output) -> String {
    let json: serde_json::Value = serde_json::from_str(&stdout(output)).unwrap();
    json["id"].as_str().unwrap().to_string()
}

#[test]
fn test_cli_migrate_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated_db(&temp_dir);

    let output = run(temp_dir.path(), &["migrate", "--db", db_path.to_str().unwrap()]);

    assert_success(&output);
    assert!(stdout(&output).contains("Applied 0 migration(s)"));
}

#[test]
fn test_cli_save_show_round_trip() {
    // Given: a migrated database
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated_db(&temp_dir);
    let db = db_path.to_str().unwrap();

    // When: a document with a summary is saved
    let output = run(
        temp_dir.path(),
        &["save", "--title", "test", "--summary", "short", "--db", db],
    );
    assert_success(&output);
    let id = saved_id(&output);

    // Then: show returns it with the generated summary id
    let output = run(temp_dir.path(), &["show", &id, "--db", db]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["title"], "test");
    assert_eq!(json["summary"]["text"], "short");
    assert!(json["summary"]["id"].is_i64());

    // And: the child row carries the document id
    let conn = Connection::open(&db_path).unwrap();
    let fk: String = conn
        .query_row("SELECT document_id FROM summary", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, id);
}

#[test]
fn test_cli_count_list_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated_db(&temp_dir);
    let db = db_path.to_str().unwrap();

    let first = run(temp_dir.path(), &["save", "--title", "one", "--db", db]);
    assert_success(&first);
    let second = run(temp_dir.path(), &["save", "--title", "two", "--db", db]);
    assert_success(&second);

    let output = run(temp_dir.path(), &["count", "--db", db]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "2");

    let output = run(temp_dir.path(), &["list", "--db", db]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);

    let id = saved_id(&first);
    let output = run(temp_dir.path(), &["delete", &id, "--db", db]);
    assert_success(&output);

    let output = run(temp_dir.path(), &["count", "--db", db]);
    assert_eq!(stdout(&output).trim(), "1");
}

#[test]
fn test_cli_show_unknown_document_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = migrated_db(&temp_dir);

    let output = run(
        temp_dir.path(),
        &[
            "show",
            "00000000-0000-4000-8000-000000000000",
            "--db",
            db_path.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_cli_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("relmap.toml");
    std::fs::write(&config_path, "path = \"data/configured.db\"\n").unwrap();

    let output = run(
        temp_dir.path(),
        &["migrate", "--config", config_path.to_str().unwrap()],
    );

    assert_success(&output);
    assert!(temp_dir.path().join("data").join("configured.db").exists());
}

#[test]
fn test_cli_defaults_to_local_store() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["migrate"]);

    assert_success(&output);
    assert!(temp_dir.path().join(".relmap").join("store.db").exists());
}
