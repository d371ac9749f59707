use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "parkour.sqlite3";
/// Key of the single dashboard blob in `local_state`.
pub const STORAGE_KEY: &str = "parkour-vicosa-storage";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS local_state(
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL
        )",
        [],
    )?;
    // Workspaces created before the blob carried a timestamp lack this column.
    ensure_local_state_updated_at(&conn)?;

    Ok(conn)
}

pub fn open_remote_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS instructors(
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state(
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn)
}

pub fn load_blob(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT data FROM local_state WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match raw {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

pub fn save_blob(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    let text = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO local_state(key, data, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        (key, &text, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

fn ensure_local_state_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "local_state", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE local_state ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let p = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn blob_roundtrip_and_overwrite() {
        let ws = temp_dir("parkourd-db");
        let conn = open_db(&ws).expect("open db");
        assert!(load_blob(&conn, STORAGE_KEY).unwrap().is_none());
        save_blob(&conn, STORAGE_KEY, &serde_json::json!({ "students": [] })).unwrap();
        save_blob(&conn, STORAGE_KEY, &serde_json::json!({ "students": [1] })).unwrap();
        let v = load_blob(&conn, STORAGE_KEY).unwrap().expect("blob");
        assert_eq!(v["students"], serde_json::json!([1]));
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn old_local_state_table_gains_updated_at() {
        let ws = temp_dir("parkourd-db-migrate");
        {
            let conn = Connection::open(ws.join(DB_FILE)).unwrap();
            conn.execute(
                "CREATE TABLE local_state(key TEXT PRIMARY KEY, data TEXT NOT NULL)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO local_state(key, data) VALUES('parkour-vicosa-storage', '{}')",
                [],
            )
            .unwrap();
        }
        let conn = open_db(&ws).expect("reopen");
        assert!(table_has_column(&conn, "local_state", "updated_at").unwrap());
        assert_eq!(
            load_blob(&conn, STORAGE_KEY).unwrap(),
            Some(serde_json::json!({}))
        );
        let _ = std::fs::remove_dir_all(ws);
    }
}
