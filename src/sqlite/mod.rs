// ABOUTME: SQLite source database access for the cutover copy
// ABOUTME: Opens the source strictly read-only and tracks its data_version for quiescence

pub mod reader;
pub mod value;

pub use reader::{
    check_table_schema, count_rows, read_table_rows, read_table_rows_ordered, table_columns,
    SourceRow,
};
pub use value::SourceValue;

use crate::error::CutoverError;
use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Open the source database read-only.
///
/// The cutover never writes to the source; opening read-only enforces that at
/// the driver level. The file must already exist; SQLite would otherwise
/// happily create an empty database and the copy would "succeed" with zero
/// rows.
pub fn open_source(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        bail!(
            "Source database not found: {}\n\
             Pass the path to the backend's SQLite file (e.g. inventory.db)",
            path.display()
        );
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| CutoverError::Connection {
        store: "source",
        reason: format!("{} ({})", e, path.display()),
    })?;

    tracing::debug!("Opened source database read-only: {}", path.display());

    Ok(conn)
}

/// Current `PRAGMA data_version` of the source connection.
///
/// The value changes when any *other* connection commits to the database.
/// Capturing it before the first read and re-checking after the last read
/// detects a source that was not quiesced for the cutover window.
pub fn data_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
        .context("Failed to read source data_version")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_source_rejects_missing_file() {
        let err = open_source(Path::new("/nonexistent/inventory.db")).unwrap_err();
        assert!(err.to_string().contains("Source database not found"));
    }

    #[test]
    fn test_open_source_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let setup = Connection::open(&path).unwrap();
        setup
            .execute("CREATE TABLE users (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        drop(setup);

        let conn = open_source(&path).unwrap();
        let result = conn.execute("INSERT INTO users (id) VALUES (1)", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_data_version_changes_when_another_connection_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let writer = Connection::open(&path).unwrap();
        writer
            .execute("CREATE TABLE users (id INTEGER PRIMARY KEY)", [])
            .unwrap();

        let reader = open_source(&path).unwrap();
        let before = data_version(&reader).unwrap();

        // No external commit yet: version is stable.
        assert_eq!(before, data_version(&reader).unwrap());

        writer
            .execute("INSERT INTO users (id) VALUES (1)", [])
            .unwrap();

        let after = data_version(&reader).unwrap();
        assert_ne!(before, after);
    }
}
