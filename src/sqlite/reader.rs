// ABOUTME: Read-only access to the source SQLite database
// ABOUTME: Enumerates table rows and checks live schema against the static descriptors

use crate::error::CutoverError;
use crate::sqlite::value::SourceValue;
use crate::tables::TableSpec;
use anyhow::{Context, Result};
use rusqlite::Connection;

/// A row read verbatim from the source, one value per descriptor column.
pub type SourceRow = Vec<SourceValue>;

/// Column names of a live source table, in declaration order.
pub fn table_columns(conn: &Connection, table: &TableSpec) -> Result<Vec<String>> {
    let sql = format!("PRAGMA table_info(\"{}\")", table.name);
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("Failed to inspect source table '{}'", table.name))?;

    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<String>>>()
        .with_context(|| format!("Failed to read column list for '{}'", table.name))?;

    Ok(columns)
}

/// Check a live source table against its static descriptor.
///
/// The copy is positional, so the live column list must match the descriptor
/// exactly, including order. A missing table reports as a mismatch too.
pub fn check_table_schema(conn: &Connection, table: &TableSpec) -> Result<()> {
    let live = table_columns(conn, table)?;

    if live.is_empty() {
        return Err(CutoverError::SchemaMismatch {
            table: table.name,
            detail: "table does not exist in the source database".to_string(),
        }
        .into());
    }

    let expected = table.column_names();
    if live != expected {
        return Err(CutoverError::SchemaMismatch {
            table: table.name,
            detail: format!(
                "source columns [{}] do not match expected [{}]",
                live.join(", "),
                expected.join(", ")
            ),
        }
        .into());
    }

    Ok(())
}

/// Exact row count of a source table.
pub fn count_rows(conn: &Connection, table: &TableSpec) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name);
    conn.query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("Failed to count rows in source table '{}'", table.name))
}

/// Read every row of a source table, in the store's default row order.
///
/// Rows are held in memory for the duration of the copy; the source tables
/// are small enough (single-site inventory) that this is fine.
pub fn read_table_rows(conn: &Connection, table: &TableSpec) -> Result<Vec<SourceRow>> {
    read_rows(conn, table, &table.select_sql())
}

/// Read every row ordered by primary key, for deterministic checksums.
pub fn read_table_rows_ordered(conn: &Connection, table: &TableSpec) -> Result<Vec<SourceRow>> {
    read_rows(conn, table, &table.select_ordered_sql())
}

fn read_rows(conn: &Connection, table: &TableSpec, sql: &str) -> Result<Vec<SourceRow>> {
    tracing::debug!("Reading all rows from source table '{}'", table.name);

    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("Failed to query source table '{}'", table.name))?;
    let column_count = stmt.column_count();

    let mut rows = Vec::new();
    let mut results = stmt
        .query([])
        .with_context(|| format!("Failed to read source table '{}'", table.name))?;

    while let Some(row) = results
        .next()
        .with_context(|| format!("Failed to read row from source table '{}'", table.name))?
    {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(SourceValue::from(row.get_ref(idx)?));
        }
        rows.push(values);
    }

    tracing::debug!("Read {} rows from source table '{}'", rows.len(), table.name);

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT,
                barcode TEXT UNIQUE,
                serial_number TEXT,
                storage_location TEXT,
                is_checked_out INTEGER DEFAULT 0,
                checked_out_by TEXT,
                checked_out_date TEXT,
                image_url TEXT,
                notes TEXT,
                created_date TEXT NOT NULL,
                last_modified_date TEXT NOT NULL
            );
            INSERT INTO items (name, barcode, is_checked_out, created_date, last_modified_date)
            VALUES ('Hammer', 'TOOL-001', 0, '2026-01-02T10:00:00', '2026-01-02T10:00:00');
            INSERT INTO items (name, barcode, is_checked_out, created_date, last_modified_date)
            VALUES ('Wrench', 'TOOL-002', 1, '2026-01-03T11:30:00', '2026-01-03T11:30:00');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_table_columns_match_descriptor() {
        let conn = fixture();
        let spec = tables::find("items").unwrap();
        assert_eq!(table_columns(&conn, spec).unwrap(), spec.column_names());
        assert!(check_table_schema(&conn, spec).is_ok());
    }

    #[test]
    fn test_missing_table_is_a_schema_mismatch() {
        let conn = fixture();
        let spec = tables::find("users").unwrap();
        let err = check_table_schema(&conn, spec).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_column_drift_is_a_schema_mismatch() {
        let conn = fixture();
        conn.execute("ALTER TABLE items ADD COLUMN surprise TEXT", [])
            .unwrap();
        let spec = tables::find("items").unwrap();
        let err = check_table_schema(&conn, spec).unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn test_read_table_rows_preserves_content() {
        let conn = fixture();
        let spec = tables::find("items").unwrap();

        assert_eq!(count_rows(&conn, spec).unwrap(), 2);

        let rows = read_table_rows(&conn, spec).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], SourceValue::Integer(1));
        assert_eq!(rows[0][1], SourceValue::Text("Hammer".to_string()));
        assert_eq!(rows[0][2], SourceValue::Null);
        assert_eq!(rows[1][1], SourceValue::Text("Wrench".to_string()));
        assert_eq!(rows[1][7], SourceValue::Integer(1));
    }

    #[test]
    fn test_empty_table_reads_as_empty() {
        let conn = fixture();
        conn.execute("DELETE FROM items", []).unwrap();
        let spec = tables::find("items").unwrap();
        assert!(read_table_rows(&conn, spec).unwrap().is_empty());
        assert_eq!(count_rows(&conn, spec).unwrap(), 0);
    }
}
