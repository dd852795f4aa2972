// ABOUTME: Cross-store content verification using client-side checksums
// ABOUTME: Hashes primary-key-ordered rows identically on both sides and compares

use crate::sqlite;
use crate::tables::TableSpec;
use anyhow::{Context, Result};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tokio_postgres::Client;

/// Result of comparing one table between the two stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableComparison {
    pub table: &'static str,
    pub source_digest: String,
    pub target_digest: String,
    pub source_rows: u64,
    pub target_rows: u64,
}

impl TableComparison {
    /// Returns true if both digests and row counts match
    pub fn is_match(&self) -> bool {
        self.source_digest == self.target_digest && self.source_rows == self.target_rows
    }
}

/// Checksum of a source table's content.
///
/// Rows are ordered by primary key and every value is rendered in its
/// canonical text form ([`sqlite::SourceValue::normalized`]), columns joined
/// with `|` and rows with a newline, then hashed with SHA-256. The
/// destination side renders through `column::text` the same way, so equal
/// content yields equal digests. The two stores share no SQL dialect for a
/// server-side checksum, hence the client-side hash.
pub fn source_table_digest(conn: &Connection, table: &TableSpec) -> Result<(String, u64)> {
    let rows = sqlite::read_table_rows_ordered(conn, table)?;

    let mut hasher = Sha256::new();
    for row in &rows {
        let line: Vec<String> = row.iter().map(|v| v.normalized()).collect();
        hasher.update(line.join("|").as_bytes());
        hasher.update(b"\n");
    }

    Ok((finish_digest(hasher, rows.len()), rows.len() as u64))
}

/// Checksum of a destination table's content, built the same way.
pub async fn target_table_digest(client: &Client, table: &TableSpec) -> Result<(String, u64)> {
    let exprs: Vec<String> = table
        .columns
        .iter()
        .map(|col| format!("COALESCE(\"{}\"::text, '')", col.name))
        .collect();
    let sql = format!(
        "SELECT {} FROM \"{}\" ORDER BY \"{}\"",
        exprs.join(", "),
        table.name,
        table.primary_key
    );

    let rows = client
        .query(&sql, &[])
        .await
        .with_context(|| format!("Failed to read destination table '{}'", table.name))?;

    let mut hasher = Sha256::new();
    for row in &rows {
        let line: Vec<String> = (0..table.columns.len())
            .map(|idx| row.get::<_, String>(idx))
            .collect();
        hasher.update(line.join("|").as_bytes());
        hasher.update(b"\n");
    }

    Ok((finish_digest(hasher, rows.len()), rows.len() as u64))
}

/// Compare a table between the source and the destination.
pub async fn compare_table(
    source: &Connection,
    target: &Client,
    table: &TableSpec,
) -> Result<TableComparison> {
    tracing::debug!("Comparing table '{}'", table.name);

    let (source_digest, source_rows) = source_table_digest(source, table)?;
    let (target_digest, target_rows) = target_table_digest(target, table).await?;

    Ok(TableComparison {
        table: table.name,
        source_digest,
        target_digest,
        source_rows,
        target_rows,
    })
}

fn finish_digest(hasher: Sha256, row_count: usize) -> String {
    // An empty table hashes to a fixed marker, like an empty pg checksum.
    if row_count == 0 {
        "empty".to_string()
    } else {
        format!("{:x}", hasher.finalize())
    }
}
