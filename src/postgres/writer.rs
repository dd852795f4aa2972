// ABOUTME: Destination-side table management for the cutover copy
// ABOUTME: Creates tables, inspects live schema, and resynchronizes key sequences

use crate::error::CutoverError;
use crate::tables::TableSpec;
use anyhow::{Context, Result};
use tokio_postgres::{Client, Transaction};

/// Create every destination table that does not exist yet.
///
/// The DDL comes from the static descriptors (`CREATE TABLE IF NOT EXISTS`),
/// so a destination that was already provisioned by other tooling is left
/// untouched.
pub async fn ensure_tables(client: &Client, specs: &[TableSpec]) -> Result<()> {
    for spec in specs {
        client
            .execute(&spec.create_sql(), &[])
            .await
            .with_context(|| format!("Failed to create destination table '{}'", spec.name))?;
    }
    Ok(())
}

/// Whether a table exists in the destination's public schema.
pub async fn table_exists(client: &Client, name: &str) -> Result<bool> {
    let row = client
        .query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )",
            &[&name],
        )
        .await
        .with_context(|| format!("Failed to check destination table '{}'", name))?;
    Ok(row.get(0))
}

/// Column names of a live destination table, in ordinal order.
pub async fn table_columns(client: &Client, table: &TableSpec) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT column_name
             FROM information_schema.columns
             WHERE table_schema = 'public' AND table_name = $1
             ORDER BY ordinal_position",
            &[&table.name],
        )
        .await
        .with_context(|| format!("Failed to read columns of destination '{}'", table.name))?;

    Ok(rows.iter().map(|row| row.get(0)).collect())
}

/// Check a live destination table against its static descriptor.
pub async fn check_table_schema(client: &Client, table: &TableSpec) -> Result<()> {
    let live = table_columns(client, table).await?;
    let expected = table.column_names();

    if live != expected {
        return Err(CutoverError::SchemaMismatch {
            table: table.name,
            detail: format!(
                "destination columns [{}] do not match expected [{}]",
                live.join(", "),
                expected.join(", ")
            ),
        }
        .into());
    }

    Ok(())
}

/// Exact row count of a destination table.
pub async fn count_rows(client: &Client, table: &TableSpec) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name);
    let row = client
        .query_one(&sql, &[])
        .await
        .with_context(|| format!("Failed to count rows in destination '{}'", table.name))?;
    Ok(row.get(0))
}

/// Advance a table's serial sequence past the largest migrated key.
///
/// Rows are inserted with their source primary keys, which does not touch the
/// destination's sequence; without this step the first post-cutover insert
/// would collide with a migrated key.
pub async fn reset_sequence(tx: &Transaction<'_>, table: &TableSpec) -> Result<()> {
    let sql = format!(
        "SELECT setval(
            pg_get_serial_sequence('\"{table}\"', '{key}'),
            COALESCE((SELECT MAX(\"{key}\") FROM \"{table}\"), 0) + 1,
            false
        )",
        table = table.name,
        key = table.primary_key
    );

    tx.query_one(&sql, &[])
        .await
        .with_context(|| format!("Failed to resync key sequence for '{}'", table.name))?;

    tracing::debug!("Resynced key sequence for '{}'", table.name);
    Ok(())
}
