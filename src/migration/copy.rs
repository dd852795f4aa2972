// ABOUTME: The cutover driver - sequences source reads and destination writes per table
// ABOUTME: Runs the whole copy in one destination transaction with a quiescence guard

use crate::error::CutoverError;
use crate::migration::report::{MigrationReport, TableCopyReport};
use crate::tables::{self, TableSpec};
use crate::{postgres, sqlite};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Transaction};

/// Copy every table of the fixed set from the source to the destination.
///
/// The run is all-or-nothing: every insert and every sequence resync happens
/// inside a single destination transaction, committed once after the last
/// table. Any failure rolls the whole run back, so a partial cutover is never
/// left behind.
///
/// Preconditions enforced before the first write:
/// - every source table matches its descriptor (column-for-column),
/// - every destination table exists (created from the descriptors if missing)
///   and matches its descriptor,
/// - every destination table is empty, so a second run against an
///   already-migrated destination fails cleanly up front.
///
/// The source must be quiesced for the duration of the run. That is verified
/// with SQLite's `data_version`: if another connection commits between the
/// first and last read, the run aborts and rolls back.
pub async fn run(source: &Connection, target: &mut Client) -> Result<MigrationReport> {
    preflight(source, target).await?;

    let version_before = sqlite::data_version(source)?;

    let tx = target
        .transaction()
        .await
        .context("Failed to open destination transaction")?;

    let mut report = MigrationReport::default();

    if let Err(e) = copy_tables(source, &tx, &mut report).await {
        report.log_summary();
        return Err(e);
    }

    // All reads are done; make sure nobody wrote to the source meanwhile.
    let version_after = sqlite::data_version(source)?;
    if version_before != version_after {
        report.log_summary();
        // Dropping the transaction rolls the destination back.
        return Err(CutoverError::SourceModified {
            before: version_before,
            after: version_after,
        }
        .into());
    }

    tx.commit()
        .await
        .context("Failed to commit destination transaction")?;

    Ok(report)
}

async fn preflight(source: &Connection, target: &Client) -> Result<()> {
    for spec in tables::TABLES {
        sqlite::check_table_schema(source, spec)?;
    }

    postgres::ensure_tables(target, tables::TABLES).await?;
    for spec in tables::TABLES {
        postgres::check_table_schema(target, spec).await?;
    }

    let mut occupied = Vec::new();
    for spec in tables::TABLES {
        let count = postgres::count_rows(target, spec).await?;
        if count > 0 {
            occupied.push(format!("{} ({} rows)", spec.name, count));
        }
    }
    if !occupied.is_empty() {
        bail!(
            "Destination already contains data: {}.\n\
             This tool performs a one-shot cutover into empty tables.\n\
             Reset the destination tables and re-run.",
            occupied.join(", ")
        );
    }

    Ok(())
}

async fn copy_tables(
    source: &Connection,
    tx: &Transaction<'_>,
    report: &mut MigrationReport,
) -> Result<()> {
    for spec in tables::TABLES {
        tracing::info!("Copying table '{}'...", spec.name);

        let rows = sqlite::read_table_rows(source, spec)?;
        let mut entry = TableCopyReport::new(spec.name, rows.len() as u64);

        let result = copy_table(tx, spec, &rows, &mut entry).await;
        report.tables.push(entry);
        result?;

        postgres::reset_sequence(tx, spec).await?;
    }
    Ok(())
}

async fn copy_table(
    tx: &Transaction<'_>,
    spec: &TableSpec,
    rows: &[sqlite::SourceRow],
    entry: &mut TableCopyReport,
) -> Result<()> {
    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    progress.set_message(spec.name);

    let statement = tx
        .prepare(&spec.insert_sql())
        .await
        .with_context(|| format!("Failed to prepare insert for '{}'", spec.name))?;

    for (idx, row) in rows.iter().enumerate() {
        let params: Vec<&(dyn ToSql + Sync)> =
            row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        tx.execute(&statement, &params)
            .await
            .map_err(|e| CutoverError::RowTransfer {
                table: spec.name,
                row: idx + 1,
                reason: e.to_string(),
            })?;

        entry.rows_written += 1;
        progress.inc(1);
    }

    progress.finish_with_message(format!("{} copied", spec.name));
    tracing::info!(
        "✓ Table '{}': {} rows copied",
        spec.name,
        entry.rows_written
    );

    Ok(())
}
