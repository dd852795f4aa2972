// ABOUTME: Typed error taxonomy for the cutover pipeline
// ABOUTME: Distinguishes connection, schema, row-transfer, and consistency failures

use thiserror::Error;

/// Failure classes surfaced to the operator.
///
/// Everything is fatal: there is no automatic retry of a run and no partial
/// success. A `RowTransfer` or `SourceModified` error always rolls back the
/// destination transaction, so the destination is never left half-written.
#[derive(Debug, Error)]
pub enum CutoverError {
    /// Either store was unreachable at start; raised before any write.
    #[error("failed to connect to the {store} database: {reason}")]
    Connection { store: &'static str, reason: String },

    /// A live table's columns differ from the static descriptor.
    #[error("schema mismatch in table '{table}': {detail}")]
    SchemaMismatch { table: &'static str, detail: String },

    /// A single row failed to insert on the destination.
    #[error("failed to insert row {row} of table '{table}': {reason}")]
    RowTransfer {
        table: &'static str,
        row: usize,
        reason: String,
    },

    /// Another connection committed to the source while the copy was running,
    /// so the snapshot is not consistent.
    #[error(
        "source database was modified during the copy (data_version {before} -> {after}); \
         quiesce writers and re-run"
    )]
    SourceModified { before: i64, after: i64 },
}
