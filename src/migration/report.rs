// ABOUTME: Per-table accounting for the cutover copy
// ABOUTME: Tracks rows read vs written and renders the operator-facing summary

/// Outcome of copying a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCopyReport {
    pub table: &'static str,
    pub rows_read: u64,
    pub rows_written: u64,
}

impl TableCopyReport {
    pub fn new(table: &'static str, rows_read: u64) -> Self {
        Self {
            table,
            rows_read,
            rows_written: 0,
        }
    }

    /// True when every row read from the source reached the destination.
    pub fn is_complete(&self) -> bool {
        self.rows_read == self.rows_written
    }
}

/// Accounting for a whole run, in table order.
///
/// The report is kept current while the copy runs so that a failed run can
/// still show, per table, how many rows were read vs written.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub tables: Vec<TableCopyReport>,
}

impl MigrationReport {
    pub fn total_read(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_read).sum()
    }

    pub fn total_written(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    /// True only when every table copied completely.
    pub fn is_complete(&self) -> bool {
        self.tables.iter().all(|t| t.is_complete())
    }

    /// Log the per-table read/written breakdown.
    pub fn log_summary(&self) {
        tracing::info!("");
        tracing::info!("========================================");
        tracing::info!("Cutover Copy Summary");
        tracing::info!("========================================");
        for entry in &self.tables {
            if entry.is_complete() {
                tracing::info!(
                    "  ✓ {}: {} read / {} written",
                    entry.table,
                    entry.rows_read,
                    entry.rows_written
                );
            } else {
                tracing::error!(
                    "  ✗ {}: {} read / {} written (INCOMPLETE)",
                    entry.table,
                    entry.rows_read,
                    entry.rows_written
                );
            }
        }
        tracing::info!("========================================");
        tracing::info!(
            "Total: {} rows read, {} rows written",
            self.total_read(),
            self.total_written()
        );
        tracing::info!("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_table_report() {
        let mut entry = TableCopyReport::new("users", 3);
        assert!(!entry.is_complete());
        entry.rows_written = 3;
        assert!(entry.is_complete());
    }

    #[test]
    fn test_empty_table_is_complete() {
        assert!(TableCopyReport::new("locations", 0).is_complete());
    }

    #[test]
    fn test_report_totals_and_completeness() {
        let mut report = MigrationReport::default();
        report.tables.push(TableCopyReport {
            table: "users",
            rows_read: 2,
            rows_written: 2,
        });
        report.tables.push(TableCopyReport {
            table: "items",
            rows_read: 5,
            rows_written: 3,
        });

        assert_eq!(report.total_read(), 7);
        assert_eq!(report.total_written(), 5);
        assert!(!report.is_complete());

        report.tables[1].rows_written = 5;
        assert!(report.is_complete());
    }
}
