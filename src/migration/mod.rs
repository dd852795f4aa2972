// ABOUTME: Migration utilities module
// ABOUTME: Exports the cutover driver, per-table reporting, and content verification

pub mod checksum;
pub mod copy;
pub mod report;

pub use checksum::{compare_table, source_table_digest, target_table_digest, TableComparison};
pub use copy::run;
pub use report::{MigrationReport, TableCopyReport};
