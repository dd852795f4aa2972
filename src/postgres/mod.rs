// ABOUTME: PostgreSQL utilities module
// ABOUTME: Exports connection management and destination table operations

pub mod connection;
pub mod writer;

pub use connection::{connect, connect_with_retry};
pub use writer::{
    check_table_schema, count_rows, ensure_tables, reset_sequence, table_columns, table_exists,
};
