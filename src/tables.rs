// ABOUTME: Static table descriptors for the inventory schema
// ABOUTME: Single source of truth for table names, columns, and generated SQL

/// Storage class of a column, shared by both stores.
///
/// The source schema only uses SQLite's INTEGER and TEXT classes; dates are
/// stored as ISO-8601 text and flags as 0/1 integers, and they are carried
/// over verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// A single column of a migrated table.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<&'static str>,
    pub references: Option<&'static str>,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Text,
        not_null: false,
        unique: false,
        default: None,
        references: None,
    }
}

const fn integer(name: &'static str) -> Column {
    Column {
        name,
        ty: ColumnType::Integer,
        not_null: false,
        unique: false,
        default: None,
        references: None,
    }
}

impl Column {
    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn default_to(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    const fn references(mut self, target: &'static str) -> Self {
        self.references = Some(target);
        self
    }
}

/// Descriptor for one table in the fixed migration set.
///
/// Table and column names are compile-time constants; no externally supplied
/// identifier is ever interpolated into generated SQL.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
}

impl TableSpec {
    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// SELECT statement reading every column from the source table, in the
    /// source store's default row order.
    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM \"{}\"", self.column_list(), self.name)
    }

    /// SELECT statement with a deterministic primary-key ordering, used for
    /// content verification.
    pub fn select_ordered_sql(&self) -> String {
        format!(
            "SELECT {} FROM \"{}\" ORDER BY \"{}\"",
            self.column_list(),
            self.name,
            self.primary_key
        )
    }

    /// Parameterized INSERT targeting the same column names on the
    /// destination, one positional parameter per value.
    pub fn insert_sql(&self) -> String {
        let placeholders: Vec<String> = (1..=self.columns.len())
            .map(|i| format!("${}", i))
            .collect();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.name,
            self.column_list(),
            placeholders.join(", ")
        )
    }

    /// DDL for the destination table. The auto-increment source key becomes
    /// SERIAL; every other column keeps its storage class and constraints.
    pub fn create_sql(&self) -> String {
        let mut defs = Vec::with_capacity(self.columns.len());
        for col in self.columns {
            if col.name == self.primary_key {
                defs.push(format!("\"{}\" SERIAL PRIMARY KEY", col.name));
                continue;
            }
            let mut def = format!(
                "\"{}\" {}",
                col.name,
                match col.ty {
                    ColumnType::Integer => "INTEGER",
                    ColumnType::Text => "TEXT",
                }
            );
            if col.unique {
                def.push_str(" UNIQUE");
            }
            if col.not_null {
                def.push_str(" NOT NULL");
            }
            if let Some(expr) = col.default {
                def.push_str(" DEFAULT ");
                def.push_str(expr);
            }
            if let Some(target) = col.references {
                def.push_str(" REFERENCES ");
                def.push_str(target);
            }
            defs.push(def);
        }
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            self.name,
            defs.join(", ")
        )
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The fixed, ordered migration set.
///
/// Parents precede children so that foreign keys on the destination are
/// satisfied by the time each table is copied.
pub const TABLES: &[TableSpec] = &[
    TableSpec {
        name: "users",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            text("username").unique().not_null(),
            text("password_hash").not_null(),
            text("full_name").not_null(),
            text("role").not_null(),
            integer("is_active").default_to("1"),
            text("created_date").not_null(),
            text("last_login"),
        ],
    },
    TableSpec {
        name: "items",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            text("name").not_null(),
            text("description"),
            text("category"),
            text("barcode").unique(),
            text("serial_number"),
            text("storage_location"),
            integer("is_checked_out").default_to("0"),
            text("checked_out_by"),
            text("checked_out_date"),
            text("image_url"),
            text("notes"),
            text("created_date").not_null(),
            text("last_modified_date").not_null(),
        ],
    },
    TableSpec {
        name: "item_requests",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            integer("requester_id").not_null().references("users(id)"),
            text("request_type").not_null(),
            text("item_name").not_null(),
            text("description").not_null(),
            integer("item_id").references("items(id)"),
            text("status").default_to("'pending'"),
            text("denial_reason"),
            text("created_date").not_null(),
            text("reviewed_date"),
            integer("reviewed_by_id").references("users(id)"),
        ],
    },
    TableSpec {
        name: "checkout_history",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            integer("item_id").not_null().references("items(id)"),
            text("action").not_null(),
            text("person_name").not_null(),
            text("timestamp").not_null(),
            text("notes"),
        ],
    },
    TableSpec {
        name: "categories",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            text("name").unique().not_null(),
            integer("created_by_id").not_null().references("users(id)"),
            text("created_date").not_null(),
        ],
    },
    TableSpec {
        name: "locations",
        primary_key: "id",
        columns: &[
            integer("id").not_null(),
            text("name").unique().not_null(),
            integer("created_by_id").not_null().references("users(id)"),
            text("created_date").not_null(),
        ],
    },
];

/// Look up a descriptor by table name.
pub fn find(name: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_set_is_complete_and_ordered() {
        let names: Vec<&str> = TABLES.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "users",
                "items",
                "item_requests",
                "checkout_history",
                "categories",
                "locations"
            ]
        );
    }

    #[test]
    fn test_every_table_leads_with_its_primary_key() {
        for table in TABLES {
            assert_eq!(table.columns[0].name, table.primary_key);
            assert_eq!(table.columns[0].ty, ColumnType::Integer);
        }
    }

    #[test]
    fn test_insert_sql_has_one_placeholder_per_column() {
        for table in TABLES {
            let sql = table.insert_sql();
            let last = format!("${}", table.columns.len());
            assert!(sql.contains(&last), "{} missing {}", table.name, last);
            assert!(!sql.contains(&format!("${}", table.columns.len() + 1)));
        }
    }

    #[test]
    fn test_create_sql_uses_serial_primary_key() {
        let sql = find("items").unwrap().create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"items\""));
        assert!(sql.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(sql.contains("\"barcode\" TEXT UNIQUE"));
        assert!(sql.contains("\"is_checked_out\" INTEGER DEFAULT 0"));
    }

    #[test]
    fn test_foreign_keys_reference_earlier_tables() {
        let mut seen: Vec<&str> = Vec::new();
        for table in TABLES {
            for col in table.columns {
                if let Some(target) = col.references {
                    let parent = target.split('(').next().unwrap();
                    assert!(
                        seen.contains(&parent),
                        "{}.{} references {} before it is migrated",
                        table.name,
                        col.name,
                        parent
                    );
                }
            }
            seen.push(table.name);
        }
    }

    #[test]
    fn test_find_rejects_unknown_tables() {
        assert!(find("users").is_some());
        assert!(find("sqlite_sequence").is_none());
        assert!(find("users; DROP TABLE users").is_none());
    }
}
