// ABOUTME: Owned SQLite value type bridging rusqlite rows to tokio-postgres parameters
// ABOUTME: Binds each source value to the destination insert with no lossy transformation

use bytes::BytesMut;
use rusqlite::types::ValueRef;
use std::fmt::Write as _;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};

/// A single source value, held transiently between the read and the write.
///
/// Mirrors SQLite's five storage classes. Values are reinserted verbatim; the
/// only adaptation is widening integers to whatever integer width the
/// destination column declares.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for SourceValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SourceValue::Null,
            ValueRef::Integer(i) => SourceValue::Integer(i),
            ValueRef::Real(f) => SourceValue::Real(f),
            ValueRef::Text(t) => SourceValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SourceValue::Blob(b.to_vec()),
        }
    }
}

impl SourceValue {
    /// Canonical text form used for content checksums.
    ///
    /// Matches PostgreSQL's `COALESCE(column::text, '')` rendering of the
    /// same value after migration, so the two sides hash identically.
    pub fn normalized(&self) -> String {
        match self {
            SourceValue::Null => String::new(),
            SourceValue::Integer(i) => i.to_string(),
            SourceValue::Real(f) => f.to_string(),
            SourceValue::Text(t) => t.clone(),
            SourceValue::Blob(b) => {
                let mut out = String::with_capacity(2 + b.len() * 2);
                out.push_str("\\x");
                for byte in b {
                    let _ = write!(out, "{:02x}", byte);
                }
                out
            }
        }
    }
}

impl ToSql for SourceValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SourceValue::Null => Ok(IsNull::Yes),
            SourceValue::Integer(i) => {
                if *ty == Type::INT8 {
                    i.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::BOOL {
                    (*i != 0).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*i as f64).to_sql(ty, out)
                } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
                    i.to_string().to_sql(ty, out)
                } else {
                    Err(format!("cannot bind SQLite integer to PostgreSQL type {}", ty).into())
                }
            }
            SourceValue::Real(f) => {
                if *ty == Type::FLOAT8 {
                    f.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else if *ty == Type::TEXT || *ty == Type::VARCHAR {
                    f.to_string().to_sql(ty, out)
                } else {
                    Err(format!("cannot bind SQLite real to PostgreSQL type {}", ty).into())
                }
            }
            SourceValue::Text(t) => {
                if *ty == Type::TEXT || *ty == Type::VARCHAR {
                    t.to_sql(ty, out)
                } else {
                    Err(format!("cannot bind SQLite text to PostgreSQL type {}", ty).into())
                }
            }
            SourceValue::Blob(b) => {
                if *ty == Type::BYTEA {
                    b.to_sql(ty, out)
                } else {
                    Err(format!("cannot bind SQLite blob to PostgreSQL type {}", ty).into())
                }
            }
        }
    }

    fn accepts(ty: &Type) -> bool {
        // Type constants are not usable in pattern position; match on names.
        matches!(
            ty.name(),
            "bool" | "int2" | "int4" | "int8" | "float4" | "float8" | "text" | "varchar" | "bytea"
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_ref() {
        assert_eq!(SourceValue::from(ValueRef::Null), SourceValue::Null);
        assert_eq!(
            SourceValue::from(ValueRef::Integer(7)),
            SourceValue::Integer(7)
        );
        assert_eq!(
            SourceValue::from(ValueRef::Text(b"Hammer")),
            SourceValue::Text("Hammer".to_string())
        );
        assert_eq!(
            SourceValue::from(ValueRef::Blob(&[0xde, 0xad])),
            SourceValue::Blob(vec![0xde, 0xad])
        );
    }

    #[test]
    fn test_normalized_null_matches_coalesce() {
        assert_eq!(SourceValue::Null.normalized(), "");
    }

    #[test]
    fn test_normalized_scalars() {
        assert_eq!(SourceValue::Integer(42).normalized(), "42");
        assert_eq!(
            SourceValue::Text("Wrench".to_string()).normalized(),
            "Wrench"
        );
        assert_eq!(
            SourceValue::Blob(vec![0xde, 0xad, 0xbe, 0xef]).normalized(),
            "\\xdeadbeef"
        );
    }

    #[test]
    fn test_accepts_integer_and_text_types() {
        assert!(<SourceValue as ToSql>::accepts(&Type::INT4));
        assert!(<SourceValue as ToSql>::accepts(&Type::TEXT));
        assert!(!<SourceValue as ToSql>::accepts(&Type::TIMESTAMPTZ));
    }

    #[test]
    fn test_integer_widening_to_sql() {
        let mut buf = BytesMut::new();
        let value = SourceValue::Integer(1);
        assert!(matches!(
            value.to_sql(&Type::INT4, &mut buf).unwrap(),
            IsNull::No
        ));
        assert_eq!(&buf[..], &1i32.to_be_bytes()[..]);
    }

    #[test]
    fn test_out_of_range_integer_is_an_error() {
        let mut buf = BytesMut::new();
        let value = SourceValue::Integer(i64::MAX);
        assert!(value.to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn test_null_binds_as_null() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            SourceValue::Null.to_sql(&Type::TEXT, &mut buf).unwrap(),
            IsNull::Yes
        ));
    }
}
