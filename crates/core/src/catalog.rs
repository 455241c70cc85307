//! Type catalog
//!
//! Static tables projecting an [`AttributeType`] onto every target a renderer
//! may need: the source-language primitive, the wire (GraphQL) scalar, the
//! query-filter family and the persisted column kind per backend.
//!
//! Every table is an exhaustive `match`, so adding an attribute type or a
//! backend does not compile until each projection has an entry. The catalog
//! resolves nothing on its own; the context builder is its only consumer.

use crate::types::{AttributeType, DatabaseType};
use serde::{Deserialize, Serialize};

// ============================================================================
// Projections
// ============================================================================

/// Primitive type in the generated source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    String,
    Number,
    Boolean,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::String => "string",
            SourceType::Number => "number",
            SourceType::Boolean => "boolean",
        }
    }
}

/// Query-filter family used for list arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    StringFilter,
    NumberFilter,
    BooleanFilter,
}

/// All projections of one attribute type for one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeProjection {
    pub source: SourceType,
    pub wire: &'static str,
    pub filter: FilterKind,
    pub column: &'static str,
}

impl TypeProjection {
    /// Resolve every projection for `ty` on `database`
    pub fn of(ty: AttributeType, database: DatabaseType) -> Self {
        Self {
            source: source_type(ty),
            wire: wire_type(ty),
            filter: filter_kind(ty),
            column: column_kind(ty, database),
        }
    }
}

/// Source-language primitive for an attribute type
pub fn source_type(ty: AttributeType) -> SourceType {
    use AttributeType::*;
    match ty {
        Id | Varchar | Text | Base64 | Password | Datetime | Date | Time => SourceType::String,
        AutoIncrement | Int | Float => SourceType::Number,
        Boolean => SourceType::Boolean,
    }
}

/// GraphQL scalar name for an attribute type
pub fn wire_type(ty: AttributeType) -> &'static str {
    use AttributeType::*;
    match ty {
        Id => "ID",
        AutoIncrement | Int => "Int",
        Float => "Float",
        Varchar | Text | Base64 | Password => "String",
        Boolean => "Boolean",
        Datetime => "DateTime",
        Date => "Date",
        Time => "Time",
    }
}

/// Filter family for an attribute type. Temporal types filter as numbers so
/// range queries work.
pub fn filter_kind(ty: AttributeType) -> FilterKind {
    use AttributeType::*;
    match ty {
        Id | Varchar | Text | Base64 | Password => FilterKind::StringFilter,
        AutoIncrement | Int | Float | Datetime | Date | Time => FilterKind::NumberFilter,
        Boolean => FilterKind::BooleanFilter,
    }
}

/// Persisted column kind for an attribute type on a backend
pub fn column_kind(ty: AttributeType, database: DatabaseType) -> &'static str {
    use AttributeType::*;
    match database {
        DatabaseType::PostgreSQL => match ty {
            Id => "uuid",
            AutoIncrement => "serial",
            Varchar | Password => "varchar(255)",
            Text | Base64 => "text",
            Int => "integer",
            Float => "double precision",
            Boolean => "boolean",
            Datetime => "timestamptz",
            Date => "date",
            Time => "time",
        },
        DatabaseType::MySQL => match ty {
            Id => "char(36)",
            AutoIncrement => "int auto_increment",
            Varchar | Password => "varchar(255)",
            Text => "text",
            Base64 => "longtext",
            Int => "int",
            Float => "double",
            Boolean => "tinyint(1)",
            Datetime => "datetime",
            Date => "date",
            Time => "time",
        },
        DatabaseType::SQLite => match ty {
            Id | Varchar | Text | Base64 | Password | Datetime | Date | Time => "text",
            AutoIncrement | Int | Boolean => "integer",
            Float => "real",
        },
        DatabaseType::MongoDB => match ty {
            Id | Varchar | Text | Base64 | Password | Time => "String",
            AutoIncrement | Int | Float => "Number",
            Boolean => "Boolean",
            Datetime | Date => "Date",
        },
    }
}

/// Attribute type of a foreign-key column referencing an identity of `ty`
pub fn foreign_key_type(ty: AttributeType) -> AttributeType {
    match ty {
        AttributeType::AutoIncrement => AttributeType::Int,
        AttributeType::Id => AttributeType::Id,
        other => other,
    }
}

// ============================================================================
// Default values
// ============================================================================

/// A stored default coerced to its attribute type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DefaultLiteral {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Current timestamp at insert time
    Now,
}

/// Coerce a raw default string to `ty`.
///
/// Returns `None` when the value does not fit the type. Identity types never
/// take a default.
pub fn coerce_default(ty: AttributeType, raw: &str) -> Option<DefaultLiteral> {
    use AttributeType::*;
    let trimmed = raw.trim();
    match ty {
        Id | AutoIncrement => None,
        Varchar | Text | Base64 | Password => Some(DefaultLiteral::String(raw.to_string())),
        Int => trimmed.parse::<i64>().ok().map(DefaultLiteral::Integer),
        Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(DefaultLiteral::Float),
        Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(DefaultLiteral::Boolean(true)),
            "false" | "0" => Some(DefaultLiteral::Boolean(false)),
            _ => None,
        },
        Datetime | Date | Time => {
            if trimmed.eq_ignore_ascii_case("now") {
                Some(DefaultLiteral::Now)
            } else if !trimmed.is_empty() {
                Some(DefaultLiteral::String(trimmed.to_string()))
            } else {
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalog_is_total() {
        for ty in AttributeType::all() {
            for db in DatabaseType::all() {
                let projection = TypeProjection::of(*ty, *db);
                assert!(!projection.wire.is_empty());
                assert!(!projection.column.is_empty());
            }
        }
    }

    #[test]
    fn test_temporal_types_filter_as_numbers() {
        for ty in [AttributeType::Datetime, AttributeType::Date, AttributeType::Time] {
            assert_eq!(filter_kind(ty), FilterKind::NumberFilter);
            assert_eq!(source_type(ty), SourceType::String);
        }
    }

    #[test]
    fn test_postgres_projection() {
        let projection = TypeProjection::of(AttributeType::Id, DatabaseType::PostgreSQL);
        assert_eq!(
            projection,
            TypeProjection {
                source: SourceType::String,
                wire: "ID",
                filter: FilterKind::StringFilter,
                column: "uuid",
            }
        );
    }

    #[test]
    fn test_column_kinds_per_backend() {
        assert_eq!(column_kind(AttributeType::Boolean, DatabaseType::MySQL), "tinyint(1)");
        assert_eq!(column_kind(AttributeType::Boolean, DatabaseType::SQLite), "integer");
        assert_eq!(column_kind(AttributeType::Datetime, DatabaseType::MongoDB), "Date");
        assert_eq!(column_kind(AttributeType::AutoIncrement, DatabaseType::PostgreSQL), "serial");
    }

    #[test]
    fn test_foreign_key_type() {
        assert_eq!(foreign_key_type(AttributeType::AutoIncrement), AttributeType::Int);
        assert_eq!(foreign_key_type(AttributeType::Id), AttributeType::Id);
    }

    #[test]
    fn test_coerce_default() {
        assert_eq!(
            coerce_default(AttributeType::Int, " 42 "),
            Some(DefaultLiteral::Integer(42))
        );
        assert_eq!(coerce_default(AttributeType::Int, "4.2"), None);
        assert_eq!(
            coerce_default(AttributeType::Float, "4.5"),
            Some(DefaultLiteral::Float(4.5))
        );
        assert_eq!(coerce_default(AttributeType::Float, "NaN"), None);
        assert_eq!(
            coerce_default(AttributeType::Boolean, "TRUE"),
            Some(DefaultLiteral::Boolean(true))
        );
        assert_eq!(coerce_default(AttributeType::Boolean, "yes"), None);
        assert_eq!(
            coerce_default(AttributeType::Datetime, "now"),
            Some(DefaultLiteral::Now)
        );
        assert_eq!(
            coerce_default(AttributeType::Varchar, " padded "),
            Some(DefaultLiteral::String(" padded ".to_string()))
        );
        assert_eq!(coerce_default(AttributeType::Id, "abc"), None);
    }
}
