//! Core types used throughout modelsmith
//!
//! This module contains the closed enumerations shared by the document
//! model, the normalizer and the context builder: attribute types, relation
//! types, cardinalities and the database backends a generator can target.

use serde::{Deserialize, Serialize};

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Type alias for model unique identifiers
pub type ModelId = uuid::Uuid;

/// Type alias for attribute unique identifiers
pub type AttributeId = uuid::Uuid;

/// Type alias for relation unique identifiers
pub type RelationId = uuid::Uuid;

/// Type alias for project unique identifiers
pub type ProjectId = uuid::Uuid;

// ============================================================================
// Attribute Types
// ============================================================================

/// Abstract type of a model attribute.
///
/// The set is closed: every projection in [`crate::catalog`] is an
/// exhaustive match over these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// UUID identity
    #[serde(alias = "uuid")]
    Id,
    /// Auto-incrementing integer identity
    AutoIncrement,
    /// Short string
    Varchar,
    /// Long-form text
    Text,
    /// Base64-encoded binary payload
    Base64,
    /// Password hash
    Password,
    /// Integer
    Int,
    /// Floating point
    Float,
    /// Boolean
    Boolean,
    /// Date and time
    Datetime,
    /// Date without time
    Date,
    /// Time without date
    Time,
}

impl AttributeType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            AttributeType::Id => "UUID",
            AttributeType::AutoIncrement => "Auto Increment",
            AttributeType::Varchar => "Varchar",
            AttributeType::Text => "Text",
            AttributeType::Base64 => "Base64",
            AttributeType::Password => "Password",
            AttributeType::Int => "Integer",
            AttributeType::Float => "Float",
            AttributeType::Boolean => "Boolean",
            AttributeType::Datetime => "Date Time",
            AttributeType::Date => "Date",
            AttributeType::Time => "Time",
        }
    }

    /// Whether this type can serve as a model identity
    pub fn is_identity(&self) -> bool {
        matches!(self, AttributeType::Id | AttributeType::AutoIncrement)
    }

    /// Get all attribute types
    pub fn all() -> &'static [AttributeType] {
        &[
            AttributeType::Id,
            AttributeType::AutoIncrement,
            AttributeType::Varchar,
            AttributeType::Text,
            AttributeType::Base64,
            AttributeType::Password,
            AttributeType::Int,
            AttributeType::Float,
            AttributeType::Boolean,
            AttributeType::Datetime,
            AttributeType::Date,
            AttributeType::Time,
        ]
    }
}

impl Default for AttributeType {
    fn default() -> Self {
        AttributeType::Varchar
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Database Types
// ============================================================================

/// Database backends a generator can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
    MongoDB,
}

impl DatabaseType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::SQLite => "SQLite",
            DatabaseType::MongoDB => "MongoDB",
        }
    }

    /// Get all database types
    pub fn all() -> &'static [DatabaseType] {
        &[
            DatabaseType::PostgreSQL,
            DatabaseType::MySQL,
            DatabaseType::SQLite,
            DatabaseType::MongoDB,
        ]
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::PostgreSQL),
            "mysql" => Ok(DatabaseType::MySQL),
            "sqlite" => Ok(DatabaseType::SQLite),
            "mongodb" | "mongo" => Ok(DatabaseType::MongoDB),
            other => Err(format!("unknown database backend '{}'", other)),
        }
    }
}

// ============================================================================
// Relation Types
// ============================================================================

/// How many records one end of a relation stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    One,
    Many,
}

/// One of the two ends of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    /// The other end
    pub fn opposite(&self) -> Self {
        match self {
            Side::Source => Side::Target,
            Side::Target => Side::Source,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation types between models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    /// One record relates to exactly one other record
    OneToOne,
    /// One record relates to many others (e.g., User has many Posts)
    #[default]
    OneToMany,
    /// Many records relate to one (inverse of OneToMany)
    ManyToOne,
    /// Many-to-many, must be split into a joining model before it carries keys
    ManyToMany,
}

impl RelationType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "One to One",
            RelationType::OneToMany => "One to Many",
            RelationType::ManyToOne => "Many to One",
            RelationType::ManyToMany => "Many to Many",
        }
    }

    /// Cardinality of the given end
    pub fn cardinality(&self, side: Side) -> Cardinality {
        match (side, self) {
            (Side::Source, RelationType::OneToOne | RelationType::OneToMany) => Cardinality::One,
            (Side::Source, RelationType::ManyToOne | RelationType::ManyToMany) => {
                Cardinality::Many
            }
            (Side::Target, RelationType::OneToOne | RelationType::ManyToOne) => Cardinality::One,
            (Side::Target, RelationType::OneToMany | RelationType::ManyToMany) => {
                Cardinality::Many
            }
        }
    }

    /// The end whose model stores the foreign-key column, if any
    pub fn fk_owner(&self) -> Option<Side> {
        match self {
            RelationType::OneToOne | RelationType::ManyToOne => Some(Side::Source),
            RelationType::OneToMany => Some(Side::Target),
            RelationType::ManyToMany => None,
        }
    }

    /// Check if this relation needs a joining model before it carries keys
    pub fn requires_split(&self) -> bool {
        matches!(self, RelationType::ManyToMany)
    }

    /// Get all relation types
    pub fn all() -> &'static [RelationType] {
        &[
            RelationType::OneToOne,
            RelationType::OneToMany,
            RelationType::ManyToOne,
            RelationType::ManyToMany,
        ]
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
