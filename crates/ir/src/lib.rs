//! # modelsmith IR
//!
//! The user-editable document model and the passes that run over it before
//! code generation.
//!
//! ## Core Concepts
//!
//! - **Model**: a data model that maps to one table (e.g., User, Post)
//! - **Attribute**: a typed property of a model that maps to a column
//! - **Relation**: a typed connection between two models
//! - **Document**: the versioned root container holding all of the above
//!
//! ## Passes
//!
//! - [`migration`]: upgrades persisted documents to [`SCHEMA_VERSION`]
//! - [`normalize`]: resolves relation names, cardinalities and FK owners,
//!   and hosts the split / swap editing operations
//! - [`validation`]: advisory conflict and completeness diagnostics
//!

// Module declarations
pub mod attribute;
pub mod migration;
pub mod model;
pub mod normalize;
pub mod project;
pub mod relation;
pub mod validation;

// Re-export commonly used types at crate root
pub use attribute::{AUTH_ATTRIBUTE_NAMES, Attribute, IDENTITY_NAME, auth_template};
pub use migration::{document_version, migrate, needs_migration};
pub use model::Model;
pub use normalize::{
    NormalizedGraph, NormalizedRelation, ResolvedEnd, SkipReason, normalize, split_many_to_many,
    swap_foreign_key,
};
pub use project::{Document, Generator, ProjectMeta};
pub use relation::Relation;
pub use validation::{
    Diagnostic, DiagnosticCode, Diagnostics, ValidationRule, Validator, validate,
};

// Re-export core types that are commonly used with IR
pub use modelsmith_core::{
    AttributeType, Cardinality, DatabaseType, EngineError, EngineResult, Inflector, RelationType,
    Side,
};

/// Current schema version for documents
pub const SCHEMA_VERSION: u32 = 2;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        // Re-exported from core
        AttributeType,
        Cardinality,
        DatabaseType,
        EngineError,
        EngineResult,
        Inflector,
        RelationType,
        Side,
        // Document types
        Attribute,
        Document,
        Generator,
        Model,
        ProjectMeta,
        Relation,
        // Passes
        Diagnostics,
        migrate,
        normalize,
        split_many_to_many,
        swap_foreign_key,
        validate,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 2);
        assert_eq!(Document::new("x").version, SCHEMA_VERSION);
    }
}
