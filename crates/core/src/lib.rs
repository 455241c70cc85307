//! # modelsmith core
//!
//! Core types, traits, and error handling for modelsmith.
//!
//! This crate provides the foundational building blocks used by the
//! document model and the IR compiler:
//!
//! - **Types**: attribute types, relation types, cardinalities, backends
//! - **Catalog**: total projections of attribute types onto every target
//! - **Inflection**: the `Inflector` capability and its English rules
//! - **Traits**: `Validatable`, `Persistable`, `Identifiable`
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod catalog;
pub mod error;
pub mod inflection;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use catalog::{DefaultLiteral, FilterKind, SourceType, TypeProjection};
pub use error::{EngineError, EngineResult};
pub use inflection::{EnglishInflector, Inflector};
pub use traits::{Identifiable, Persistable, Validatable, first_duplicate_id};
pub use types::{
    AttributeId, AttributeType, Cardinality, DatabaseType, ModelId, ProjectId, RelationId,
    RelationType, Side,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
