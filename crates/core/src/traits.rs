//! Core traits for modelsmith
//!
//! This module defines the small set of behaviours shared by the document
//! types: structural validation, JSON persistence and identity.

use crate::error::EngineResult;
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use modelsmith_core::{Validatable, EngineResult, EngineError};
///
/// struct Tag {
///     name: String,
/// }
///
/// impl Validatable for Tag {
///     fn validate(&self) -> EngineResult<()> {
///         if self.name.is_empty() {
///             return Err(EngineError::validation("Name cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types stored as versioned JSON documents
///
/// The core never touches the file system; callers hand the JSON text to
/// whatever persistence layer they own.
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Save to a pretty-printed JSON string
    fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a unique identifier
pub trait Identifiable {
    /// Get the unique identifier
    fn id(&self) -> uuid::Uuid;
}

/// First id that occurs more than once, in iteration order
pub fn first_duplicate_id<'a, T, I>(items: I) -> Option<uuid::Uuid>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().map(Identifiable::id).find(|id| !seen.insert(*id))
}

// ============================================================================
// Tests
// ============================================================================
