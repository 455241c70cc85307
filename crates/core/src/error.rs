//! Error types for modelsmith
//!
//! Hard failures only. Naming collisions and incomplete relations are not
//! errors: they are reported as diagnostics by the conflict validator and
//! never abort the pipeline.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for modelsmith
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model validation failed
    #[error("Model validation failed for '{model}': {message}")]
    ModelValidation { model: String, message: String },

    /// Attribute validation failed
    #[error("Attribute validation failed for '{model}.{attribute}': {message}")]
    AttributeValidation {
        model: String,
        attribute: String,
        message: String,
    },

    /// Relation validation failed
    #[error("Relation validation failed: {0}")]
    RelationValidation(String),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(Uuid),

    /// Attribute not found
    #[error("Attribute {attribute} not found in model {model}")]
    AttributeNotFound { model: Uuid, attribute: Uuid },

    /// Relation not found
    #[error("Relation not found: {0}")]
    RelationNotFound(Uuid),

    // ========================================================================
    // Editing Errors
    // ========================================================================
    /// An editing operation was applied to something it does not support
    #[error("Invalid operation '{operation}': {message}")]
    InvalidOperation { operation: String, message: String },

    /// Attempt to remove or rename a mandatory attribute
    #[error("Attribute '{attribute}' of model '{model}' is protected and cannot be {action}")]
    ProtectedAttribute {
        model: String,
        attribute: String,
        action: String,
    },

    // ========================================================================
    // Document / Migration Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Malformed document
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Document version is newer than this build understands
    #[error("Unsupported schema version {found} (latest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A migration step rejected its input
    #[error("Migration from version {from} failed: {message}")]
    MigrationFailed { from: u32, message: String },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create a model validation error
    pub fn model_validation(model: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::ModelValidation {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Create an attribute validation error
    pub fn attribute_validation(
        model: impl Into<String>,
        attribute: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::AttributeValidation {
            model: model.into(),
            attribute: attribute.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid-operation error
    pub fn invalid_operation(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::InvalidOperation {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Create a migration error for the step starting at `from`
    pub fn migration(from: u32, msg: impl Into<String>) -> Self {
        EngineError::MigrationFailed {
            from,
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::ModelValidation { .. }
                | EngineError::AttributeValidation { .. }
                | EngineError::RelationValidation(_)
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::ModelNotFound(_)
                | EngineError::AttributeNotFound { .. }
                | EngineError::RelationNotFound(_)
        )
    }

    /// Check if this error came from loading or migrating a document
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            EngineError::JsonSerialization(_)
                | EngineError::InvalidDocument(_)
                | EngineError::UnsupportedVersion { .. }
                | EngineError::MigrationFailed { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Tests
// ============================================================================
