//! Attribute definitions for model properties
//!
//! This module contains the `Attribute` struct (one typed field owned by a
//! model) and the canonical attribute templates: the identity attribute every
//! model carries and the auth fields injected into the auth model.

use modelsmith_core::{AttributeType, EngineError, EngineResult, Identifiable, Validatable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the identity attribute
pub const IDENTITY_NAME: &str = "id";

/// Attributes the auth model must keep, identity included
pub const AUTH_ATTRIBUTE_NAMES: [&str; 4] = [IDENTITY_NAME, "name", "password", "email"];

pub(crate) fn default_true() -> bool {
    true
}

// ============================================================================
// Attribute
// ============================================================================

/// A typed field owned by exactly one model (maps to a column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Unique identifier for this attribute
    pub id: Uuid,

    /// Owning model
    pub model_id: Uuid,

    /// Attribute name, unique within the owning model
    pub name: String,

    /// Abstract type, projected by the type catalog
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub nullable: bool,

    /// Whether the attribute appears in default result projections
    #[serde(default = "default_true")]
    pub selectable: bool,

    /// Whether clients may provide a value on insert
    #[serde(default = "default_true")]
    pub insertable: bool,

    /// Raw default value, coerced to `attribute_type` at generation time
    #[serde(default)]
    pub default: Option<String>,

    /// Stable sort key (the identity attribute is always first regardless)
    #[serde(default)]
    pub order: i32,

    /// Disabled attributes are kept in the document but not generated
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Attribute {
    /// Create a new attribute with the given name and type
    pub fn new(model_id: Uuid, name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            id: Uuid::new_v4(),
            model_id,
            name: name.into(),
            attribute_type,
            nullable: false,
            selectable: true,
            insertable: true,
            default: None,
            order: 0,
            enabled: true,
        }
    }

    /// Create the UUID identity attribute
    pub fn identity(model_id: Uuid) -> Self {
        let mut attribute = Self::new(model_id, IDENTITY_NAME, AttributeType::Id);
        attribute.insertable = false;
        attribute
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Allow NULL values
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Exclude from default result projections
    pub fn hidden(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Reject client-provided values on insert
    pub fn readonly(mut self) -> Self {
        self.insertable = false;
        self
    }

    /// Set the raw default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the sort key
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Keep the attribute in the document without generating it
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Whether this is the identity attribute
    pub fn is_identity(&self) -> bool {
        self.name == IDENTITY_NAME
    }

    /// Whether this attribute is mandatory on the auth model
    pub fn is_auth_field(&self) -> bool {
        AUTH_ATTRIBUTE_NAMES.contains(&self.name.as_str())
    }
}

/// Canonical auth fields (`name`, `password`, `email`) for `model_id`.
///
/// `password` is excluded from default projections so hashes never leak
/// into list results.
pub fn auth_template(model_id: Uuid) -> Vec<Attribute> {
    vec![
        Attribute::new(model_id, "name", AttributeType::Varchar).with_order(1),
        Attribute::new(model_id, "password", AttributeType::Password)
            .hidden()
            .with_order(2),
        Attribute::new(model_id, "email", AttributeType::Varchar).with_order(3),
    ]
}

impl Validatable for Attribute {
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Attribute name cannot be empty"));
        }

        if self.is_identity() {
            if !self.attribute_type.is_identity() {
                return Err(EngineError::validation(format!(
                    "Identity attribute must be UUID or auto-increment, found {}",
                    self.attribute_type
                )));
            }
            if !self.enabled {
                return Err(EngineError::validation(
                    "Identity attribute cannot be disabled",
                ));
            }
        }

        Ok(())
    }
}

impl Identifiable for Attribute {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Tests
// ============================================================================
