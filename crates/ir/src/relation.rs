//! Relation definitions between models
//!
//! A `Relation` stores only what the user edits: the two ends, the type, and
//! per-end naming, ordering and default-to-auth overrides. Cardinalities and
//! foreign-key ownership are derived by the normalizer.
//!
//! The `source*` fields describe the reference *to* the source model, which
//! is a field living on the target model; the `target*` fields describe the
//! reference to the target model, living on the source model.

use crate::attribute::default_true;
use modelsmith_core::{EngineError, EngineResult, Identifiable, RelationType, Side, Validatable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Relation
// ============================================================================

/// Represents a relation between two models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Unique identifier for this relation
    pub id: Uuid,

    /// Source model; absent while the user is still drawing the edge
    #[serde(default)]
    pub source_id: Option<Uuid>,

    /// Target model; absent while the user is still drawing the edge
    #[serde(default)]
    pub target_id: Option<Uuid>,

    /// Relation type
    #[serde(rename = "type")]
    pub relation_type: RelationType,

    /// Override for the name under which the target refers to the source
    #[serde(default)]
    pub source_name: Option<String>,

    /// Override for the name under which the source refers to the target
    #[serde(default)]
    pub target_name: Option<String>,

    /// Position of the source reference among the target's fields
    #[serde(default)]
    pub source_order: i32,

    /// Position of the target reference among the source's fields
    #[serde(default)]
    pub target_order: i32,

    /// Whether the foreign key may be NULL
    #[serde(default)]
    pub optional: bool,

    /// Disabled relations are kept in the document but not generated
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// When the source owns the key, default it to the authenticated user
    #[serde(default)]
    pub source_default_to_auth: bool,

    /// When the target owns the key, default it to the authenticated user
    #[serde(default)]
    pub target_default_to_auth: bool,
}

impl Relation {
    /// Create a new relation between two models
    pub fn new(source_id: Uuid, target_id: Uuid, relation_type: RelationType) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: Some(source_id),
            target_id: Some(target_id),
            relation_type,
            source_name: None,
            target_name: None,
            source_order: 0,
            target_order: 0,
            optional: false,
            enabled: true,
            source_default_to_auth: false,
            target_default_to_auth: false,
        }
    }

    /// Create a one-to-one relation
    pub fn one_to_one(source_id: Uuid, target_id: Uuid) -> Self {
        Self::new(source_id, target_id, RelationType::OneToOne)
    }

    /// Create a one-to-many relation
    pub fn one_to_many(source_id: Uuid, target_id: Uuid) -> Self {
        Self::new(source_id, target_id, RelationType::OneToMany)
    }

    /// Create a many-to-one relation
    pub fn many_to_one(source_id: Uuid, target_id: Uuid) -> Self {
        Self::new(source_id, target_id, RelationType::ManyToOne)
    }

    /// Create a many-to-many relation
    pub fn many_to_many(source_id: Uuid, target_id: Uuid) -> Self {
        Self::new(source_id, target_id, RelationType::ManyToMany)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set a fixed id (useful for stable fixtures)
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Override the name of the source reference
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Override the name of the target reference
    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    /// Set both order slots
    pub fn with_orders(mut self, source_order: i32, target_order: i32) -> Self {
        self.source_order = source_order;
        self.target_order = target_order;
        self
    }

    /// Mark as optional (NULL FK allowed)
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Keep the relation in the document without generating it
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Default the key on `side` to the authenticated user
    pub fn default_to_auth(mut self, side: Side) -> Self {
        match side {
            Side::Source => self.source_default_to_auth = true,
            Side::Target => self.target_default_to_auth = true,
        }
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Model at the given end
    pub fn model_id(&self, side: Side) -> Option<Uuid> {
        match side {
            Side::Source => self.source_id,
            Side::Target => self.target_id,
        }
    }

    /// Name override for the given end
    pub fn name_override(&self, side: Side) -> Option<&str> {
        let name = match side {
            Side::Source => self.source_name.as_deref(),
            Side::Target => self.target_name.as_deref(),
        };
        name.filter(|n| !n.trim().is_empty())
    }

    /// Order slot for the given end
    pub fn order(&self, side: Side) -> i32 {
        match side {
            Side::Source => self.source_order,
            Side::Target => self.target_order,
        }
    }

    /// Default-to-auth flag for the given end
    pub fn defaults_to_auth(&self, side: Side) -> bool {
        match side {
            Side::Source => self.source_default_to_auth,
            Side::Target => self.target_default_to_auth,
        }
    }

    /// Check if this relation involves a specific model
    pub fn involves(&self, model_id: Uuid) -> bool {
        self.source_id == Some(model_id) || self.target_id == Some(model_id)
    }

    /// Check if this is a self-referential relation
    pub fn is_self_referential(&self) -> bool {
        self.source_id.is_some() && self.source_id == self.target_id
    }

    /// Whether both ends are set
    pub fn is_complete(&self) -> bool {
        self.source_id.is_some() && self.target_id.is_some()
    }

    // ========================================================================
    // Editing operations
    // ========================================================================

    /// Move foreign-key ownership of a one-to-one relation to the other end.
    ///
    /// Ends, names, orders and default-to-auth flags are exchanged together,
    /// so swapping twice yields the original relation.
    pub fn swapped(&self) -> EngineResult<Relation> {
        if self.relation_type != RelationType::OneToOne {
            return Err(EngineError::invalid_operation(
                "swap",
                format!(
                    "only one-to-one relations can swap foreign keys, found {}",
                    self.relation_type
                ),
            ));
        }

        Ok(Relation {
            source_id: self.target_id,
            target_id: self.source_id,
            source_name: self.target_name.clone(),
            target_name: self.source_name.clone(),
            source_order: self.target_order,
            target_order: self.source_order,
            source_default_to_auth: self.target_default_to_auth,
            target_default_to_auth: self.source_default_to_auth,
            ..self.clone()
        })
    }
}

impl Validatable for Relation {
    fn validate(&self) -> EngineResult<()> {
        if self.source_id.is_none() {
            return Err(EngineError::RelationValidation(format!(
                "Relation {} has no source model",
                self.id
            )));
        }

        if self.target_id.is_none() {
            return Err(EngineError::RelationValidation(format!(
                "Relation {} has no target model",
                self.id
            )));
        }

        Ok(())
    }
}

impl Identifiable for Relation {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Tests
// ============================================================================
