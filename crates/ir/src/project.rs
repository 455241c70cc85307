//! Document definitions for modelsmith
//!
//! This module contains the root `Document` (the persisted, user-edited
//! graph of models and relations), its `ProjectMeta`, and the `Generator`
//! selection that decides the target stack.
//!
//! Editing operations mutate the document in place and belong to the editor
//! side. The compiler only ever reads `&Document` snapshots.

use crate::attribute::{Attribute, IDENTITY_NAME, auth_template};
use crate::{Model, Relation, SCHEMA_VERSION};
use modelsmith_core::{
    DatabaseType, EngineError, EngineResult, Persistable, Validatable, first_duplicate_id,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Document
// ============================================================================

/// Root container for a modelsmith project
///
/// Models and relations are flat, ordered collections; everything that
/// refers to them does so by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Schema version, read only by the migrator
    pub version: u32,

    /// Project metadata
    pub project: ProjectMeta,

    /// All models, in document order
    #[serde(default)]
    pub models: Vec<Model>,

    /// All relations, in document order
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Document {
    /// Create an empty document at the current schema version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            project: ProjectMeta::new(name),
            models: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Create a document targeting a specific generator
    pub fn with_generator(name: impl Into<String>, generator: Generator) -> Self {
        let mut document = Self::new(name);
        document.project.generator = generator;
        document
    }

    // ========================================================================
    // Model Management
    // ========================================================================

    /// Add a model to the document
    pub fn add_model(&mut self, model: Model) -> Uuid {
        let id = model.id;
        self.models.push(model);
        id
    }

    /// Remove a model by ID, together with every relation touching it
    pub fn remove_model(&mut self, id: Uuid) -> EngineResult<Model> {
        let index = self
            .models
            .iter()
            .position(|m| m.id == id)
            .ok_or(EngineError::ModelNotFound(id))?;

        self.relations.retain(|r| !r.involves(id));
        if self.project.user_model_id == Some(id) {
            self.project.user_model_id = None;
        }

        Ok(self.models.remove(index))
    }

    /// Get a model by ID
    pub fn model(&self, id: Uuid) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Get a mutable model by ID
    pub fn model_mut(&mut self, id: Uuid) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.id == id)
    }

    /// Get a model by name
    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Map from model id to its position in `models`
    pub fn model_index(&self) -> HashMap<Uuid, usize> {
        self.models
            .iter()
            .enumerate()
            .map(|(index, model)| (model.id, index))
            .collect()
    }

    // ========================================================================
    // Attribute Management
    // ========================================================================

    /// Add an attribute to a model
    pub fn add_attribute(&mut self, model_id: Uuid, attribute: Attribute) -> EngineResult<Uuid> {
        let model = self
            .model_mut(model_id)
            .ok_or(EngineError::ModelNotFound(model_id))?;

        if attribute.is_identity() && model.identity().is_some() {
            return Err(EngineError::invalid_operation(
                "add attribute",
                format!("model '{}' already has an identity attribute", model.name),
            ));
        }

        let id = attribute.id;
        model.push_attribute(attribute);
        Ok(id)
    }

    /// Remove an attribute from a model
    pub fn remove_attribute(
        &mut self,
        model_id: Uuid,
        attribute_id: Uuid,
    ) -> EngineResult<Attribute> {
        self.ensure_editable(model_id, attribute_id, "removed")?;

        let model = self
            .model_mut(model_id)
            .ok_or(EngineError::ModelNotFound(model_id))?;
        let index = model
            .attributes
            .iter()
            .position(|a| a.id == attribute_id)
            .ok_or(EngineError::AttributeNotFound {
                model: model_id,
                attribute: attribute_id,
            })?;

        Ok(model.attributes.remove(index))
    }

    /// Rename an attribute
    pub fn rename_attribute(
        &mut self,
        model_id: Uuid,
        attribute_id: Uuid,
        name: impl Into<String>,
    ) -> EngineResult<()> {
        let name = name.into();
        self.ensure_editable(model_id, attribute_id, "renamed")?;

        if name == IDENTITY_NAME {
            return Err(EngineError::invalid_operation(
                "rename attribute",
                format!("'{}' is reserved for the identity attribute", IDENTITY_NAME),
            ));
        }

        let attribute = self
            .model_mut(model_id)
            .and_then(|m| m.attributes.iter_mut().find(|a| a.id == attribute_id))
            .ok_or(EngineError::AttributeNotFound {
                model: model_id,
                attribute: attribute_id,
            })?;
        attribute.name = name;
        Ok(())
    }

    /// Identity attributes and the auth model's mandatory fields cannot be
    /// removed or renamed
    fn ensure_editable(
        &self,
        model_id: Uuid,
        attribute_id: Uuid,
        action: &str,
    ) -> EngineResult<()> {
        let model = self
            .model(model_id)
            .ok_or(EngineError::ModelNotFound(model_id))?;
        let attribute = model
            .attribute(attribute_id)
            .ok_or(EngineError::AttributeNotFound {
                model: model_id,
                attribute: attribute_id,
            })?;

        let is_auth_model = self.project.user_model_id == Some(model_id);
        if attribute.is_identity() || (is_auth_model && attribute.is_auth_field()) {
            return Err(EngineError::ProtectedAttribute {
                model: model.name.clone(),
                attribute: attribute.name.clone(),
                action: action.to_string(),
            });
        }

        Ok(())
    }

    // ========================================================================
    // Relation Management
    // ========================================================================

    /// Add a relation to the document
    pub fn add_relation(&mut self, relation: Relation) -> Uuid {
        let id = relation.id;
        self.relations.push(relation);
        id
    }

    /// Remove a relation by ID
    pub fn remove_relation(&mut self, id: Uuid) -> EngineResult<Relation> {
        let index = self
            .relations
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::RelationNotFound(id))?;
        Ok(self.relations.remove(index))
    }

    /// Get a relation by ID
    pub fn relation(&self, id: Uuid) -> Option<&Relation> {
        self.relations.iter().find(|r| r.id == id)
    }

    /// Get all relations touching a model
    pub fn relations_for_model(&self, model_id: Uuid) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.involves(model_id))
            .collect()
    }

    // ========================================================================
    // Auth Model
    // ========================================================================

    /// The designated auth model, if it exists
    pub fn auth_model(&self) -> Option<&Model> {
        self.project.user_model_id.and_then(|id| self.model(id))
    }

    /// Designate (or clear) the auth model.
    ///
    /// Auth fields missing from the chosen model are injected from the
    /// canonical template; existing ones are left alone.
    pub fn set_auth_model(&mut self, model_id: Option<Uuid>) -> EngineResult<()> {
        let Some(id) = model_id else {
            self.project.user_model_id = None;
            return Ok(());
        };

        let model = self.model_mut(id).ok_or(EngineError::ModelNotFound(id))?;
        for field in auth_template(id) {
            if !model.has_attribute(&field.name) {
                model.push_attribute(field);
            }
        }

        self.project.user_model_id = Some(id);
        Ok(())
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Check if the document has no models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Database backend implied by the generator
    pub fn database(&self) -> DatabaseType {
        self.project.generator.database()
    }
}

impl Validatable for Document {
    /// Shape checks a well-formed current document must pass. Naming and
    /// completeness findings are advisory and live in the validator.
    fn validate(&self) -> EngineResult<()> {
        if self.version != SCHEMA_VERSION {
            return Err(EngineError::InvalidDocument(format!(
                "expected version {}, found {}",
                SCHEMA_VERSION, self.version
            )));
        }

        if let Some(id) = first_duplicate_id(&self.models) {
            return Err(EngineError::InvalidDocument(format!("duplicate model id {}", id)));
        }
        if let Some(id) = first_duplicate_id(self.models.iter().flat_map(|m| &m.attributes)) {
            return Err(EngineError::InvalidDocument(format!("duplicate attribute id {}", id)));
        }
        if let Some(id) = first_duplicate_id(&self.relations) {
            return Err(EngineError::InvalidDocument(format!("duplicate relation id {}", id)));
        }

        Ok(())
    }
}

impl Persistable for Document {
    /// Load any supported version, migrating it to the current one
    fn from_json(json: &str) -> EngineResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        crate::migration::migrate(raw)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled Project")
    }
}

// ============================================================================
// ProjectMeta
// ============================================================================

/// Project metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Unique project identifier
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Target stack
    #[serde(default)]
    pub generator: Generator,

    /// The auth model, if one is designated
    #[serde(default)]
    pub user_model_id: Option<Uuid>,
}

impl ProjectMeta {
    /// Create new project metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            generator: Generator::default(),
            user_model_id: None,
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Target stack selection; each stack implies one database backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Generator {
    /// GraphQL API over PostgreSQL
    #[default]
    GraphqlPostgres,
    /// GraphQL API over MySQL
    GraphqlMysql,
    /// GraphQL API over SQLite
    GraphqlSqlite,
    /// GraphQL API over MongoDB
    GraphqlMongo,
}

impl Generator {
    /// Database backend used by this stack
    pub fn database(&self) -> DatabaseType {
        match self {
            Generator::GraphqlPostgres => DatabaseType::PostgreSQL,
            Generator::GraphqlMysql => DatabaseType::MySQL,
            Generator::GraphqlSqlite => DatabaseType::SQLite,
            Generator::GraphqlMongo => DatabaseType::MongoDB,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Generator::GraphqlPostgres => "GraphQL + PostgreSQL",
            Generator::GraphqlMysql => "GraphQL + MySQL",
            Generator::GraphqlSqlite => "GraphQL + SQLite",
            Generator::GraphqlMongo => "GraphQL + MongoDB",
        }
    }

    /// Get all generators
    pub fn all() -> &'static [Generator] {
        &[
            Generator::GraphqlPostgres,
            Generator::GraphqlMysql,
            Generator::GraphqlSqlite,
            Generator::GraphqlMongo,
        ]
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modelsmith_core::AttributeType;
    use pretty_assertions::assert_eq;

    fn blog() -> (Document, Uuid, Uuid) {
        let mut doc = Document::new("Blog");
        let user = doc.add_model(Model::new("User"));
        let post = doc.add_model(Model::new("Post"));
        doc.add_relation(Relation::one_to_many(user, post));
        (doc, user, post)
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new("Blog");
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert_eq!(doc.project.generator, Generator::GraphqlPostgres);
        assert_eq!(doc.database(), DatabaseType::PostgreSQL);
        assert!(doc.is_empty());
        assert!(doc.is_valid());
    }

    #[test]
    fn test_remove_model_cascades() {
        let (mut doc, user, post) = blog();
        doc.set_auth_model(Some(user)).unwrap();

        let removed = doc.remove_model(user).unwrap();
        assert_eq!(removed.name, "User");
        assert!(doc.relations.is_empty());
        assert_eq!(doc.project.user_model_id, None);
        assert!(doc.model(post).is_some());
        assert!(doc.remove_model(user).unwrap_err().is_not_found());
    }

    #[test]
    fn test_add_and_rename_attribute() {
        let (mut doc, _, post) = blog();
        let title = doc
            .add_attribute(post, Attribute::new(post, "title", AttributeType::Varchar))
            .unwrap();

        doc.rename_attribute(post, title, "headline").unwrap();
        let model = doc.model(post).unwrap();
        assert!(model.has_attribute("headline"));
        assert_eq!(model.attribute(title).unwrap().order, 1);

        let err = doc.rename_attribute(post, title, "id").unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperation { .. }));
    }

    #[test]
    fn test_second_identity_rejected() {
        let (mut doc, user, _) = blog();
        let err = doc.add_attribute(user, Attribute::identity(user)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperation { .. }));
    }

    #[test]
    fn test_identity_is_protected() {
        let (mut doc, user, _) = blog();
        let identity = doc.model(user).unwrap().identity().unwrap().id;

        let err = doc.remove_attribute(user, identity).unwrap_err();
        assert!(matches!(err, EngineError::ProtectedAttribute { .. }));
    }

    #[test]
    fn test_set_auth_model_injects_template() {
        let (mut doc, user, _) = blog();
        doc.set_auth_model(Some(user)).unwrap();

        let model = doc.auth_model().unwrap();
        let names: Vec<&str> = model
            .sorted_attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "name", "password", "email"]);

        let password = model.attribute_by_name("password").unwrap().id;
        let err = doc.remove_attribute(user, password).unwrap_err();
        assert!(matches!(err, EngineError::ProtectedAttribute { .. }));

        doc.set_auth_model(Some(user)).unwrap();
        assert_eq!(doc.model(user).unwrap().attributes.len(), 4);

        doc.set_auth_model(None).unwrap();
        doc.remove_attribute(user, password).unwrap();
    }

    #[test]
    fn test_set_auth_model_unknown() {
        let (mut doc, _, _) = blog();
        let err = doc.set_auth_model(Some(Uuid::new_v4())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_ids_invalid() {
        let (mut doc, user, _) = blog();
        let copy = doc.model(user).unwrap().clone();
        doc.models.push(copy);
        let err = doc.validate().unwrap_err();
        assert!(err.is_document());
    }

    #[test]
    fn test_relations_for_model() {
        let (mut doc, user, post) = blog();
        let tag = doc.add_model(Model::new("Tag"));
        doc.add_relation(Relation::many_to_many(tag, post));

        assert_eq!(doc.relations_for_model(user).len(), 1);
        assert_eq!(doc.relations_for_model(post).len(), 2);
        assert_eq!(doc.model_index()[&tag], 2);
    }

    #[test]
    fn test_generator_serde() {
        let json = serde_json::to_string(&Generator::GraphqlSqlite).unwrap();
        assert_eq!(json, "\"graphql-sqlite\"");
        for generator in Generator::all() {
            assert!(!generator.display_name().is_empty());
        }
        assert_eq!(Generator::GraphqlMongo.database(), DatabaseType::MongoDB);
    }

    #[test]
    fn test_persistable_round_trip() {
        let (doc, _, _) = blog();
        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }
}
