//! Model definitions
//!
//! This module contains the `Model` struct: a user-defined entity that maps
//! to one table (or collection) and one generated type.

use crate::attribute::{Attribute, default_true};
use modelsmith_core::{EngineError, EngineResult, Identifiable, Inflector, Validatable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Model
// ============================================================================

/// Represents a data model (maps to a database table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for this model
    pub id: Uuid,

    /// Display name (e.g., "Blog Post")
    pub name: String,

    /// Code-safe identifier; camelized from `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Table name; pluralized key when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Whether generated code tracks `createdAt` / `updatedAt`
    #[serde(default)]
    pub audit_dates: bool,

    /// Attributes, identity included
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Disabled models are kept in the document but not generated
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Model {
    /// Create a new model carrying a UUID identity attribute
    pub fn new(name: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name: name.into(),
            key: None,
            table_name: None,
            audit_dates: false,
            attributes: vec![Attribute::identity(id)],
            enabled: true,
        }
    }

    /// Create a model with a fixed id (useful for stable fixtures)
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        let mut model = Self::new(name);
        model.id = id;
        for attribute in &mut model.attributes {
            attribute.model_id = id;
        }
        model
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the code key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Track creation and update timestamps
    pub fn with_audit_dates(mut self) -> Self {
        self.audit_dates = true;
        self
    }

    /// Keep the model in the document without generating it
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Add an attribute, re-owned by this model and ordered last when it
    /// has no explicit order
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.push_attribute(attribute);
        self
    }

    pub(crate) fn push_attribute(&mut self, mut attribute: Attribute) {
        attribute.model_id = self.id;
        if attribute.order == 0 && !attribute.is_identity() {
            attribute.order = self.attributes.len() as i32;
        }
        self.attributes.push(attribute);
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Code key: explicit `key`, else the camelized name
    pub fn resolved_key(&self, inflector: &dyn Inflector) -> String {
        match &self.key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => inflector.camelize(&self.name),
        }
    }

    /// Table name: explicit `table_name`, else the pluralized key
    pub fn resolved_table_name(&self, inflector: &dyn Inflector) -> String {
        match &self.table_name {
            Some(table) if !table.is_empty() => table.clone(),
            _ => inflector.pluralize(&self.resolved_key(inflector)),
        }
    }

    /// The identity attribute
    pub fn identity(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_identity())
    }

    /// Get an attribute by ID
    pub fn attribute(&self, attribute_id: Uuid) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id == attribute_id)
    }

    /// Get an attribute by name
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check if model has a specific attribute name
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Attributes with the identity pinned first, the rest by `order`.
    /// Ties keep document order.
    pub fn sorted_attributes(&self) -> Vec<&Attribute> {
        let mut attributes: Vec<&Attribute> = self.attributes.iter().collect();
        attributes.sort_by_key(|a| (!a.is_identity(), a.order));
        attributes
    }

    /// Enabled attributes, sorted
    pub fn enabled_attributes(&self) -> Vec<&Attribute> {
        self.sorted_attributes()
            .into_iter()
            .filter(|a| a.enabled)
            .collect()
    }
}

impl Validatable for Model {
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::model_validation(
                &self.name,
                "Model name cannot be empty",
            ));
        }

        if self.identity().is_none() {
            return Err(EngineError::model_validation(
                &self.name,
                "Model must have an identity attribute",
            ));
        }

        for attribute in &self.attributes {
            attribute.validate().map_err(|e| {
                EngineError::attribute_validation(&self.name, &attribute.name, e.to_string())
            })?;

            if attribute.model_id != self.id {
                return Err(EngineError::attribute_validation(
                    &self.name,
                    &attribute.name,
                    "Attribute belongs to a different model",
                ));
            }
        }

        Ok(())
    }
}

impl Identifiable for Model {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modelsmith_core::{AttributeType, EnglishInflector};

    #[test]
    fn test_new_model_has_identity() {
        let model = Model::new("User");
        let identity = model.identity().unwrap();
        assert_eq!(identity.model_id, model.id);
        assert!(model.is_valid());
    }

    #[test]
    fn test_with_id_reowns_attributes() {
        let id = Uuid::from_u128(42);
        let model = Model::with_id(id, "User");
        assert_eq!(model.id, id);
        assert!(model.attributes.iter().all(|a| a.model_id == id));
    }

    #[test]
    fn test_resolved_names() {
        let inflector = EnglishInflector;
        let model = Model::new("Blog Post");
        assert_eq!(model.resolved_key(&inflector), "blogPost");
        assert_eq!(model.resolved_table_name(&inflector), "blogPosts");

        let model = Model::new("Person").with_key("member");
        assert_eq!(model.resolved_key(&inflector), "member");
        assert_eq!(model.resolved_table_name(&inflector), "members");

        let model = Model::new("Person").with_table_name("tbl_person");
        assert_eq!(model.resolved_table_name(&inflector), "tbl_person");
    }

    #[test]
    fn test_empty_key_falls_back_to_name() {
        let inflector = EnglishInflector;
        let model = Model::new("Category").with_key("");
        assert_eq!(model.resolved_key(&inflector), "category");
    }

    #[test]
    fn test_identity_sorted_first() {
        let mut model = Model::new("Post");
        let title = Attribute::new(model.id, "title", AttributeType::Varchar).with_order(-5);
        let body = Attribute::new(model.id, "body", AttributeType::Text).with_order(3);
        model.attributes.insert(0, body);
        model.attributes.insert(0, title);
        model.attributes[2].order = 10;

        let names: Vec<&str> = model
            .sorted_attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "title", "body"]);
    }

    #[test]
    fn test_enabled_attributes_skip_disabled() {
        let model = Model::new("Post")
            .with_attribute(Attribute::new(Uuid::nil(), "title", AttributeType::Varchar))
            .with_attribute(
                Attribute::new(Uuid::nil(), "draft", AttributeType::Boolean).disabled(),
            );

        let names: Vec<&str> = model
            .enabled_attributes()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "title"]);
        assert!(model.attributes.iter().all(|a| a.model_id == model.id));
    }

    #[test]
    fn test_model_without_identity_is_invalid() {
        let mut model = Model::new("User");
        model.attributes.clear();
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("identity"));
    }

    #[test]
    fn test_foreign_attribute_is_invalid() {
        let model = Model::new("User");
        let mut broken = model.clone();
        broken
            .attributes
            .push(Attribute::new(Uuid::new_v4(), "email", AttributeType::Varchar));
        assert!(model.is_valid());
        assert!(!broken.is_valid());
    }
}
