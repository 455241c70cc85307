//! # Model Context
//!
//! A `ModelContext` is the renderer-ready record for one enabled model. It is
//! built from the normalized graph and holds everything a template needs:
//!
//! - Canonical names (key, singular/plural identifiers, type and table name)
//! - Attributes sorted identity-first with every type projection resolved
//! - Foreign keys this model stores, ordered by their field order
//! - Every relation touching this model, seen from this model's side
//!
//! Contexts refer to each other by model id only.

use crate::CompileConfig;
use heck::ToPascalCase;
use modelsmith_core::catalog::{self, DefaultLiteral, TypeProjection};
use modelsmith_ir::{
    Attribute, AttributeType, Cardinality, DatabaseType, Diagnostic, DiagnosticCode, Diagnostics,
    Model, NormalizedGraph, RelationType,
};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Name of the synthesized creation timestamp
pub const CREATED_AT: &str = "createdAt";

/// Name of the synthesized update timestamp
pub const UPDATED_AT: &str = "updatedAt";

// ============================================================================
// IR records
// ============================================================================

/// Renderer-ready view of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelContext {
    pub id: Uuid,
    pub name: String,
    /// Code key (explicit or camelized name)
    pub key: String,
    pub singular: String,
    pub plural: String,
    /// PascalCase type name
    pub type_name: String,
    pub table_name: String,
    pub audit_dates: bool,
    pub is_auth_model: bool,
    pub attributes: Vec<AttributeContext>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub related_models: Vec<RelatedModelRef>,
}

impl ModelContext {
    /// The identity attribute (always first)
    pub fn identity(&self) -> Option<&AttributeContext> {
        self.attributes.first().filter(|a| a.is_identity)
    }

    /// Get an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeContext> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Get a foreign key by column name
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKeyRef> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Get a related-model reference by field name
    pub fn related(&self, name: &str) -> Option<&RelatedModelRef> {
        self.related_models.iter().find(|r| r.name == name)
    }

    /// Attributes clients may set on insert
    pub fn insertable_attributes(&self) -> impl Iterator<Item = &AttributeContext> {
        self.attributes.iter().filter(|a| a.insertable)
    }

    /// Attributes in default result projections
    pub fn selectable_attributes(&self) -> impl Iterator<Item = &AttributeContext> {
        self.attributes.iter().filter(|a| a.selectable)
    }
}

/// One attribute with its type projections resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeContext {
    /// Absent for synthesized attributes
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub is_identity: bool,
    pub nullable: bool,
    pub selectable: bool,
    pub insertable: bool,
    pub default: Option<DefaultLiteral>,
    pub projection: TypeProjection,
    /// Synthesized by the builder rather than stored in the document
    pub generated: bool,
}

/// A foreign-key column stored on the owning model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRef {
    pub relation_id: Uuid,
    /// Column name (`userId`)
    pub name: String,
    /// Relation field the column backs (`user`)
    pub field_name: String,
    /// Model the key points at
    pub references: Uuid,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub projection: TypeProjection,
    pub optional: bool,
    pub default_to_auth: bool,
    pub order: i32,
}

/// A relation seen from one of the models it touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedModelRef {
    pub relation_id: Uuid,
    pub relation_type: RelationType,
    /// Model on the other end
    pub model_id: Uuid,
    /// Field name on this model
    pub name: String,
    /// Field name with `?` when single-valued and optional
    pub display_name: String,
    pub cardinality: Cardinality,
    pub order: i32,
    /// Whether this model stores the foreign key
    pub is_fk_owner: bool,
}

// ============================================================================
// ContextBuilder
// ============================================================================

/// Builds one `ModelContext` per enabled model of a normalized graph
pub struct ContextBuilder<'g, 'a> {
    graph: &'g NormalizedGraph<'a>,
    database: DatabaseType,
    audit_attributes: bool,
    diagnostics: Diagnostics,
}

impl<'g, 'a> ContextBuilder<'g, 'a> {
    pub fn new(graph: &'g NormalizedGraph<'a>, config: &CompileConfig) -> Self {
        Self {
            graph,
            database: config.database_for(graph.document()),
            audit_attributes: config.audit_attributes,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build every enabled model in document order
    pub fn build_all(mut self) -> (Vec<ModelContext>, Diagnostics) {
        let document = self.graph.document();
        let contexts = document
            .models
            .iter()
            .filter(|m| m.enabled)
            .map(|m| self.build(m))
            .collect();
        (contexts, self.diagnostics)
    }

    /// Build the context of a single model
    pub fn build(&mut self, model: &Model) -> ModelContext {
        let inflector = self.graph.inflector();
        let key = model.resolved_key(inflector);
        let singular = inflector.singularize(&key);
        let user_model_id = self.graph.document().project.user_model_id;

        ModelContext {
            id: model.id,
            name: model.name.clone(),
            type_name: singular.to_pascal_case(),
            plural: inflector.pluralize(&key),
            table_name: model.resolved_table_name(inflector),
            audit_dates: model.audit_dates,
            is_auth_model: user_model_id == Some(model.id),
            attributes: self.attributes(model),
            foreign_keys: self.foreign_keys(model.id),
            related_models: self.related_models(model.id),
            singular,
            key,
        }
    }

    fn attributes(&mut self, model: &Model) -> Vec<AttributeContext> {
        let mut attributes: Vec<AttributeContext> = model
            .enabled_attributes()
            .into_iter()
            .map(|a| self.attribute(model, a))
            .collect();

        if model.audit_dates && self.audit_attributes {
            for name in [CREATED_AT, UPDATED_AT] {
                if !model.has_attribute(name) {
                    attributes.push(self.audit_attribute(name));
                }
            }
        }

        attributes
    }

    fn attribute(&mut self, model: &Model, attribute: &Attribute) -> AttributeContext {
        let default = attribute
            .default
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| {
                let coerced = catalog::coerce_default(attribute.attribute_type, raw);
                if coerced.is_none() {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::InvalidDefault,
                            format!(
                                "Default '{}' of attribute '{}' on model '{}' is not a valid {} and was dropped",
                                raw, attribute.name, model.name, attribute.attribute_type
                            ),
                        )
                        .with_path(format!("models.{}.attributes.{}", model.name, attribute.name)),
                    );
                }
                coerced
            });

        AttributeContext {
            id: Some(attribute.id),
            name: attribute.name.clone(),
            attribute_type: attribute.attribute_type,
            is_identity: attribute.is_identity(),
            nullable: attribute.nullable,
            selectable: attribute.selectable,
            insertable: attribute.insertable,
            default,
            projection: TypeProjection::of(attribute.attribute_type, self.database),
            generated: false,
        }
    }

    fn audit_attribute(&self, name: &str) -> AttributeContext {
        AttributeContext {
            id: None,
            name: name.to_string(),
            attribute_type: AttributeType::Datetime,
            is_identity: false,
            nullable: false,
            selectable: true,
            insertable: false,
            default: Some(DefaultLiteral::Now),
            projection: TypeProjection::of(AttributeType::Datetime, self.database),
            generated: true,
        }
    }

    fn foreign_keys(&self, model_id: Uuid) -> Vec<ForeignKeyRef> {
        let mut keys: Vec<ForeignKeyRef> = self
            .graph
            .active_relations()
            .filter(|r| r.owner_model_id() == Some(model_id))
            .filter_map(|relation| {
                let referenced = relation.referenced_end()?;
                let name = relation.foreign_key_name()?;
                let identity_type = self
                    .graph
                    .model(referenced.model_id)
                    .and_then(Model::identity)
                    .map(|a| a.attribute_type)
                    .unwrap_or(AttributeType::Id);
                let attribute_type = catalog::foreign_key_type(identity_type);

                Some(ForeignKeyRef {
                    relation_id: relation.relation_id,
                    name,
                    field_name: referenced.name.clone(),
                    references: referenced.model_id,
                    attribute_type,
                    projection: TypeProjection::of(attribute_type, self.database),
                    optional: relation.optional,
                    default_to_auth: relation.defaults_to_auth(),
                    order: referenced.order,
                })
            })
            .collect();

        keys.sort_by_key(|fk| fk.order);
        keys
    }

    fn related_models(&self, model_id: Uuid) -> Vec<RelatedModelRef> {
        let mut related: Vec<RelatedModelRef> = self
            .graph
            .active_relations()
            .flat_map(|relation| {
                relation.ends_held_by(model_id).map(move |end| RelatedModelRef {
                    relation_id: relation.relation_id,
                    relation_type: relation.relation_type,
                    model_id: end.model_id,
                    name: end.name.clone(),
                    display_name: relation.display_name(end.side),
                    cardinality: end.cardinality,
                    order: end.order,
                    is_fk_owner: relation.fk_owner == Some(end.side.opposite()),
                })
            })
            .collect();

        related.sort_by_key(|r| r.order);
        related
    }
}

// ============================================================================
// Creation order
// ============================================================================

/// Indices of `contexts` ordered so that every model comes after the models
/// its foreign keys reference. Models caught in a cycle are appended in
/// their original order.
pub fn creation_order(contexts: &[ModelContext]) -> Vec<usize> {
    let n = contexts.len();
    let id_to_idx: HashMap<Uuid, usize> = contexts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut in_degree = vec![0u32; n];
    let mut adj: Vec<Vec<usize>> = vec![vec![]; n];

    for (i, context) in contexts.iter().enumerate() {
        for fk in &context.foreign_keys {
            if let Some(&dep_idx) = id_to_idx.get(&fk.references)
                && dep_idx != i
            {
                adj[dep_idx].push(i);
                in_degree[i] += 1;
            }
        }
    }

    // Kahn's algorithm, FIFO so independent models keep document order
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted: Vec<usize> = Vec::with_capacity(n);
    let mut placed = vec![false; n];

    while let Some(node) = queue.pop_front() {
        sorted.push(node);
        placed[node] = true;
        for &neighbor in &adj[node] {
            in_degree[neighbor] -= 1;
            if in_degree[neighbor] == 0 {
                queue.push_back(neighbor);
            }
        }
    }

    sorted.extend((0..n).filter(|&i| !placed[i]));
    sorted
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use modelsmith_core::{EnglishInflector, FilterKind, SourceType};
    use modelsmith_ir::{Document, Relation, Side, normalize};
    use pretty_assertions::assert_eq;

    fn build(doc: &Document) -> (Vec<ModelContext>, Diagnostics) {
        let graph = normalize(doc, &EnglishInflector);
        ContextBuilder::new(&graph, &CompileConfig::default()).build_all()
    }

    #[test]
    fn test_canonical_names() {
        let mut doc = Document::new("Blog");
        doc.add_model(Model::new("Blog Post"));
        let (contexts, _) = build(&doc);

        let post = &contexts[0];
        assert_eq!(post.key, "blogPost");
        assert_eq!(post.singular, "blogPost");
        assert_eq!(post.plural, "blogPosts");
        assert_eq!(post.type_name, "BlogPost");
        assert_eq!(post.table_name, "blogPosts");
    }

    #[test]
    fn test_attribute_projection_and_order() {
        let mut doc = Document::new("Blog");
        let post = doc.add_model(Model::new("Post"));
        doc.add_attribute(
            post,
            Attribute::new(post, "views", AttributeType::Int).with_order(5),
        )
        .unwrap();
        doc.add_attribute(
            post,
            Attribute::new(post, "title", AttributeType::Varchar).with_order(1),
        )
        .unwrap();
        doc.add_attribute(
            post,
            Attribute::new(post, "draft", AttributeType::Boolean).disabled(),
        )
        .unwrap();

        let (contexts, _) = build(&doc);
        let names: Vec<&str> = contexts[0].attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "views"]);

        let views = contexts[0].attribute("views").unwrap();
        assert_eq!(views.projection.source, SourceType::Number);
        assert_eq!(views.projection.wire, "Int");
        assert_eq!(views.projection.filter, FilterKind::NumberFilter);
        assert!(contexts[0].identity().is_some());
    }

    #[test]
    fn test_audit_attributes_synthesized() {
        let mut doc = Document::new("Blog");
        doc.add_model(Model::new("Post").with_audit_dates());
        let (contexts, _) = build(&doc);

        let created = contexts[0].attribute(CREATED_AT).unwrap();
        assert!(created.generated);
        assert!(!created.insertable);
        assert_eq!(created.default, Some(DefaultLiteral::Now));
        assert!(contexts[0].attribute(UPDATED_AT).is_some());

        let graph = normalize(&doc, &EnglishInflector);
        let config = CompileConfig::default().without_audit_attributes();
        let (contexts, _) = ContextBuilder::new(&graph, &config).build_all();
        assert!(contexts[0].attribute(CREATED_AT).is_none());
    }

    #[test]
    fn test_invalid_default_dropped_with_diagnostic() {
        let mut doc = Document::new("Blog");
        let post = doc.add_model(Model::new("Post"));
        doc.add_attribute(
            post,
            Attribute::new(post, "views", AttributeType::Int).with_default("many"),
        )
        .unwrap();
        doc.add_attribute(
            post,
            Attribute::new(post, "rating", AttributeType::Float).with_default("4.5"),
        )
        .unwrap();

        let (contexts, diagnostics) = build(&doc);
        assert_eq!(contexts[0].attribute("views").unwrap().default, None);
        assert_eq!(
            contexts[0].attribute("rating").unwrap().default,
            Some(DefaultLiteral::Float(4.5))
        );
        assert!(diagnostics.has_code(DiagnosticCode::InvalidDefault));
    }

    #[test]
    fn test_foreign_key_type_follows_identity() {
        let mut doc = Document::new("Shop");
        let mut customer = Model::new("Customer");
        customer.attributes[0].attribute_type = AttributeType::AutoIncrement;
        let customer = doc.add_model(customer);
        let order = doc.add_model(Model::new("Purchase"));
        doc.add_relation(Relation::many_to_one(order, customer));

        let (contexts, _) = build(&doc);
        let fk = contexts[1].foreign_key("customerId").unwrap();
        assert_eq!(fk.attribute_type, AttributeType::Int);
        assert_eq!(fk.references, customer);
        assert_eq!(fk.field_name, "customer");
        assert!(contexts[0].foreign_keys.is_empty());
    }

    #[test]
    fn test_foreign_keys_sorted_by_order() {
        let mut doc = Document::new("Blog");
        let user = doc.add_model(Model::new("User"));
        let topic = doc.add_model(Model::new("Topic"));
        let post = doc.add_model(Model::new("Post"));
        doc.add_relation(Relation::one_to_many(user, post).with_orders(9, 0));
        doc.add_relation(Relation::one_to_many(topic, post).with_orders(2, 0));

        let (contexts, _) = build(&doc);
        let names: Vec<&str> = contexts[2]
            .foreign_keys
            .iter()
            .map(|fk| fk.name.as_str())
            .collect();
        assert_eq!(names, vec!["topicId", "userId"]);
    }

    #[test]
    fn test_self_relation_related_refs() {
        let mut doc = Document::new("Org");
        let employee = doc.add_model(Model::new("Employee"));
        doc.add_relation(
            Relation::one_to_many(employee, employee)
                .with_source_name("manager")
                .with_target_name("reports")
                .optional(),
        );

        let (contexts, _) = build(&doc);
        let ctx = &contexts[0];
        assert_eq!(ctx.related_models.len(), 2);

        let manager = ctx.related("manager").unwrap();
        assert_eq!(manager.display_name, "manager?");
        assert!(manager.is_fk_owner);
        let reports = ctx.related("reports").unwrap();
        assert_eq!(reports.cardinality, Cardinality::Many);
        assert!(!reports.is_fk_owner);
        assert!(ctx.foreign_key("managerId").unwrap().optional);
    }

    #[test]
    fn test_disabled_relation_excluded() {
        let mut doc = Document::new("Blog");
        let user = doc.add_model(Model::new("User"));
        let post = doc.add_model(Model::new("Post"));
        doc.add_relation(Relation::one_to_many(user, post).disabled());
        doc.add_relation(Relation::one_to_one(user, Uuid::new_v4()));

        let (contexts, _) = build(&doc);
        assert!(contexts.iter().all(|c| c.related_models.is_empty()));
        assert!(contexts.iter().all(|c| c.foreign_keys.is_empty()));
    }

    #[test]
    fn test_auth_flags() {
        let mut doc = Document::new("Blog");
        let user = doc.add_model(Model::new("User"));
        let post = doc.add_model(Model::new("Post"));
        doc.add_relation(Relation::one_to_many(user, post).default_to_auth(Side::Target));
        doc.set_auth_model(Some(user)).unwrap();

        let (contexts, _) = build(&doc);
        assert!(contexts[0].is_auth_model);
        let password = contexts[0].attribute("password").unwrap();
        assert!(!password.selectable);
        assert_eq!(contexts[0].selectable_attributes().count(), 3);
        assert!(contexts[1].foreign_key("userId").unwrap().default_to_auth);
    }

    #[test]
    fn test_creation_order() {
        let mut doc = Document::new("Blog");
        let comment = doc.add_model(Model::new("Comment"));
        let post = doc.add_model(Model::new("Post"));
        let user = doc.add_model(Model::new("User"));
        doc.add_relation(Relation::many_to_one(comment, post));
        doc.add_relation(Relation::many_to_one(post, user));

        let (contexts, _) = build(&doc);
        let order: Vec<&str> = creation_order(&contexts)
            .into_iter()
            .map(|i| contexts[i].name.as_str())
            .collect();
        assert_eq!(order, vec!["User", "Post", "Comment"]);
    }

    #[test]
    fn test_creation_order_with_cycle() {
        let mut doc = Document::new("Loop");
        let a = doc.add_model(Model::new("Alpha"));
        let b = doc.add_model(Model::new("Beta"));
        doc.add_model(Model::new("Gamma"));
        doc.add_relation(Relation::many_to_one(a, b));
        doc.add_relation(Relation::many_to_one(b, a));

        let (contexts, _) = build(&doc);
        assert_eq!(creation_order(&contexts), vec![2, 0, 1]);
    }
}
