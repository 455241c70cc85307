//! Conflict validation for normalized documents
//!
//! Validation is advisory: every rule runs, findings are collected as
//! [`Diagnostic`]s into an ordered, de-duplicated [`Diagnostics`] list, and
//! nothing here ever fails the pipeline.
//!
//! Collision and reserved-word scans only look at enabled models, attributes
//! and relations. Structural checks cover the whole document.

use crate::normalize::{NormalizedGraph, SkipReason};
use crate::{Model, Relation};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Case-insensitive SQL keywords rejected as model, attribute, or relation
/// names
pub const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "begin", "between", "by", "case", "cast", "check",
    "column", "commit", "constraint", "create", "cross", "current_date", "current_time",
    "current_timestamp", "database", "default", "delete", "desc", "distinct", "drop", "else",
    "end", "except", "exists", "false", "fetch", "foreign", "from", "full", "function", "grant",
    "group", "having", "in", "index", "inner", "insert", "intersect", "into", "is", "join",
    "key", "left", "like", "limit", "natural", "not", "null", "offset", "on", "or", "order",
    "outer", "primary", "procedure", "references", "returning", "revoke", "right", "rollback",
    "schema", "select", "set", "table", "then", "transaction", "trigger", "true", "union",
    "unique", "update", "using", "values", "view", "when", "where", "with",
];

/// Additional words rejected in table position
pub const RESERVED_TABLE_WORDS: &[&str] = &["window"];

/// Check a name against the reserved keyword list
pub fn is_reserved(name: &str) -> bool {
    let lower = name.to_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

/// Check a table name against the reserved keyword list
pub fn is_reserved_table(name: &str) -> bool {
    let lower = name.to_lowercase();
    is_reserved(&lower) || RESERVED_TABLE_WORDS.contains(&lower.as_str())
}

// ============================================================================
// Diagnostic
// ============================================================================

/// Codes for programmatic handling of diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Collisions
    DuplicateModelName,
    DuplicateTableName,
    DuplicateAttributeName,
    FieldCollision,
    DuplicateRelationName,
    DuplicateForeignKey,
    ReservedWord,

    // Structure
    EmptyModelName,
    MissingIdentity,
    EmptyAttributeName,
    AttributeOwnerMismatch,
    IncompleteRelation,
    DanglingRelation,
    MissingAuthModel,

    // Auth defaults
    DefaultToAuthWithoutAuthModel,
    DefaultToAuthTarget,

    // Generation
    InvalidDefault,
}

/// One advisory finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Code for programmatic handling
    pub code: DiagnosticCode,

    /// Human-readable message
    pub message: String,

    /// Path to the offending element (e.g., "models.User.attributes.email")
    pub path: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path to the diagnostic
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Ordered list of distinct diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    seen: HashSet<String>,
}

impl Diagnostics {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic unless an identical message is already present
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.to_string()) {
            self.items.push(diagnostic);
        }
    }

    /// Append every diagnostic of `other`, keeping order
    pub fn merge(&mut self, other: Diagnostics) {
        for diagnostic in other.items {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any diagnostic carries `code`
    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Rendered messages, in order
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule: Send + Sync {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Inspect a normalized graph and report findings
    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics;
}

// ============================================================================
// Validator
// ============================================================================

/// Runs every registered rule and merges their findings
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a validator without rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(ModelNamesRule));
        validator.add_rule(Box::new(AttributeNamesRule));
        validator.add_rule(Box::new(RelationNamesRule));
        validator.add_rule(Box::new(ReservedWordsRule));
        validator.add_rule(Box::new(CompletenessRule));
        validator.add_rule(Box::new(DefaultToAuthRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule
    pub fn validate(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for rule in &self.rules {
            diagnostics.merge(rule.check(graph));
        }
        diagnostics
    }
}

/// Run the default rules against `graph`
pub fn validate(graph: &NormalizedGraph<'_>) -> Diagnostics {
    Validator::with_default_rules().validate(graph)
}

// ============================================================================
// Helpers
// ============================================================================

fn enabled_models<'a>(graph: &NormalizedGraph<'a>) -> impl Iterator<Item = &'a Model> {
    graph.document().models.iter().filter(|m| m.enabled)
}

fn model_path(model: &Model) -> String {
    format!("models.{}", model.name)
}

fn relation_path(relation: &Relation) -> String {
    format!("relations.{}", relation.id)
}

fn model_label(graph: &NormalizedGraph<'_>, id: Uuid) -> String {
    graph
        .model(id)
        .map(|m| format!("'{}'", m.name))
        .unwrap_or_else(|| id.to_string())
}

/// Relation fields and FK columns projected onto `model_id`, in document
/// order
fn projected_fields(graph: &NormalizedGraph<'_>, model_id: Uuid) -> Vec<(String, FieldKind)> {
    let mut fields = Vec::new();
    for relation in graph.active_relations() {
        for end in relation.ends_held_by(model_id) {
            fields.push((end.name.clone(), FieldKind::Relation));
        }
        if relation.owner_model_id() == Some(model_id)
            && let Some(fk) = relation.foreign_key_name()
        {
            fields.push((fk, FieldKind::ForeignKey));
        }
    }
    fields
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Relation,
    ForeignKey,
}

impl FieldKind {
    fn label(&self) -> &'static str {
        match self {
            FieldKind::Relation => "relation field",
            FieldKind::ForeignKey => "foreign key",
        }
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: model and table names are unique
pub struct ModelNamesRule;

impl ValidationRule for ModelNamesRule {
    fn name(&self) -> &'static str {
        "model_names"
    }

    fn description(&self) -> &'static str {
        "Validates that enabled models have unique names and table names"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut tables: HashMap<String, &Model> = HashMap::new();

        for model in enabled_models(graph) {
            if model.name.is_empty() {
                continue;
            }

            if !names.insert(model.name.to_lowercase()) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::DuplicateModelName,
                        format!("Duplicate model name: '{}'", model.name),
                    )
                    .with_path(model_path(model)),
                );
            }

            let table = model.resolved_table_name(graph.inflector());
            if let Some(other) = tables.get(&table.to_lowercase()) {
                if !other.name.eq_ignore_ascii_case(&model.name) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateTableName,
                            format!(
                                "Models '{}' and '{}' both map to table '{}'",
                                other.name, model.name, table
                            ),
                        )
                        .with_path(model_path(model)),
                    );
                }
            } else {
                tables.insert(table.to_lowercase(), model);
            }
        }

        diagnostics
    }
}

/// Rule: attribute names are unique within a model, including against the
/// relation fields and FK columns projected onto it
pub struct AttributeNamesRule;

impl ValidationRule for AttributeNamesRule {
    fn name(&self) -> &'static str {
        "attribute_names"
    }

    fn description(&self) -> &'static str {
        "Validates attribute names against siblings and projected relation fields"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for model in enabled_models(graph) {
            let projected = projected_fields(graph, model.id);
            let mut seen: HashSet<String> = HashSet::new();

            for attribute in model.enabled_attributes() {
                if attribute.name.is_empty() {
                    continue;
                }
                let path = format!("{}.attributes.{}", model_path(model), attribute.name);

                if !seen.insert(attribute.name.to_lowercase()) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::DuplicateAttributeName,
                            format!(
                                "Duplicate attribute name '{}' on model '{}'",
                                attribute.name, model.name
                            ),
                        )
                        .with_path(&path),
                    );
                }

                for (field, kind) in &projected {
                    if field.eq_ignore_ascii_case(&attribute.name) {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticCode::FieldCollision,
                                format!(
                                    "Attribute '{}' on model '{}' conflicts with {} '{}'",
                                    attribute.name,
                                    model.name,
                                    kind.label(),
                                    field
                                ),
                            )
                            .with_path(&path),
                        );
                    }
                }
            }
        }

        diagnostics
    }
}

/// Rule: two relations never project the same field onto one model
pub struct RelationNamesRule;

impl ValidationRule for RelationNamesRule {
    fn name(&self) -> &'static str {
        "relation_names"
    }

    fn description(&self) -> &'static str {
        "Validates that relation fields on the same model do not collide"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for model in enabled_models(graph) {
            let mut counts: Vec<(String, FieldKind, usize)> = Vec::new();
            for (name, kind) in projected_fields(graph, model.id) {
                let key = name.to_lowercase();
                match counts.iter_mut().find(|(n, k, _)| *k == kind && *n == key) {
                    Some((_, _, count)) => *count += 1,
                    None => counts.push((key, kind, 1)),
                }
            }

            let relation_names: HashSet<String> = counts
                .iter()
                .filter(|(_, kind, _)| *kind == FieldKind::Relation)
                .map(|(name, _, _)| name.clone())
                .collect();

            for (name, kind, count) in &counts {
                if *count > 1 {
                    let code = match kind {
                        FieldKind::Relation => DiagnosticCode::DuplicateRelationName,
                        FieldKind::ForeignKey => DiagnosticCode::DuplicateForeignKey,
                    };
                    diagnostics.push(
                        Diagnostic::new(
                            code,
                            format!(
                                "{} '{}' is defined {} times on model '{}'",
                                capitalize(kind.label()),
                                name,
                                count,
                                model.name
                            ),
                        )
                        .with_path(model_path(model)),
                    );
                } else if *kind == FieldKind::ForeignKey && relation_names.contains(name) {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::FieldCollision,
                            format!(
                                "Foreign key '{}' on model '{}' conflicts with a relation field",
                                name, model.name
                            ),
                        )
                        .with_path(model_path(model)),
                    );
                }
            }
        }

        diagnostics
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rule: no reserved SQL keywords in names
pub struct ReservedWordsRule;

impl ValidationRule for ReservedWordsRule {
    fn name(&self) -> &'static str {
        "reserved_words"
    }

    fn description(&self) -> &'static str {
        "Validates that names do not use reserved SQL keywords"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let reserved = |name: &str, what: String, path: String| {
            Diagnostic::new(
                DiagnosticCode::ReservedWord,
                format!("'{}' is a reserved word ({})", name, what),
            )
            .with_path(path)
        };

        for model in enabled_models(graph) {
            if is_reserved(&model.name) {
                diagnostics.push(reserved(&model.name, "model name".into(), model_path(model)));
            }

            let table = model.resolved_table_name(graph.inflector());
            if is_reserved_table(&table) {
                diagnostics.push(reserved(
                    &table,
                    format!("table of model '{}'", model.name),
                    model_path(model),
                ));
            }

            for attribute in model.enabled_attributes() {
                if is_reserved(&attribute.name) {
                    diagnostics.push(reserved(
                        &attribute.name,
                        format!("attribute of model '{}'", model.name),
                        format!("{}.attributes.{}", model_path(model), attribute.name),
                    ));
                }
            }

            for (field, kind) in projected_fields(graph, model.id) {
                if kind == FieldKind::Relation && is_reserved(&field) {
                    diagnostics.push(reserved(
                        &field,
                        format!("relation field of model '{}'", model.name),
                        model_path(model),
                    ));
                }
            }
        }

        diagnostics
    }
}

/// Rule: the document is structurally complete
pub struct CompletenessRule;

impl ValidationRule for CompletenessRule {
    fn name(&self) -> &'static str {
        "completeness"
    }

    fn description(&self) -> &'static str {
        "Validates that every model, attribute and relation is complete"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let document = graph.document();

        for model in &document.models {
            let path = if model.name.is_empty() {
                format!("models.{}", model.id)
            } else {
                model_path(model)
            };

            if model.name.is_empty() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::EmptyModelName,
                        format!("Model {} has an empty name", model.id),
                    )
                    .with_path(&path),
                );
            }

            if model.identity().is_none() {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::MissingIdentity,
                        format!("Model '{}' has no identity attribute", model.name),
                    )
                    .with_path(&path),
                );
            }

            for attribute in &model.attributes {
                if attribute.name.is_empty() {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::EmptyAttributeName,
                            format!(
                                "Attribute {} on model '{}' has an empty name",
                                attribute.id, model.name
                            ),
                        )
                        .with_path(format!("{}.attributes.{}", path, attribute.id)),
                    );
                }

                if attribute.model_id != model.id {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticCode::AttributeOwnerMismatch,
                            format!(
                                "Attribute '{}' on model '{}' claims to belong to model {}",
                                attribute.name, model.name, attribute.model_id
                            ),
                        )
                        .with_path(format!("{}.attributes.{}", path, attribute.name)),
                    );
                }
            }
        }

        for (relation_id, reason) in graph.skipped() {
            let Some(relation) = document.relation(*relation_id) else {
                continue;
            };
            let diagnostic = match reason {
                SkipReason::MissingEnd(side) => Diagnostic::new(
                    DiagnosticCode::IncompleteRelation,
                    format!("Relation {} has no {} model", relation.id, side),
                ),
                SkipReason::UnknownModel(side, id) => Diagnostic::new(
                    DiagnosticCode::DanglingRelation,
                    format!(
                        "Relation {} references missing {} model {}",
                        relation.id, side, id
                    ),
                ),
            };
            diagnostics.push(diagnostic.with_path(relation_path(relation)));
        }

        if let Some(id) = document.project.user_model_id
            && graph.model(id).is_none()
        {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::MissingAuthModel,
                    format!("Auth model {} does not exist", id),
                )
                .with_path("project.userModelId"),
            );
        }

        diagnostics
    }
}

/// Rule: keys that default to the authenticated user reference the auth
/// model
pub struct DefaultToAuthRule;

impl ValidationRule for DefaultToAuthRule {
    fn name(&self) -> &'static str {
        "default_to_auth"
    }

    fn description(&self) -> &'static str {
        "Validates that auth-defaulted foreign keys reference the auth model"
    }

    fn check(&self, graph: &NormalizedGraph<'_>) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let document = graph.document();
        let auth_model = document.auth_model();

        for relation in graph.active_relations() {
            if !relation.defaults_to_auth() {
                continue;
            }
            let (Some(owner), Some(referenced), Some(fk)) = (
                relation.owner_model_id(),
                relation.referenced_end(),
                relation.foreign_key_name(),
            ) else {
                continue;
            };
            let Some(source) = document.relation(relation.relation_id) else {
                continue;
            };

            let diagnostic = match auth_model {
                None => Diagnostic::new(
                    DiagnosticCode::DefaultToAuthWithoutAuthModel,
                    format!(
                        "Foreign key '{}' on model {} defaults to the authenticated user but no auth model is set",
                        fk,
                        model_label(graph, owner)
                    ),
                ),
                Some(auth) if auth.id != referenced.model_id => Diagnostic::new(
                    DiagnosticCode::DefaultToAuthTarget,
                    format!(
                        "Foreign key '{}' on model {} defaults to the authenticated user but references {} instead of '{}'",
                        fk,
                        model_label(graph, owner),
                        model_label(graph, referenced.model_id),
                        auth.name
                    ),
                ),
                Some(_) => continue,
            };
            diagnostics.push(diagnostic.with_path(relation_path(source)));
        }

        diagnostics
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::{Attribute, Document};
    use modelsmith_core::{AttributeType, EnglishInflector, Side};

    fn run(doc: &Document) -> Diagnostics {
        let graph = normalize(doc, &EnglishInflector);
        validate(&graph)
    }

    fn blog() -> (Document, Uuid, Uuid) {
        let mut doc = Document::new("Blog");
        let user = doc.add_model(Model::new("User"));
        let post = doc.add_model(Model::new("Post"));
        doc.add_relation(Relation::one_to_many(user, post));
        (doc, user, post)
    }

    #[test]
    fn test_clean_document() {
        let (doc, _, _) = blog();
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn test_diagnostics_dedup() {
        let mut diagnostics = Diagnostics::new();
        let d = Diagnostic::new(DiagnosticCode::ReservedWord, "same").with_path("a");
        diagnostics.push(d.clone());
        diagnostics.push(d);
        diagnostics.push(Diagnostic::new(DiagnosticCode::ReservedWord, "same"));
        assert_eq!(diagnostics.messages(), vec!["[a] same", "same"]);
    }

    #[test]
    fn test_duplicate_model_names() {
        let (mut doc, _, _) = blog();
        doc.add_model(Model::new("user"));
        let diagnostics = run(&doc);
        assert!(diagnostics.has_code(DiagnosticCode::DuplicateModelName));

        let (mut doc, _, _) = blog();
        doc.add_model(Model::new("user").disabled());
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn test_duplicate_table_names() {
        let (mut doc, _, _) = blog();
        doc.add_model(Model::new("Article").with_table_name("posts"));
        let diagnostics = run(&doc);
        assert!(diagnostics.has_code(DiagnosticCode::DuplicateTableName));
    }

    #[test]
    fn test_attribute_collides_with_relation_field() {
        let (mut doc, user, _) = blog();
        doc.add_attribute(user, Attribute::new(user, "posts", AttributeType::Int))
            .unwrap();
        let diagnostics = run(&doc);
        assert!(diagnostics.has_code(DiagnosticCode::FieldCollision));

        doc.relations[0].target_name = Some("articles".into());
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn test_attribute_collides_with_foreign_key() {
        let (mut doc, _, post) = blog();
        doc.add_attribute(post, Attribute::new(post, "userId", AttributeType::Id))
            .unwrap();
        let messages = run(&doc).messages();
        assert!(messages.iter().any(|m| m.contains("foreign key 'userId'")));
    }

    #[test]
    fn test_duplicate_attribute_names() {
        let (mut doc, _, post) = blog();
        doc.add_attribute(post, Attribute::new(post, "title", AttributeType::Text))
            .unwrap();
        doc.add_attribute(post, Attribute::new(post, "Title", AttributeType::Text))
            .unwrap();
        assert!(run(&doc).has_code(DiagnosticCode::DuplicateAttributeName));
    }

    #[test]
    fn test_unnamed_parallel_relations_collide() {
        let (mut doc, user, post) = blog();
        doc.add_relation(Relation::one_to_many(user, post));
        let messages = run(&doc).messages();

        assert!(messages.iter().any(|m| m.contains("'posts'") && m.contains("'User'")));
        assert!(messages.iter().any(|m| m.contains("'user'") && m.contains("'Post'")));
    }

    #[test]
    fn test_reserved_words() {
        let mut doc = Document::new("Shop");
        let order = doc.add_model(Model::new("Order"));
        doc.add_attribute(order, Attribute::new(order, "select", AttributeType::Varchar))
            .unwrap();
        doc.add_model(Model::new("Frame").with_table_name("window"));
        doc.add_model(Model::new("Window"));

        let messages = run(&doc).messages();
        assert!(messages.iter().any(|m| m.contains("'Order' is a reserved word (model name)")));
        assert!(messages.iter().any(|m| m.contains("'select'")));
        assert!(
            messages
                .iter()
                .any(|m| m.contains("'window' is a reserved word (table of model 'Frame')"))
        );
        assert!(!messages.iter().any(|m| m.contains("'Window'")));
        assert!(!is_reserved("user"));
        assert!(is_reserved_table("WINDOW"));
        assert!(!is_reserved("window"));
    }

    #[test]
    fn test_structural_incompleteness() {
        let (mut doc, user, _) = blog();
        let mut incomplete = Relation::one_to_one(user, user);
        incomplete.target_id = None;
        doc.add_relation(incomplete);
        doc.add_relation(Relation::many_to_one(user, Uuid::new_v4()));

        let mut nameless = Model::new("");
        nameless.attributes.clear();
        nameless.enabled = false;
        doc.add_model(nameless);
        doc.project.user_model_id = Some(Uuid::new_v4());

        let diagnostics = run(&doc);
        for code in [
            DiagnosticCode::IncompleteRelation,
            DiagnosticCode::DanglingRelation,
            DiagnosticCode::EmptyModelName,
            DiagnosticCode::MissingIdentity,
            DiagnosticCode::MissingAuthModel,
        ] {
            assert!(diagnostics.has_code(code), "{code:?}");
        }
    }

    #[test]
    fn test_reserved_relation_name() {
        let (mut doc, user, post) = blog();
        doc.relations[0] = Relation::one_to_many(user, post).with_target_name("select");
        let diagnostics = run(&doc);
        assert!(diagnostics.has_code(DiagnosticCode::ReservedWord));
        assert!(
            diagnostics
                .messages()
                .iter()
                .any(|m| m.contains("'select' is a reserved word (relation field of model 'User')"))
        );

        doc.relations[0].target_name = Some("articles".into());
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn test_disabled_relation_still_reports_missing_end() {
        let (mut doc, user, _) = blog();
        let mut incomplete = Relation::one_to_many(user, user).disabled();
        incomplete.target_id = None;
        let id = doc.add_relation(incomplete);

        let diagnostics = run(&doc);
        assert!(diagnostics.has_code(DiagnosticCode::IncompleteRelation));
        assert!(
            diagnostics
                .messages()
                .iter()
                .any(|m| m.contains(&format!("Relation {} has no target model", id)))
        );
    }

    #[test]
    fn test_default_to_auth() {
        let (mut doc, user, post) = blog();
        doc.relations[0] = Relation::one_to_many(user, post).default_to_auth(Side::Target);
        assert!(run(&doc).has_code(DiagnosticCode::DefaultToAuthWithoutAuthModel));

        doc.set_auth_model(Some(user)).unwrap();
        assert!(run(&doc).is_empty());

        doc.set_auth_model(Some(post)).unwrap();
        assert!(run(&doc).has_code(DiagnosticCode::DefaultToAuthTarget));
    }

    #[test]
    fn test_custom_rule_set() {
        let mut validator = Validator::new();
        validator.add_rule(Box::new(ReservedWordsRule));
        assert_eq!(validator.rule_names(), vec!["reserved_words"]);
        assert_eq!(Validator::with_default_rules().rule_names().len(), 6);
    }
}
