//! Relation normalization
//!
//! Resolves, for every relation and each of its two ends, the field name and
//! cardinality of the reference, and decides which model owns the foreign
//! key. Also hosts the two structural editing operations that change FK
//! placement: splitting a many-to-many relation and swapping a one-to-one.
//!
//! Normalization is a pure function of the document snapshot and the
//! injected [`Inflector`]. Relations that cannot be resolved (missing or
//! unknown ends) are skipped here and reported by the validator.

use crate::{Document, Model, Relation};
use modelsmith_core::{Cardinality, EngineError, EngineResult, Inflector, RelationType, Side};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Suffix appended to the FK column name
pub const FOREIGN_KEY_SUFFIX: &str = "Id";

// ============================================================================
// Resolved relation ends
// ============================================================================

/// One resolved end of a relation.
///
/// The end's `name` is the field through which the *opposite* model refers
/// to `model_id`; that field lives on `holder_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEnd {
    pub side: Side,
    pub model_id: Uuid,
    pub holder_id: Uuid,
    pub name: String,
    pub cardinality: Cardinality,
    pub order: i32,
    pub default_to_auth: bool,
}

/// A relation with both ends resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRelation {
    pub relation_id: Uuid,
    pub relation_type: RelationType,
    pub source: ResolvedEnd,
    pub target: ResolvedEnd,
    pub fk_owner: Option<Side>,
    pub optional: bool,
    /// Relation enabled and both end models enabled
    pub active: bool,
}

impl NormalizedRelation {
    /// End on the given side
    pub fn end(&self, side: Side) -> &ResolvedEnd {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Name with a `?` suffix when the end is single-valued and optional
    pub fn display_name(&self, side: Side) -> String {
        let end = self.end(side);
        if self.optional && end.cardinality == Cardinality::One {
            format!("{}?", end.name)
        } else {
            end.name.clone()
        }
    }

    /// Model that stores the foreign-key column
    pub fn owner_model_id(&self) -> Option<Uuid> {
        self.fk_owner.map(|side| self.end(side).model_id)
    }

    /// End the foreign key points at (the side opposite the owner)
    pub fn referenced_end(&self) -> Option<&ResolvedEnd> {
        self.fk_owner.map(|side| self.end(side.opposite()))
    }

    /// FK column name: `{referenced end name}Id`
    pub fn foreign_key_name(&self) -> Option<String> {
        self.referenced_end()
            .map(|end| format!("{}{}", end.name, FOREIGN_KEY_SUFFIX))
    }

    /// Whether the owner side asked for the key to default to the auth user
    pub fn defaults_to_auth(&self) -> bool {
        self.fk_owner
            .map(|side| self.end(side).default_to_auth)
            .unwrap_or(false)
    }

    /// Ends whose field lives on `model_id`; two for a self-relation
    pub fn ends_held_by(&self, model_id: Uuid) -> impl Iterator<Item = &ResolvedEnd> {
        [&self.source, &self.target]
            .into_iter()
            .filter(move |end| end.holder_id == model_id)
    }
}

/// Why a relation was left out of the normalized graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingEnd(Side),
    UnknownModel(Side, Uuid),
}

// ============================================================================
// NormalizedGraph
// ============================================================================

/// Arena view of a document with every resolvable relation normalized
#[derive(Clone)]
pub struct NormalizedGraph<'a> {
    document: &'a Document,
    inflector: &'a dyn Inflector,
    model_index: HashMap<Uuid, usize>,
    relations: Vec<NormalizedRelation>,
    skipped: Vec<(Uuid, SkipReason)>,
}

impl<'a> NormalizedGraph<'a> {
    /// The snapshot this graph was built from
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The inflector names were resolved with
    pub fn inflector(&self) -> &'a dyn Inflector {
        self.inflector
    }

    /// Look up a model through the arena index
    pub fn model(&self, id: Uuid) -> Option<&'a Model> {
        let document = self.document;
        self.model_index.get(&id).map(|&index| &document.models[index])
    }

    /// Whether `id` names an enabled model
    pub fn is_model_enabled(&self, id: Uuid) -> bool {
        self.model(id).is_some_and(|m| m.enabled)
    }

    /// All normalized relations, in document order
    pub fn relations(&self) -> &[NormalizedRelation] {
        &self.relations
    }

    /// Normalized relations that take part in generation
    pub fn active_relations(&self) -> impl Iterator<Item = &NormalizedRelation> {
        self.relations.iter().filter(|r| r.active)
    }

    /// Active relations touching `model_id` from either side
    pub fn relations_touching(&self, model_id: Uuid) -> impl Iterator<Item = &NormalizedRelation> {
        self.active_relations()
            .filter(move |r| r.source.model_id == model_id || r.target.model_id == model_id)
    }

    /// Relations that could not be resolved
    pub fn skipped(&self) -> &[(Uuid, SkipReason)] {
        &self.skipped
    }
}

/// Normalize every relation of `document`
pub fn normalize<'a>(document: &'a Document, inflector: &'a dyn Inflector) -> NormalizedGraph<'a> {
    let model_index = document.model_index();
    let mut relations = Vec::with_capacity(document.relations.len());
    let mut skipped = Vec::new();

    for relation in &document.relations {
        match resolve(relation, document, &model_index, inflector) {
            Ok(normalized) => relations.push(normalized),
            Err(reason) => {
                debug!(relation = %relation.id, ?reason, "skipping unresolved relation");
                skipped.push((relation.id, reason));
            }
        }
    }

    NormalizedGraph {
        document,
        inflector,
        model_index,
        relations,
        skipped,
    }
}

fn resolve(
    relation: &Relation,
    document: &Document,
    model_index: &HashMap<Uuid, usize>,
    inflector: &dyn Inflector,
) -> Result<NormalizedRelation, SkipReason> {
    let lookup = |side: Side| -> Result<&Model, SkipReason> {
        let id = relation.model_id(side).ok_or(SkipReason::MissingEnd(side))?;
        model_index
            .get(&id)
            .map(|&index| &document.models[index])
            .ok_or(SkipReason::UnknownModel(side, id))
    };

    let source_model = lookup(Side::Source)?;
    let target_model = lookup(Side::Target)?;

    let source = resolve_end(relation, Side::Source, source_model, target_model, inflector);
    let target = resolve_end(relation, Side::Target, target_model, source_model, inflector);

    Ok(NormalizedRelation {
        relation_id: relation.id,
        relation_type: relation.relation_type,
        source,
        target,
        fk_owner: relation.relation_type.fk_owner(),
        optional: relation.optional,
        active: relation.enabled && source_model.enabled && target_model.enabled,
    })
}

fn resolve_end(
    relation: &Relation,
    side: Side,
    model: &Model,
    holder: &Model,
    inflector: &dyn Inflector,
) -> ResolvedEnd {
    let cardinality = relation.relation_type.cardinality(side);
    let base = match relation.name_override(side) {
        Some(name) => name.to_string(),
        None => model.resolved_key(inflector),
    };
    let name = match cardinality {
        Cardinality::One => inflector.singularize(&base),
        Cardinality::Many => inflector.pluralize(&base),
    };

    ResolvedEnd {
        side,
        model_id: model.id,
        holder_id: holder.id,
        name,
        cardinality,
        order: relation.order(side),
        default_to_auth: relation.defaults_to_auth(side),
    }
}

// ============================================================================
// Structural editing operations
// ============================================================================

/// Replace a many-to-many relation with a joining model and two
/// one-to-many relations pointing at it.
///
/// The joining model is named by concatenating both model names. Each
/// original end keeps its name override and order slot on the field that
/// refers to it from the joining model.
pub fn split_many_to_many(document: &Document, relation_id: Uuid) -> EngineResult<Document> {
    let relation = document
        .relation(relation_id)
        .ok_or(EngineError::RelationNotFound(relation_id))?;

    if !relation.relation_type.requires_split() {
        return Err(EngineError::invalid_operation(
            "split",
            format!(
                "only many-to-many relations can be split, found {}",
                relation.relation_type
            ),
        ));
    }

    let end_model = |side: Side| -> EngineResult<&Model> {
        let id = relation.model_id(side).ok_or_else(|| {
            EngineError::invalid_operation("split", format!("relation has no {} model", side))
        })?;
        document.model(id).ok_or(EngineError::ModelNotFound(id))
    };
    let source = end_model(Side::Source)?;
    let target = end_model(Side::Target)?;

    let joiner = Model::new(format!("{}{}", source.name, target.name));
    let joiner_id = joiner.id;

    let mut to_source = Relation::one_to_many(source.id, joiner_id);
    to_source.source_name = relation.source_name.clone();
    to_source.target_order = relation.target_order;
    to_source.enabled = relation.enabled;

    let mut to_target = Relation::one_to_many(target.id, joiner_id);
    to_target.source_name = relation.target_name.clone();
    to_target.target_order = relation.source_order;
    to_target.enabled = relation.enabled;

    debug!(
        relation = %relation_id,
        joiner = %joiner.name,
        "splitting many-to-many relation"
    );

    let mut result = document.clone();
    let index = result
        .relations
        .iter()
        .position(|r| r.id == relation_id)
        .ok_or(EngineError::RelationNotFound(relation_id))?;
    result.relations.remove(index);
    result.relations.insert(index, to_target);
    result.relations.insert(index, to_source);
    result.models.push(joiner);
    Ok(result)
}

/// Move FK ownership of a one-to-one relation to the opposite model
pub fn swap_foreign_key(document: &Document, relation_id: Uuid) -> EngineResult<Document> {
    let mut result = document.clone();
    let relation = result
        .relations
        .iter_mut()
        .find(|r| r.id == relation_id)
        .ok_or(EngineError::RelationNotFound(relation_id))?;

    *relation = relation.swapped()?;
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================
