//! Schema version migration
//!
//! Persisted documents carry a `version`. [`migrate`] upgrades any supported
//! version to [`SCHEMA_VERSION`] one step at a time. Each step parses its
//! input with that version's own typed schema, so a malformed document fails
//! at the first step that cannot read it and nothing partial is returned.

use crate::attribute::{Attribute, auth_template};
use crate::{Document, Model, ProjectMeta, Relation, SCHEMA_VERSION};
use modelsmith_core::{EngineError, EngineResult, Validatable};
use serde_json::Value;
use tracing::debug;

/// Oldest version this build can read
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Read the `version` discriminator of a raw document
pub fn document_version(raw: &Value) -> EngineResult<u32> {
    let version = raw
        .get("version")
        .ok_or_else(|| EngineError::InvalidDocument("missing 'version' field".to_string()))?;

    version
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            EngineError::InvalidDocument(format!(
                "'version' must be a positive integer, found {version}"
            ))
        })
}

/// Check if a raw document is older than the current schema
pub fn needs_migration(raw: &Value) -> EngineResult<bool> {
    Ok(document_version(raw)? < SCHEMA_VERSION)
}

/// Upgrade a raw document to the current schema version.
///
/// Documents already at the current version are validated and returned
/// unchanged.
pub fn migrate(raw: Value) -> EngineResult<Document> {
    let mut version = document_version(&raw)?;

    if version > SCHEMA_VERSION {
        return Err(EngineError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    if version < MIN_SUPPORTED_VERSION {
        return Err(EngineError::InvalidDocument(format!(
            "unknown schema version {version}"
        )));
    }

    let mut value = raw;
    while version < SCHEMA_VERSION {
        debug!(from = version, to = version + 1, "migrating document");
        value = step(version, value)?;
        version += 1;
    }

    let document: Document =
        serde_json::from_value(value).map_err(|e| EngineError::InvalidDocument(e.to_string()))?;
    document.validate()?;
    Ok(document)
}

/// Migrate one version at a time
fn step(from: u32, value: Value) -> EngineResult<Value> {
    match from {
        1 => v1::upgrade(value),
        other => Err(EngineError::migration(other, "no migration registered")),
    }
}

// ============================================================================
// Version 1
// ============================================================================

mod v1 {
    //! Version 1 stored foreign keys as ordinary attributes and marked the
    //! auth model with a `role` instead of a project-level reference.

    use super::*;
    use crate::attribute::default_true;
    use modelsmith_core::AttributeType;
    use serde::Deserialize;
    use std::collections::HashSet;
    use uuid::Uuid;

    const AUTH_ROLE: &str = "auth";

    /// Fields re-synthesized on the auth model
    const RESYNTHESIZED: [&str; 2] = ["password", "email"];

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct V1Document {
        #[serde(default)]
        project: V1Project,
        #[serde(default)]
        models: Vec<V1Model>,
        #[serde(default)]
        relations: Vec<Relation>,
    }

    #[derive(Debug, Default, Deserialize)]
    struct V1Project {
        #[serde(default)]
        name: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct V1Model {
        id: Uuid,
        name: String,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        table_name: Option<String>,
        #[serde(default)]
        audit_dates: bool,
        #[serde(default)]
        role: Option<String>,
        #[serde(default)]
        attributes: Vec<V1Attribute>,
        #[serde(default = "default_true")]
        enabled: bool,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct V1Attribute {
        id: Uuid,
        model_id: Uuid,
        name: String,
        #[serde(rename = "type")]
        attribute_type: AttributeType,
        #[serde(default)]
        nullable: bool,
        #[serde(default = "default_true")]
        selectable: bool,
        #[serde(default = "default_true")]
        insertable: bool,
        #[serde(default)]
        default: Option<String>,
        #[serde(default)]
        order: i32,
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default)]
        foreign_key: bool,
    }

    impl From<V1Attribute> for Attribute {
        fn from(a: V1Attribute) -> Self {
            Attribute {
                id: a.id,
                model_id: a.model_id,
                name: a.name,
                attribute_type: a.attribute_type,
                nullable: a.nullable,
                selectable: a.selectable,
                insertable: a.insertable,
                default: a.default,
                order: a.order,
                enabled: a.enabled,
            }
        }
    }

    pub(super) fn upgrade(value: Value) -> EngineResult<Value> {
        let old: V1Document =
            serde_json::from_value(value).map_err(|e| EngineError::migration(1, e.to_string()))?;

        let mut seen = HashSet::new();
        if let Some(dup) = old.models.iter().find(|m| !seen.insert(m.id)) {
            return Err(EngineError::migration(1, format!("duplicate model id {}", dup.id)));
        }

        let mut auth_model_id = None;
        let mut models = Vec::with_capacity(old.models.len());
        for model in old.models {
            let is_auth = model.role.as_deref() == Some(AUTH_ROLE);
            if is_auth && auth_model_id.is_some() {
                debug!(model = %model.name, "ignoring additional auth role");
            }
            let promote = is_auth && auth_model_id.is_none();
            if promote {
                auth_model_id = Some(model.id);
            }
            models.push(upgrade_model(model, promote));
        }

        let mut project = ProjectMeta::new(old.project.name);
        project.user_model_id = auth_model_id;

        let document = Document {
            version: 2,
            project,
            models,
            relations: old.relations,
        };
        serde_json::to_value(&document).map_err(|e| EngineError::migration(1, e.to_string()))
    }

    fn upgrade_model(old: V1Model, is_auth: bool) -> Model {
        let stripped = old.attributes.iter().filter(|a| a.foreign_key).count();
        if stripped > 0 {
            debug!(model = %old.name, stripped, "dropping stored foreign keys");
        }

        let mut attributes: Vec<Attribute> = old
            .attributes
            .into_iter()
            .filter(|a| !a.foreign_key)
            .filter(|a| !(is_auth && RESYNTHESIZED.contains(&a.name.as_str())))
            .map(Attribute::from)
            .collect();

        if is_auth {
            let mut next = attributes.iter().map(|a| a.order).max().unwrap_or(0);
            for mut field in auth_template(old.id) {
                if !RESYNTHESIZED.contains(&field.name.as_str()) {
                    continue;
                }
                next += 1;
                field.order = next;
                attributes.push(field);
            }
        }

        Model {
            id: old.id,
            name: old.name,
            key: old.key,
            table_name: old.table_name,
            audit_dates: old.audit_dates,
            attributes,
            enabled: old.enabled,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
