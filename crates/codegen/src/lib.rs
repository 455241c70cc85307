//! # modelsmith codegen
//!
//! Compiles a model document into the intermediate representation consumed
//! by template renderers.
//!
//! ## Pipeline
//!
//! 1. **Migrate** a raw JSON document to the current schema (`compile_json`)
//! 2. **Normalize** relations: names, cardinalities, FK ownership
//! 3. **Validate** the normalized graph into advisory diagnostics
//! 4. **Build** one [`ModelContext`] per enabled model
//!
//! Every step is a pure function of its input snapshot; compiling the same
//! document twice yields identical output.
//!

// ============================================================================
// Modules
// ============================================================================

pub mod context;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{
    AttributeContext, ContextBuilder, ForeignKeyRef, ModelContext, RelatedModelRef,
    creation_order,
};

use modelsmith_core::{DatabaseType, EngineResult, EnglishInflector, Inflector};
use modelsmith_ir::{Document, migrate, normalize, validation::Validator};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

// ============================================================================
// CompileConfig
// ============================================================================

/// Configuration for the compiler
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Backend override; the project's generator decides when unset
    pub backend: Option<DatabaseType>,

    /// Whether to synthesize `createdAt` / `updatedAt` for audited models
    pub audit_attributes: bool,

    /// Whether to run the conflict validator
    pub validate: bool,

    /// Custom options copied into every [`Compilation`] for renderers
    pub options: BTreeMap<String, String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            backend: None,
            audit_attributes: true,
            validate: true,
            options: BTreeMap::new(),
        }
    }
}

impl CompileConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Project column kinds onto a specific backend
    pub fn with_backend(mut self, backend: DatabaseType) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Do not synthesize audit timestamps
    pub fn without_audit_attributes(mut self) -> Self {
        self.audit_attributes = false;
        self
    }

    /// Skip the conflict validator
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Set a custom option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Backend used for `document`
    pub fn database_for(&self, document: &Document) -> DatabaseType {
        self.backend.unwrap_or_else(|| document.database())
    }
}

// ============================================================================
// Compilation
// ============================================================================

/// Output of one compiler run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Compilation {
    /// One context per enabled model, in document order
    pub contexts: Vec<ModelContext>,

    /// Advisory findings, in order
    pub diagnostics: Vec<String>,

    /// Renderer options from [`CompileConfig::options`]
    pub options: BTreeMap<String, String>,
}

impl Compilation {
    /// Get a context by model id
    pub fn context(&self, id: uuid::Uuid) -> Option<&ModelContext> {
        self.contexts.iter().find(|c| c.id == id)
    }

    /// Get a context by model name
    pub fn context_by_name(&self, name: &str) -> Option<&ModelContext> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a renderer option
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Check if there are any diagnostics
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Contexts ordered so referenced models come first
    pub fn in_creation_order(&self) -> Vec<&ModelContext> {
        creation_order(&self.contexts)
            .into_iter()
            .map(|i| &self.contexts[i])
            .collect()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Compile a current-version document
pub fn compile(
    document: &Document,
    inflector: &dyn Inflector,
    config: &CompileConfig,
) -> Compilation {
    let graph = normalize(document, inflector);

    let mut diagnostics = if config.validate {
        Validator::with_default_rules().validate(&graph)
    } else {
        Default::default()
    };

    let (contexts, build_diagnostics) = ContextBuilder::new(&graph, config).build_all();
    diagnostics.merge(build_diagnostics);

    info!(
        project = %document.project.name,
        models = contexts.len(),
        relations = graph.active_relations().count(),
        diagnostics = diagnostics.len(),
        "compiled document"
    );

    Compilation {
        contexts,
        diagnostics: diagnostics.messages(),
        options: config.options.clone(),
    }
}

/// Migrate a raw JSON document and compile it
pub fn compile_json(
    raw: serde_json::Value,
    inflector: &dyn Inflector,
    config: &CompileConfig,
) -> EngineResult<Compilation> {
    let document = migrate(raw)?;
    Ok(compile(&document, inflector, config))
}

/// Compile with the English inflector and default configuration
pub fn compile_default(document: &Document) -> Compilation {
    compile(document, &EnglishInflector, &CompileConfig::default())
}

// ============================================================================
// Tests
// ============================================================================
