//! Template domain aggregate and variable binding.
//!
//! Templates are the static half of a generation run: a read-only tree of
//! files, some parameterized and some copied verbatim. The dynamic half is the
//! [`RenderContext`], derived once from the [`ProjectDescriptor`].
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Template Domain                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Template (Aggregate Root)                                  │
//! │  ├── TemplateId (Entity)                                    │
//! │  ├── TemplateMetadata (Value Object) - Human-readable info  │
//! │  └── TemplateManifest (Value Object) - What to write        │
//! │       └── Vec<ManifestEntry>                                │
//! │            (source, destination, transform, content)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RenderContext (Value Object)                               │
//! │  └── Strict substitution: {{SERVICE}} -> "pet"              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! ### Literal vs Parameterized
//!
//! Pass-through files (dot files, README, lint configs) are `Verbatim` and
//! never touch the binder, so a stray `{{` in a README cannot fail a run.
//!
//! ### Strict rendering
//!
//! An `{{UPPER_CASE}}` placeholder with no binding is an error, reported with
//! every missing name at once. Anything between braces that does not look
//! like a variable name (JSX object literals, Handlebars helpers) is left
//! untouched.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::domain::{
    entities::{common::RelativePath, descriptor::ProjectDescriptor},
    error::DomainError,
};

/// Names of the variables every template can rely on.
pub mod vars {
    pub const APPLICATION: &str = "APPLICATION";
    pub const SERVICE: &str = "SERVICE";
    pub const SERVICE_CLASS: &str = "SERVICE_CLASS";
    pub const VERSION: &str = "VERSION";
    pub const OPENAPI: &str = "OPENAPI";
}

/// Variable binding for template rendering.
///
/// Immutable after creation - transformations create new instances (see `with_variable`).
///
/// ## Built-in Variables
///
/// | Variable | Example | Source |
/// |----------|---------|--------|
/// | `APPLICATION` | "demo" | descriptor |
/// | `SERVICE` | "pet" | descriptor |
/// | `SERVICE_CLASS` | "Pet" | capitalized service |
/// | `VERSION` | "1.0.0" | descriptor |
/// | `OPENAPI` | "./petstore.yaml" | descriptor, empty when absent |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    // BTreeMap keeps `variables()` output deterministic for dry-run listings.
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    /// Bind all template variables from a descriptor.
    pub fn from_descriptor(descriptor: &ProjectDescriptor) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(
            vars::APPLICATION.to_string(),
            descriptor.application_name().to_string(),
        );
        variables.insert(
            vars::SERVICE.to_string(),
            descriptor.service_name().to_string(),
        );
        variables.insert(
            vars::SERVICE_CLASS.to_string(),
            descriptor.service_class_name(),
        );
        variables.insert(vars::VERSION.to_string(), descriptor.version().to_string());
        variables.insert(
            vars::OPENAPI.to_string(),
            descriptor.api_spec_source().unwrap_or_default().to_string(),
        );
        Self { variables }
    }

    /// Empty context; mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }

    /// Add or override a variable, consuming self and returning a new context.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render a template string by replacing `{{VARIABLE}}` placeholders.
    ///
    /// # Edge Cases
    ///
    /// - `{{ SERVICE }}` → whitespace inside braces is ignored
    /// - `{{UNKNOWN}}` → `UnresolvedPlaceholders` error naming `UNKNOWN`
    /// - `{{ a: 1 }}` → not a variable name, copied as-is
    /// - unterminated `{{` → copied as-is
    pub fn render(&self, template: &str) -> Result<String, DomainError> {
        let mut out = String::with_capacity(template.len());
        let mut unresolved: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];

            let Some(close) = after_open.find("}}") else {
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };

            let inner = after_open[..close].trim();
            if is_variable_name(inner) {
                match self.variables.get(inner) {
                    Some(value) => out.push_str(value),
                    None => {
                        if !unresolved.iter().any(|n| n == inner) {
                            unresolved.push(inner.to_string());
                        }
                    }
                }
            } else {
                out.push_str(&rest[open..open + 2 + close + 2]);
            }
            rest = &after_open[close + 2..];
        }
        out.push_str(rest);

        if unresolved.is_empty() {
            Ok(out)
        } else {
            Err(DomainError::UnresolvedPlaceholders { names: unresolved })
        }
    }
}

fn is_variable_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

// ============================================================================
// Template Identity
// ============================================================================

/// Unique identifier for a template type.
///
/// Human-readable form: `name@version` (e.g., `nest-modular@1.0.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId {
    name: String,
    version: String,
}

impl TemplateId {
    /// # Panics
    ///
    /// Panics if name contains `@`. This is a programming error, not a runtime error.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        assert!(
            !name.contains('@'),
            "Template name cannot contain @: {}",
            name
        );
        Self { name, version }
    }

    /// Parse `name@version`, or a bare `name` (version left empty, matches any).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = s.split('@').collect();
        match parts.as_slice() {
            [name] if !name.is_empty() => Ok(Self::new(*name, "")),
            [name, version] if !name.is_empty() && !version.is_empty() => {
                Ok(Self::new(*name, *version))
            }
            _ => Err(DomainError::InvalidTemplate(format!(
                "Invalid template ID format: {}. Expected 'name' or 'name@version'",
                s
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether `other` is selected by this id (empty version matches any).
    pub fn selects(&self, other: &TemplateId) -> bool {
        self.name == other.name && (self.version.is_empty() || self.version == other.version)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, self.version)
        }
    }
}

// ============================================================================
// Core Template Aggregate
// ============================================================================

/// A reusable project blueprint.
///
/// ## Invariants (enforced by `validate()`)
///
/// 1. `id.name` is non-empty
/// 2. `metadata.name` is non-empty
/// 3. `manifest` is non-empty
/// 4. All destination paths in `manifest` are unique
#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub metadata: TemplateMetadata,
    pub manifest: TemplateManifest,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.name().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Template name cannot be empty".into(),
            ));
        }

        if self.metadata.name.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Metadata name cannot be empty".into(),
            ));
        }

        if self.manifest.is_empty() {
            return Err(DomainError::EmptyTemplate {
                template_id: self.id.to_string(),
            });
        }

        self.manifest.validate()
    }
}

/// Builder for constructing templates.
///
/// `build()` enforces `id`, `metadata`, and a non-empty manifest.
#[derive(Default)]
pub struct TemplateBuilder {
    id: Option<TemplateId>,
    metadata: Option<TemplateMetadata>,
    manifest: TemplateManifest,
}

impl TemplateBuilder {
    pub fn id(mut self, id: TemplateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the entire manifest at once (replaces any previous entries).
    pub fn manifest(mut self, manifest: TemplateManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Add a single entry (accumulates).
    pub fn add_entry(mut self, entry: ManifestEntry) -> Self {
        self.manifest.push(entry);
        self
    }

    pub fn build(self) -> Result<Template, DomainError> {
        if self.manifest.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Template manifest cannot be empty".into(),
            ));
        }

        Ok(Template {
            id: self
                .id
                .ok_or(DomainError::MissingRequiredField { field: "id" })?,
            metadata: self
                .metadata
                .ok_or(DomainError::MissingRequiredField { field: "metadata" })?,
            manifest: self.manifest,
        })
    }
}

// ============================================================================
// Template Metadata
// ============================================================================

/// Human-readable information about a template.
#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl TemplateMetadata {
    /// Other fields default to: empty description, version "0.1.0",
    /// author "Nestling", no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: "0.1.0".to_string(),
            author: "Nestling".to_string(),
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn version(mut self, ver: impl Into<String>) -> Self {
        self.version = ver.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

// ============================================================================
// Template Manifest - The "What"
// ============================================================================

/// Ordered list of files a template produces.
///
/// Entries are written in order; destinations must be unique within one run.
#[derive(Debug, Clone, Default)]
pub struct TemplateManifest {
    pub entries: Vec<ManifestEntry>,
}

impl TemplateManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn with_entry(mut self, entry: ManifestEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let dest = entry.destination.to_slash();
            if !seen.insert(dest.clone()) {
                return Err(DomainError::DuplicatePath { path: dest });
            }
        }
        Ok(())
    }

    pub fn verbatim_entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(|e| e.transform == Transform::CopyVerbatim)
    }
}

/// How an entry's content reaches the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Substitute bound variables; unresolved placeholders fail the run.
    Render,
    /// Byte-for-byte copy, bindings ignored.
    CopyVerbatim,
}

/// One `(source, destination, transform)` entry plus its content.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub source: RelativePath,
    pub destination: RelativePath,
    pub transform: Transform,
    pub content: TemplateSource,
}

impl ManifestEntry {
    /// Entry written at the same relative path it was read from.
    pub fn new(
        path: impl Into<RelativePath>,
        transform: Transform,
        content: impl Into<TemplateSource>,
    ) -> Self {
        let path = path.into();
        Self {
            destination: path.clone(),
            source: path,
            transform,
            content: content.into(),
        }
    }

    pub fn rendered(path: impl Into<RelativePath>, content: impl Into<TemplateSource>) -> Self {
        Self::new(path, Transform::Render, content)
    }

    pub fn verbatim(path: impl Into<RelativePath>, content: impl Into<TemplateSource>) -> Self {
        Self::new(path, Transform::CopyVerbatim, content)
    }

    pub fn to(mut self, destination: impl Into<RelativePath>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Produce the final file content for this entry.
    pub fn materialize(&self, ctx: &RenderContext) -> Result<String, DomainError> {
        match self.transform {
            Transform::CopyVerbatim => Ok(self.content.as_str().to_string()),
            Transform::Render => ctx.render(self.content.as_str()).map_err(|e| match e {
                DomainError::UnresolvedPlaceholders { names } => {
                    DomainError::InvalidTemplate(format!(
                        "'{}' references unresolved placeholders: {}",
                        self.source,
                        names.join(", ")
                    ))
                }
                other => other,
            }),
        }
    }
}

/// Source of template content: either compile-time or runtime.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Compile-time string literal (e.g., `include_str!("main.ts")`)
    Static(&'static str),

    /// Runtime-owned string (filesystem-loaded templates)
    Owned(String),
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }

    /// Quick heuristic used by loaders to auto-detect parameterized files.
    pub fn contains_placeholder(&self) -> bool {
        self.as_str().contains("{{") && self.as_str().contains("}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet_context() -> RenderContext {
        let d = ProjectDescriptor::builder()
            .application("shop")
            .service("pet")
            .build()
            .unwrap();
        RenderContext::from_descriptor(&d)
    }

    #[test]
    fn binds_all_standard_variables() {
        let ctx = pet_context();
        assert_eq!(ctx.get(vars::APPLICATION), Some("shop"));
        assert_eq!(ctx.get(vars::SERVICE), Some("pet"));
        assert_eq!(ctx.get(vars::SERVICE_CLASS), Some("Pet"));
        assert_eq!(ctx.get(vars::VERSION), Some("1.0.0"));
        assert_eq!(ctx.get(vars::OPENAPI), Some(""));
    }

    #[test]
    fn renders_known_placeholders() {
        let out = pet_context()
            .render("export class {{SERVICE_CLASS}}Module {} // {{ SERVICE }}")
            .unwrap();
        assert_eq!(out, "export class PetModule {} // pet");
    }

    #[test]
    fn unresolved_placeholders_are_reported_once_each() {
        let err = pet_context()
            .render("{{MISSING}} {{SERVICE}} {{MISSING}} {{OTHER}}")
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::UnresolvedPlaceholders {
                names: vec!["MISSING".into(), "OTHER".into()]
            }
        );
    }

    #[test]
    fn non_variable_braces_are_left_alone() {
        let src = "const style = {{ color: 'red' }}; {{lower}} {{";
        assert_eq!(pet_context().render(src).unwrap(), src);
    }

    #[test]
    fn verbatim_entries_skip_binding() {
        let entry = ManifestEntry::verbatim("README.md", "Hello {{NOT_BOUND}}");
        assert_eq!(
            entry.materialize(&RenderContext::empty()).unwrap(),
            "Hello {{NOT_BOUND}}"
        );
    }

    #[test]
    fn manifest_rejects_duplicate_destinations() {
        let manifest = TemplateManifest::new()
            .with_entry(ManifestEntry::verbatim("a.ts", ""))
            .with_entry(ManifestEntry::verbatim("b.ts", "").to("a.ts"));
        assert!(matches!(
            manifest.validate(),
            Err(DomainError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn template_builder_rejects_empty_manifest() {
        let result = Template::builder()
            .id(TemplateId::new("t", "1.0.0"))
            .metadata(TemplateMetadata::new("T"))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn template_id_parsing() {
        let id = TemplateId::parse("nest-modular@2.0.0").unwrap();
        assert_eq!(id.name(), "nest-modular");
        assert_eq!(id.version(), "2.0.0");

        let bare = TemplateId::parse("nest-modular").unwrap();
        assert!(bare.selects(&id));
        assert!(!TemplateId::parse("nest-modular@1.0.0").unwrap().selects(&id));

        assert!(TemplateId::parse("too@many@ats").is_err());
        assert!(TemplateId::parse("").is_err());
    }
}
