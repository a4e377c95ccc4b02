//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `nestling-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::application::report::PipelineStage;
use crate::domain::{
    AccessFileDescriptor, ProjectStructure, RenderContext, Template, TemplateId,
};
use crate::error::NestlingResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `nestling_adapters::filesystem::LocalFilesystem` (production)
/// - `nestling_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Paths are absolute by the time they reach this port
/// - "Not found" is observable through `exists`; callers that tolerate missing
///   sources check first, so every error returned here is fatal
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> NestlingResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> NestlingResult<()>;

    fn read_to_string(&self, path: &Path) -> NestlingResult<String>;

    /// Copy a file, or a directory tree recursively, creating parents of `to`.
    ///
    /// Existing files under `to` are overwritten.
    fn copy(&self, from: &Path, to: &Path) -> NestlingResult<()>;

    /// Rename a file or directory. The parent of `to` must exist.
    fn rename(&self, from: &Path, to: &Path) -> NestlingResult<()>;

    fn remove_file(&self, path: &Path) -> NestlingResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> NestlingResult<()>;

    /// Direct children of a directory, sorted by name.
    fn list_dir(&self, path: &Path) -> NestlingResult<Vec<PathBuf>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;
}

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `nestling_adapters::template_store::InMemoryStore` (discovered templates)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Get a template by id. A bare name matches any version.
    fn get(&self, id: &TemplateId) -> NestlingResult<Template>;

    /// List all available templates.
    fn list(&self) -> NestlingResult<Vec<Template>>;

    /// Insert or update a template.
    fn insert(&self, template: Template) -> NestlingResult<()>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `nestling_adapters::renderer::StrictRenderer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render a template into a project structure rooted at `output_root`.
    ///
    /// Unresolved placeholders in parameterized entries are an error.
    fn render(
        &self,
        template: &Template,
        context: &RenderContext,
        output_root: &Path,
    ) -> NestlingResult<ProjectStructure>;
}

/// One invocation of the external generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenRequest {
    /// Local path or URL of the API specification.
    pub spec_source: String,
    /// Directory the generator writes into; created and owned by the caller.
    pub output_dir: PathBuf,
}

/// Port for the external OpenAPI generator.
///
/// Implemented by:
/// - `nestling_adapters::codegen::OpenApiGeneratorCli`
#[cfg_attr(test, mockall::automock)]
pub trait CodegenRunner: Send + Sync {
    /// Run the generator and block until it exits.
    ///
    /// Launch failure or a non-zero exit is `ApplicationError::CodegenFailed`.
    fn generate(&self, request: &CodegenRequest) -> NestlingResult<()>;

    /// Human-readable command line, for logs and dry runs.
    fn describe(&self, request: &CodegenRequest) -> String;
}

/// Port for reading the operation set out of an access-layer file.
///
/// Implemented by:
/// - `nestling_adapters::access_parser::RegexAccessParser`
#[cfg_attr(test, mockall::automock)]
pub trait AccessFileParser: Send + Sync {
    fn parse(&self, file_name: &str, source: &str) -> NestlingResult<AccessFileDescriptor>;
}

/// Port for stage progress notifications (spinners, progress bars).
///
/// Both methods default to no-ops.
pub trait ProgressObserver: Send + Sync {
    fn stage_started(&self, _stage: PipelineStage) {}

    fn stage_finished(&self, _stage: PipelineStage, _success: bool) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}
