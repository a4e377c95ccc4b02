//! Application layer for Nestling.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerationService, TemplateService)
//!   and the pipeline stages they compose
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Report**: What a run did, serializable for `--output-format json`
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer; rules and layouts
//! live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod report;
pub mod services;

// Re-export main services
pub use services::{
    ConflictPolicy, GenerationRequest, GenerationService, GenerationSettings, TemplateInfo,
    TemplateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    AccessFileParser, CodegenRequest, CodegenRunner, Filesystem, NoProgress, ProgressObserver,
    TemplateRenderer, TemplateStore,
};

pub use report::{
    AppliedOperation, CodegenOutcome, GenerationReport, OperationOutcome, PipelineStage, RunId,
    SynthesizedController,
};

pub use error::ApplicationError;
