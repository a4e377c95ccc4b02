//! Nestling Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Nestling
//! service generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           nestling-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GenerationService, TemplateService)   │
//! │  Scaffold → Reconcile → Codegen → Merge │
//! │            → Synthesize                 │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  Filesystem, TemplateStore, Renderer,   │
//! │  CodegenRunner, AccessFileParser        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    nestling-adapters (Infrastructure)   │
//! │ (LocalFilesystem, OpenApiGeneratorCli)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ProjectDescriptor, RuleTable, Layout,  │
//! │  AccessFileDescriptor, emit_controller) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nestling_core::{
//!     application::{GenerationRequest, GenerationService},
//!     domain::{ProjectDescriptor, TemplateId},
//! };
//!
//! // 1. Describe the service
//! let descriptor = ProjectDescriptor::builder()
//!     .application("shop")
//!     .service("pet")
//!     .api_spec("./petstore.yaml")
//!     .build()?;
//!
//! // 2. Run the pipeline (with injected adapters)
//! let service = GenerationService::new(store, renderer, filesystem, codegen, parser);
//! let report = service.generate(GenerationRequest::new(
//!     descriptor,
//!     TemplateId::parse("nest-modular")?,
//!     ".",
//! ))?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CodegenOutcome, ConflictPolicy, GenerationReport, GenerationRequest, GenerationService,
        GenerationSettings, TemplateInfo, TemplateService,
        ports::{
            AccessFileParser, CodegenRequest, CodegenRunner, Filesystem, ProgressObserver,
            TemplateRenderer, TemplateStore,
        },
    };
    pub use crate::domain::{
        AccessFileDescriptor, AccessOperation, HttpMethod, ManifestEntry, ModuleLayout,
        ProjectDescriptor, ProjectStructure, RenderContext, Template, TemplateId,
        TemplateMetadata, Transform,
    };
    pub use crate::error::{NestlingError, NestlingResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
