//! Application services - orchestrate use cases.
//!
//! `GenerationService` drives a run end to end; the other services are the
//! pipeline stages it composes, each usable on its own.

pub mod codegen;
pub mod controller_synthesizer;
pub mod generation_service;
pub mod reconciler;
pub mod scaffold_writer;
pub mod template_service;

pub use codegen::{ArtifactMerger, CodegenWorkspace};
pub use controller_synthesizer::{ControllerSynthesizer, SynthesisOutput};
pub use generation_service::{
    DEFAULT_CODEGEN_DIR, GenerationRequest, GenerationService, GenerationSettings,
};
pub use reconciler::{ConflictPolicy, FileReconciler};
pub use scaffold_writer::{ScaffoldOutput, ScaffoldWriter};
pub use template_service::{TemplateInfo, TemplateService};
