//! Infrastructure adapters for Nestling.
//!
//! This crate implements the ports defined in `nestling-core::application::ports`.
//! It contains all external dependencies and I/O operations: disk access, the
//! template directory loader, the OpenAPI generator subprocess and access-file
//! parsing.

pub mod access_parser;
pub mod builtin_templates;
pub mod codegen;
pub mod filesystem;
pub mod renderer;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use access_parser::RegexAccessParser;
pub use codegen::{CodegenSettings, OpenApiGeneratorCli};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::StrictRenderer;
pub use template_store::InMemoryStore;
