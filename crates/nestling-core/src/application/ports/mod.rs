//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `nestling-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `TemplateStore`: Template storage/retrieval
//!   - `TemplateRenderer`: Template rendering
//!   - `CodegenRunner`: External OpenAPI generator
//!   - `AccessFileParser`: Access-layer source analysis
//!   - `ProgressObserver`: Stage notifications for the front-end
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    AccessFileParser, CodegenRequest, CodegenRunner, Filesystem, NoProgress, ProgressObserver,
    TemplateRenderer, TemplateStore,
};

#[cfg(test)]
pub use output::{
    MockAccessFileParser, MockCodegenRunner, MockFilesystem, MockTemplateRenderer,
    MockTemplateStore,
};
