//! Controller synthesizer - one route-handling file per access-layer file.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ports::{AccessFileParser, Filesystem},
        report::SynthesizedController,
    },
    domain::{ModuleLayout, emit_controller, is_access_file},
    error::NestlingResult,
};

#[derive(Debug, Default)]
pub struct SynthesisOutput {
    pub controllers: Vec<SynthesizedController>,
    pub warnings: Vec<String>,
}

pub struct ControllerSynthesizer<'a> {
    filesystem: &'a dyn Filesystem,
    parser: &'a dyn AccessFileParser,
}

impl<'a> ControllerSynthesizer<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, parser: &'a dyn AccessFileParser) -> Self {
        Self { filesystem, parser }
    }

    /// Scan the module's `services` directory and emit controllers.
    ///
    /// Zero access files is not an error. Existing controller files are never
    /// overwritten. A file that cannot be read, parsed or written becomes a
    /// warning and the remaining files are still processed.
    #[instrument(skip_all, fields(service = layout.service()))]
    pub fn synthesize(&self, layout: &ModuleLayout, root: &Path) -> NestlingResult<SynthesisOutput> {
        let fs = self.filesystem;
        let services_dir = root.join(layout.services_dir());
        let controllers_dir = root.join(layout.controllers_dir());
        let mut output = SynthesisOutput::default();

        if !fs.is_dir(&services_dir) {
            debug!(path = %services_dir.display(), "No services directory, nothing to synthesize");
            return Ok(output);
        }

        let base_service = layout.base_service_file_name();
        let access_files: Vec<_> = fs
            .list_dir(&services_dir)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| is_access_file(name) && name != base_service)
            })
            .collect();

        if access_files.is_empty() {
            info!("No access-layer files found");
            return Ok(output);
        }

        fs.create_dir_all(&controllers_dir)?;

        for path in access_files {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            match self.synthesize_file(layout, &controllers_dir, &path, &file_name, &mut output) {
                Ok(Some(controller)) => output.controllers.push(controller),
                Ok(None) => {}
                Err(e) => {
                    let msg = format!("{file_name}: controller not synthesized: {e}");
                    warn!("{msg}");
                    output.warnings.push(msg);
                }
            }
        }

        Ok(output)
    }

    /// `Ok(None)` when the target controller already exists.
    fn synthesize_file(
        &self,
        layout: &ModuleLayout,
        controllers_dir: &Path,
        path: &Path,
        file_name: &str,
        output: &mut SynthesisOutput,
    ) -> NestlingResult<Option<SynthesizedController>> {
        let fs = self.filesystem;
        let source = fs.read_to_string(path)?;
        let descriptor = self.parser.parse(file_name, &source)?;

        if descriptor.operations().is_empty() {
            let msg = format!("{file_name}: no exported operations found");
            warn!("{msg}");
            output.warnings.push(msg);
        }

        let generated = emit_controller(&descriptor)?;
        let relative = layout.controllers_dir().join(&generated.file_name);
        let target = controllers_dir.join(&generated.file_name);
        if fs.exists(&target) {
            let msg = format!("{} already exists, not overwriting", relative.display());
            warn!("{msg}");
            output.warnings.push(msg);
            return Ok(None);
        }

        fs.write_file(&target, &generated.content)?;
        info!(
            controller = %generated.file_name,
            handlers = generated.handler_names.len(),
            "Synthesized controller"
        );
        Ok(Some(SynthesizedController {
            path: relative.to_string_lossy().replace('\\', "/"),
            class_name: generated.class_name,
            source_file: generated.source_file,
            handlers: generated.handler_names,
        }))
    }
}
