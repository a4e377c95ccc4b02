//! Generation Service - main application orchestrator.
//!
//! This service coordinates one generation run:
//! 1. Validate the descriptor and the reconciliation rule table
//! 2. Resolve and render the template with bound variables
//! 3. Write the base tree and module directories
//! 4. Reconcile the base tree (relocate, prune, rename)
//! 5. If an API spec was supplied: run codegen, merge its output, synthesize
//!    controllers. Failures here degrade the run instead of aborting it.
//!
//! Every event is emitted inside a `generation` span carrying the run id.

use std::path::{Path, PathBuf};

use tracing::{error, info, info_span, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{
            AccessFileParser, CodegenRequest, CodegenRunner, Filesystem, NoProgress,
            ProgressObserver, TemplateRenderer, TemplateStore,
        },
        report::{
            AppliedOperation, CodegenOutcome, GenerationReport, OperationOutcome, PipelineStage,
            RunId,
        },
        services::{
            codegen::{ArtifactMerger, CodegenWorkspace},
            controller_synthesizer::ControllerSynthesizer,
            reconciler::{ConflictPolicy, FileReconciler},
            scaffold_writer::ScaffoldWriter,
        },
    },
    domain::{
        DomainValidator as validator, ModuleLayout, ProjectDescriptor, ProjectStructure,
        RenderContext, RuleTable, TemplateId, layout::DEFAULT_CONTROLLER_SOURCE,
    },
    error::{NestlingError, NestlingResult},
};

/// Default name of the temporary codegen directory under the destination root.
pub const DEFAULT_CODEGEN_DIR: &str = "__openapi-temp__";

/// Knobs that come from configuration rather than from the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub conflict_policy: ConflictPolicy,
    pub codegen_dir_name: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::default(),
            codegen_dir_name: DEFAULT_CODEGEN_DIR.to_string(),
        }
    }
}

/// One invocation of the pipeline.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub descriptor: ProjectDescriptor,
    pub template: TemplateId,
    /// Parent directory of the destination root.
    pub output_dir: PathBuf,
    pub force: bool,
    pub dry_run: bool,
    pub skip_codegen: bool,
}

impl GenerationRequest {
    pub fn new(
        descriptor: ProjectDescriptor,
        template: TemplateId,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            descriptor,
            template,
            output_dir: output_dir.into(),
            force: false,
            dry_run: false,
            skip_codegen: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn skip_codegen(mut self, skip: bool) -> Self {
        self.skip_codegen = skip;
        self
    }
}

/// Main generation service.
pub struct GenerationService {
    store: Box<dyn TemplateStore>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
    codegen: Box<dyn CodegenRunner>,
    parser: Box<dyn AccessFileParser>,
    observer: Box<dyn ProgressObserver>,
    settings: GenerationSettings,
}

impl GenerationService {
    /// Create a new generation service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use nestling_core::application::GenerationService;
    ///
    /// let service = GenerationService::new(
    ///     store,      // impl TemplateStore
    ///     renderer,   // impl TemplateRenderer
    ///     filesystem, // impl Filesystem
    ///     codegen,    // impl CodegenRunner
    ///     parser,     // impl AccessFileParser
    /// );
    /// ```
    pub fn new(
        store: Box<dyn TemplateStore>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
        codegen: Box<dyn CodegenRunner>,
        parser: Box<dyn AccessFileParser>,
    ) -> Self {
        Self {
            store,
            renderer,
            filesystem,
            codegen,
            parser,
            observer: Box::new(NoProgress),
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the pipeline for one descriptor.
    pub fn generate(&self, request: GenerationRequest) -> NestlingResult<GenerationReport> {
        let run_id = RunId::new();
        let span = info_span!(
            "generation",
            run_id = %run_id,
            service = request.descriptor.service_name()
        );
        let _enter = span.enter();

        let GenerationRequest {
            descriptor,
            template: template_id,
            output_dir,
            force,
            dry_run,
            skip_codegen,
        } = request;

        let spec_requested = descriptor.has_api_spec();
        let descriptor = if skip_codegen {
            descriptor.without_api_spec()
        } else {
            descriptor
        };

        // 1. Validate inputs and the static rule table
        validator::validate_descriptor(&descriptor)?;
        let layout = ModuleLayout::new(descriptor.service_name());
        let rules = layout.rule_table();
        validator::validate_rule_table(&rules)?;

        let root = output_dir.join(descriptor.destination_root_name());
        if self.filesystem.exists(&root) && !force {
            return Err(ApplicationError::DestinationExists { path: root }.into());
        }

        // 2. Resolve and render
        let template = self.store.get(&template_id)?;
        validator::validate_template(&template)?;
        info!(template = %template.id, root = %root.display(), "Template resolved");

        let structure = self.stage(PipelineStage::Render, || {
            let context = RenderContext::from_descriptor(&descriptor);
            let structure = self.renderer.render(&template, &context, &root)?;
            validator::validate_project_structure(&structure)?;
            Ok(structure)
        })?;

        let mut report = GenerationReport::new(run_id, root.clone(), template.id.to_string());
        report.has_api_spec = descriptor.has_api_spec();
        if spec_requested && skip_codegen {
            report.codegen = CodegenOutcome::Skipped {
                reason: "codegen disabled for this run".into(),
            };
        }

        if dry_run {
            self.plan(&mut report, &structure, &layout, &rules, &descriptor);
            info!(
                files = report.files_written.len(),
                operations = report.operations.len(),
                "Dry run complete"
            );
            return Ok(report);
        }

        // 3. Write base tree
        let written = self.stage(PipelineStage::Scaffold, || {
            ScaffoldWriter::new(self.filesystem.as_ref()).write(&structure, &layout)
        })?;
        report.files_written = written.files_written;
        report.operations = written.operations;

        // 4. Reconcile
        let reconciled = self.stage(PipelineStage::Reconcile, || {
            FileReconciler::new(self.filesystem.as_ref(), self.settings.conflict_policy).reconcile(
                &rules,
                &root,
                descriptor.has_api_spec(),
            )
        })?;
        report.operations.extend(reconciled);
        report.scaffold_complete = true;

        // 5. Codegen branch (never fatal)
        if let Some(spec) = descriptor.api_spec_source() {
            let outcome = match self.run_codegen(spec, &root, &layout, &mut report) {
                Ok(outcome) => outcome,
                Err((stage, e)) => {
                    let outcome = self.degrade(stage, e, &mut report);
                    self.restore_default_controller(&structure, &layout, &mut report);
                    outcome
                }
            };
            report.codegen = outcome;
        }

        info!(
            files = report.files_written.len(),
            controllers = report.controllers.len(),
            degraded = report.codegen.is_degraded(),
            "Generation complete"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn stage<T>(
        &self,
        stage: PipelineStage,
        f: impl FnOnce() -> NestlingResult<T>,
    ) -> NestlingResult<T> {
        self.observer.stage_started(stage);
        let result = f();
        self.observer.stage_finished(stage, result.is_ok());
        result
    }

    fn run_codegen(
        &self,
        spec: &str,
        root: &Path,
        layout: &ModuleLayout,
        report: &mut GenerationReport,
    ) -> Result<CodegenOutcome, (PipelineStage, NestlingError)> {
        let fs = self.filesystem.as_ref();
        let request = CodegenRequest {
            spec_source: spec.to_string(),
            output_dir: root.join(&self.settings.codegen_dir_name),
        };
        info!(command = %self.codegen.describe(&request), "Running code generator");

        let workspace = CodegenWorkspace::acquire(fs, request.output_dir.clone())
            .map_err(|e| (PipelineStage::Codegen, e))?;

        self.stage(PipelineStage::Codegen, || self.codegen.generate(&request))
            .map_err(|e| (PipelineStage::Codegen, e))?;

        let merged = self
            .stage(PipelineStage::Merge, || {
                ArtifactMerger::new(fs).merge(layout, workspace.path(), &root.join(layout.module_dir()))
            })
            .map_err(|e| (PipelineStage::Merge, e))?;
        let merged_operations = merged
            .iter()
            .filter(|o| o.outcome == OperationOutcome::Applied)
            .count();
        report.operations.extend(merged);

        // Temporary output is gone before synthesis reads the module.
        drop(workspace);

        let synthesized = self
            .stage(PipelineStage::Synthesize, || {
                ControllerSynthesizer::new(fs, self.parser.as_ref()).synthesize(layout, root)
            })
            .map_err(|e| (PipelineStage::Synthesize, e))?;

        let access_files = synthesized.controllers.len();
        report.controllers.extend(synthesized.controllers);
        report.warnings.extend(synthesized.warnings);

        Ok(CodegenOutcome::Completed {
            merged_operations,
            access_files,
        })
    }

    fn degrade(
        &self,
        stage: PipelineStage,
        e: NestlingError,
        report: &mut GenerationReport,
    ) -> CodegenOutcome {
        if e.is_degradable() {
            warn!(%stage, error = %e, "Codegen path failed; keeping base scaffold");
        } else {
            error!(%stage, error = %e, "Unexpected failure on codegen path; keeping base scaffold");
        }
        report
            .warnings
            .push(format!("{stage} stage failed: {e}"));
        CodegenOutcome::Degraded {
            stage,
            reason: e.to_string(),
        }
    }

    /// Put the service's default controller back after a degraded codegen
    /// run, so the module still exposes a route surface.
    fn restore_default_controller(
        &self,
        structure: &ProjectStructure,
        layout: &ModuleLayout,
        report: &mut GenerationReport,
    ) {
        let Some(source) = structure
            .files()
            .find(|f| f.path.to_slash() == DEFAULT_CONTROLLER_SOURCE)
        else {
            return;
        };

        let relative = layout
            .controllers_dir()
            .join(layout.default_controller_name());
        let target = structure.root().join(&relative);
        if self.filesystem.exists(&target) {
            return;
        }

        let result = self
            .filesystem
            .create_dir_all(&structure.root().join(layout.controllers_dir()))
            .and_then(|()| self.filesystem.write_file(&target, &source.content));
        match result {
            Ok(()) => {
                info!(path = %target.display(), "Restored default controller");
                report
                    .files_written
                    .push(relative.to_string_lossy().replace('\\', "/"));
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Could not restore default controller");
                report
                    .warnings
                    .push(format!("default controller not restored: {e}"));
            }
        }
    }

    fn plan(
        &self,
        report: &mut GenerationReport,
        structure: &ProjectStructure,
        layout: &ModuleLayout,
        rules: &RuleTable,
        descriptor: &ProjectDescriptor,
    ) {
        let root = structure.root();
        report.dry_run = true;
        report.files_written = structure.files().map(|f| f.path.to_slash()).collect();

        report.operations = layout
            .scaffold_operations()
            .into_iter()
            .map(|op| AppliedOperation::new(op.rebased(root), OperationOutcome::Planned))
            .chain(
                rules
                    .resolve(root, descriptor.has_api_spec())
                    .into_iter()
                    .map(|(class, op)| {
                        AppliedOperation::new(op, OperationOutcome::Planned).in_class(class)
                    }),
            )
            .collect();

        if let Some(spec) = descriptor.api_spec_source() {
            let request = CodegenRequest {
                spec_source: spec.to_string(),
                output_dir: root.join(&self.settings.codegen_dir_name),
            };
            report.codegen = CodegenOutcome::Planned {
                command: self.codegen.describe(&request),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        MockAccessFileParser, MockCodegenRunner, MockFilesystem, MockTemplateRenderer,
        MockTemplateStore,
    };
    use crate::domain::{ManifestEntry, Template, TemplateMetadata};

    fn template() -> Template {
        Template::builder()
            .id(TemplateId::new("nest-modular", "1.0.0"))
            .metadata(TemplateMetadata::new("NestJS modular service"))
            .add_entry(ManifestEntry::rendered("src/main.ts", "// {{SERVICE}}"))
            .build()
            .unwrap()
    }

    fn store() -> MockTemplateStore {
        let mut store = MockTemplateStore::new();
        store.expect_get().returning(|_| Ok(template()));
        store
    }

    fn renderer() -> MockTemplateRenderer {
        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|_, ctx, root| {
            Ok(ProjectStructure::new(root)
                .with_file("src/main.ts", ctx.render("// {{SERVICE}}").unwrap()))
        });
        renderer
    }

    fn request(spec: Option<&str>) -> GenerationRequest {
        let mut b = ProjectDescriptor::builder().service("pet");
        if let Some(s) = spec {
            b = b.api_spec(s);
        }
        GenerationRequest::new(
            b.build().unwrap(),
            TemplateId::parse("nest-modular").unwrap(),
            "/out",
        )
    }

    fn service(fs: MockFilesystem, codegen: MockCodegenRunner) -> GenerationService {
        GenerationService::new(
            Box::new(store()),
            Box::new(renderer()),
            Box::new(fs),
            Box::new(codegen),
            Box::new(MockAccessFileParser::new()),
        )
    }

    #[test]
    fn existing_destination_is_rejected_without_force() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(true);
        fs.expect_write_file().never();

        let err = service(fs, MockCodegenRunner::new())
            .generate(request(None))
            .unwrap_err();
        assert!(matches!(
            err,
            NestlingError::Application(ApplicationError::DestinationExists { .. })
        ));
    }

    #[test]
    fn dry_run_plans_without_touching_disk() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();
        fs.expect_rename().never();

        let mut codegen = MockCodegenRunner::new();
        codegen
            .expect_describe()
            .returning(|r| format!("gen -i {}", r.spec_source));
        codegen.expect_generate().never();

        let report = service(fs, codegen)
            .generate(request(Some("petstore.yaml")).dry_run(true))
            .unwrap();

        assert!(report.dry_run);
        assert!(!report.scaffold_complete);
        assert_eq!(report.destination_root, PathBuf::from("/out/demo-pet"));
        assert_eq!(report.files_written, vec!["src/main.ts"]);
        assert!(
            report
                .operations
                .iter()
                .all(|o| o.outcome == OperationOutcome::Planned)
        );
        assert_eq!(
            report.codegen,
            CodegenOutcome::Planned {
                command: "gen -i petstore.yaml".into()
            }
        );
    }

    #[test]
    fn skip_codegen_forces_no_spec_branch() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);

        let mut codegen = MockCodegenRunner::new();
        codegen.expect_describe().never();

        let report = service(fs, codegen)
            .generate(request(Some("petstore.yaml")).dry_run(true).skip_codegen(true))
            .unwrap();

        assert!(!report.has_api_spec);
        assert!(matches!(report.codegen, CodegenOutcome::Skipped { .. }));
        assert!(report.operations.iter().any(|o| o
            .operation
            .to_string()
            .ends_with("controllers/pet.controller.ts")));
    }
}
