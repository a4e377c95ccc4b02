//! Implementation of the `nestling new` command.
//!
//! Responsibility: turn CLI arguments and config into a `GenerationRequest`,
//! wire the adapters, run the pipeline and display the report. No generation
//! logic lives here.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use nestling_adapters::{
    InMemoryStore, LocalFilesystem, OpenApiGeneratorCli, RegexAccessParser, StrictRenderer,
};
use nestling_core::{
    application::{
        CodegenOutcome, GenerationReport, GenerationRequest, GenerationService, OperationOutcome,
    },
    domain::{ProjectDescriptor, TemplateId},
};

use crate::{
    cli::{NewArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `nestling new` command.
#[instrument(skip_all)]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let request = build_request(&args, &config)?;
    debug!(
        application = request.descriptor.application_name(),
        service = request.descriptor.service_name(),
        template = %request.template,
        spec = request.descriptor.api_spec_source().unwrap_or("none"),
        "Request resolved"
    );

    let store = InMemoryStore::with_discovered(config.templates.local_path.as_deref())?;
    let service = GenerationService::new(
        Box::new(store),
        Box::new(StrictRenderer::new()),
        Box::new(LocalFilesystem::new()),
        Box::new(OpenApiGeneratorCli::from_env(config.codegen.settings())),
        Box::new(RegexAccessParser::new()),
    )
    .with_settings(config.generation_settings())
    .with_observer(output.progress());

    let root = request
        .output_dir
        .join(request.descriptor.destination_root_name());
    if !request.dry_run {
        output.header(&format!("Creating '{}'...", root.display()))?;
    }

    let report = service.generate(request)?;
    info!(run_id = %report.run_id, "Generation finished");

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
    } else {
        print_report(&report, &output)?;
    }
    Ok(())
}

/// Flags win over `[defaults]`.
fn build_request(args: &NewArgs, config: &AppConfig) -> CliResult<GenerationRequest> {
    let defaults = &config.defaults;

    let mut builder = ProjectDescriptor::builder()
        .application(args.application.as_deref().unwrap_or(&defaults.application))
        .service(args.service.as_deref().unwrap_or(&defaults.service))
        .version(args.version.as_deref().unwrap_or(&defaults.version));
    if let Some(spec) = &args.openapi {
        builder = builder.api_spec(spec.as_str());
    }
    let descriptor = builder.build().map_err(|e| CliError::Core(e.into()))?;

    let template_ref = args.template.as_deref().unwrap_or(&defaults.template);
    let template = TemplateId::parse(template_ref).map_err(|e| CliError::InvalidInput {
        message: format!("template id '{template_ref}': {e}"),
    })?;

    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(CliError::InvalidInput {
            message: format!("output path '{}' is not a directory", output_dir.display()),
        });
    }

    Ok(GenerationRequest::new(descriptor, template, output_dir)
        .force(args.force)
        .dry_run(args.dry_run)
        .skip_codegen(args.skip_codegen))
}

fn print_report(report: &GenerationReport, out: &OutputManager) -> CliResult<()> {
    let root = report.destination_root.display();

    if report.dry_run {
        out.info(&format!("Dry run: would create {root} from {}", report.template))?;
        out.print(&format!("  Files:      {}", report.files_written.len()))?;
        out.print(&format!("  Operations: {}", report.operations.len()))?;
        for file in &report.files_written {
            out.print(&format!("    {file}"))?;
        }
        if let CodegenOutcome::Planned { command } = &report.codegen {
            out.print(&format!("  Codegen:    {command}"))?;
        }
        return Ok(());
    }

    out.success(&format!("Service created at {root}"))?;
    out.print(&format!("  Files written:     {}", report.files_written.len()))?;
    out.print(&format!(
        "  Operations:        {} applied, {} skipped",
        report.operations_with(OperationOutcome::Applied),
        report.operations.len() - report.operations_with(OperationOutcome::Applied),
    ))?;

    match &report.codegen {
        CodegenOutcome::NotRequested => {}
        CodegenOutcome::Skipped { reason } => {
            out.info(&format!("Codegen skipped: {reason}"))?;
        }
        CodegenOutcome::Planned { command } => {
            out.info(&format!("Codegen planned: {command}"))?;
        }
        CodegenOutcome::Completed {
            merged_operations,
            access_files,
        } => {
            out.success(&format!(
                "Generated access layer: {access_files} service file(s), {merged_operations} merge operation(s)"
            ))?;
            for controller in &report.controllers {
                out.print(&format!(
                    "  {} ({} handler(s))",
                    controller.path,
                    controller.handlers.len()
                ))?;
            }
        }
        CodegenOutcome::Degraded { stage, reason } => {
            out.warning(&format!(
                "Codegen degraded at {stage}: {reason}. The base scaffold was kept."
            ))?;
        }
    }

    for warning in &report.warnings {
        out.warning(warning)?;
    }

    if !out.is_quiet() {
        out.print("")?;
        out.print("Next steps:")?;
        out.print(&format!("  cd {root}"))?;
        out.print("  npm install")?;
        out.print("  npm run start:dev")?;
    }
    Ok(())
}
