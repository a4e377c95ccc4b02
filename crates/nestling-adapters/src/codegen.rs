//! OpenAPI generator subprocess adapter.
//!
//! Runs `openapi-generator-cli generate` (through `npx` by default) with the
//! `typescript-nestjs` generator and tag-based controller grouping.

use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use nestling_core::{
    application::{
        ApplicationError,
        ports::{CodegenRequest, CodegenRunner},
    },
    error::NestlingResult,
};

/// Environment variable that replaces the launcher program.
pub const CODEGEN_BIN_ENV: &str = "NESTLING_CODEGEN_BIN";

/// Invocation settings for [`OpenApiGeneratorCli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenSettings {
    /// Launcher binary (`npx` by default).
    pub program: String,
    /// Arguments placed before the generator flags.
    pub program_args: Vec<String>,
    /// Value of `-g`.
    pub generator: String,
    /// Value of the `controllerStrategy` additional property.
    pub controller_strategy: String,
}

impl Default for CodegenSettings {
    fn default() -> Self {
        Self {
            program: "npx".into(),
            program_args: vec![
                "@openapitools/openapi-generator-cli".into(),
                "generate".into(),
            ],
            generator: "typescript-nestjs".into(),
            controller_strategy: "tags".into(),
        }
    }
}

/// [`CodegenRunner`] backed by a child process.
///
/// Blocks until the child exits. Output is captured and logged at `debug`.
#[derive(Debug, Clone, Default)]
pub struct OpenApiGeneratorCli {
    settings: CodegenSettings,
}

impl OpenApiGeneratorCli {
    pub fn new(settings: CodegenSettings) -> Self {
        Self { settings }
    }

    /// Settings with `program` taken from `NESTLING_CODEGEN_BIN` when set.
    pub fn from_env(mut settings: CodegenSettings) -> Self {
        if let Some(bin) = std::env::var(CODEGEN_BIN_ENV)
            .ok()
            .filter(|b| !b.trim().is_empty())
        {
            debug!(program = %bin, "codegen program overridden from environment");
            settings.program = bin;
        }
        Self::new(settings)
    }

    pub fn settings(&self) -> &CodegenSettings {
        &self.settings
    }

    fn arguments(&self, request: &CodegenRequest) -> Vec<String> {
        let mut args = self.settings.program_args.clone();
        args.extend([
            "-i".to_string(),
            request.spec_source.clone(),
            "-g".to_string(),
            self.settings.generator.clone(),
            "-o".to_string(),
            request.output_dir.display().to_string(),
            format!(
                "--additional-properties=controllerStrategy={}",
                self.settings.controller_strategy
            ),
        ]);
        args
    }
}

impl CodegenRunner for OpenApiGeneratorCli {
    #[instrument(skip_all, fields(program = %self.settings.program, spec = %request.spec_source))]
    fn generate(&self, request: &CodegenRequest) -> NestlingResult<()> {
        info!(command = %self.describe(request), "running OpenAPI generator");

        let output = Command::new(&self.settings.program)
            .args(self.arguments(request))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ApplicationError::CodegenFailed {
                reason: format!("failed to launch '{}': {}", self.settings.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "generator output");
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            warn!(exit = %code, stderr = %stderr.trim(), "generator failed");
            let detail = stderr.lines().last().unwrap_or("").trim();
            return Err(ApplicationError::CodegenFailed {
                reason: if detail.is_empty() {
                    format!("generator exited with status {code}")
                } else {
                    format!("generator exited with status {code}: {detail}")
                },
            }
            .into());
        }

        Ok(())
    }

    fn describe(&self, request: &CodegenRequest) -> String {
        let quote = |s: &str| {
            if s.contains(char::is_whitespace) {
                format!("\"{s}\"")
            } else {
                s.to_string()
            }
        };
        std::iter::once(self.settings.program.as_str())
            .map(quote)
            .chain(self.arguments(request).iter().map(|a| quote(a)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
