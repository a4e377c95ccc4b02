//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "nestling",
    bin_name = "nestling",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Modular NestJS service generator",
    long_about = "Nestling scaffolds a modular NestJS backend service and, given an \
                  OpenAPI specification, generates its access layer and one \
                  controller per generated service.",
    after_help = "EXAMPLES:\n\
        \x20 nestling new --application shop --service pet\n\
        \x20 nestling new --service pet --openapi ./petstore.yaml\n\
        \x20 nestling list --format json\n\
        \x20 nestling completions bash > /usr/share/bash-completion/completions/nestling",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new service.
    #[command(
        visible_alias = "n",
        about = "Generate a new service",
        after_help = "EXAMPLES:\n\
            \x20 nestling new --service pet\n\
            \x20 nestling new --application shop --service pet --openapi ./petstore.yaml\n\
            \x20 nestling new --service pet --openapi ./petstore.yaml --dry-run"
    )]
    New(NewArgs),

    /// List available templates.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 nestling list\n\
            \x20 nestling list --format json"
    )]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 nestling init           # platform config directory\n\
            \x20 nestling init --local   # .nestling.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 nestling completions bash > ~/.local/share/bash-completion/completions/nestling\n\
            \x20 nestling completions zsh  > ~/.zfunc/_nestling\n\
            \x20 nestling completions fish > ~/.config/fish/completions/nestling.fish"
    )]
    Completions(CompletionsArgs),

    /// Read or change configuration values.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 nestling config get defaults.application\n\
            \x20 nestling config set reconcile.conflict_policy fail\n\
            \x20 nestling config list"
    )]
    Config(ConfigCommands),
}

impl Commands {
    /// Whether this command may create the file named by `--config`.
    pub fn writes_config_file(&self) -> bool {
        matches!(self, Self::Config(ConfigCommands::Set { .. }))
    }
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `nestling new`.
///
/// Unset values fall back to the `[defaults]` section of the configuration.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Application name; first half of the destination directory name.
    #[arg(short = 'a', long = "application", value_name = "NAME")]
    pub application: Option<String>,

    /// Service name; names the module directory and generated classes.
    #[arg(short = 's', long = "service", value_name = "NAME")]
    pub service: Option<String>,

    /// Service version written into package.json.
    #[arg(long = "service-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// OpenAPI specification (local path or URL) to generate the access layer from.
    #[arg(long = "openapi", value_name = "SOURCE")]
    pub openapi: Option<String>,

    /// Template id, `name` or `name@version`.
    #[arg(short = 't', long = "template", value_name = "ID")]
    pub template: Option<String>,

    /// Directory the service is created in (default: current directory).
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Generate into an existing destination directory.
    #[arg(long = "force", help = "Generate into an existing directory")]
    pub force: bool,

    /// Show the plan without writing anything.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// Ignore `--openapi` and produce the default controller layout.
    #[arg(long = "skip-codegen", help = "Do not run the OpenAPI generator")]
    pub skip_codegen: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.nestling.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

// ── config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value by dotted key.
    Get { key: String },
    /// Persist one value by dotted key.
    Set { key: String, value: String },
    /// Print the effective configuration.
    List,
    /// Print the configuration file location.
    Path,
}
