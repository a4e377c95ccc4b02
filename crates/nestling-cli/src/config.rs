//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the pieces it needs
//! (`GenerationSettings`, `CodegenSettings`).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `NESTLING_<SECTION>__<KEY>`
//! 3. Config file (`--config`, else the platform config dir, else `.nestling.toml`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use nestling_adapters::CodegenSettings;
use nestling_core::application::{ConflictPolicy, GenerationSettings, services::DEFAULT_CODEGEN_DIR};

/// File name used for per-directory configuration.
pub const LOCAL_CONFIG_FILE: &str = ".nestling.toml";

const ENV_PREFIX: &str = "NESTLING";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Values used when `nestling new` flags are omitted.
    pub defaults: Defaults,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
    pub codegen: CodegenConfig,
    pub reconcile: ReconcileConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub application: String,
    pub service: String,
    pub version: String,
    pub template: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            application: "demo".into(),
            service: "default".into(),
            version: "1.0.0".into(),
            template: "nest-modular".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory searched for templates before the built-in locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub program: String,
    pub program_args: Vec<String>,
    pub generator: String,
    pub controller_strategy: String,
    /// Name of the throwaway generator output directory under the destination.
    pub temp_dir_name: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        let settings = CodegenSettings::default();
        Self {
            program: settings.program,
            program_args: settings.program_args,
            generator: settings.generator,
            controller_strategy: settings.controller_strategy,
            temp_dir_name: DEFAULT_CODEGEN_DIR.into(),
        }
    }
}

impl CodegenConfig {
    pub fn settings(&self) -> CodegenSettings {
        CodegenSettings {
            program: self.program.clone(),
            program_args: self.program_args.clone(),
            generator: self.generator.clone(),
            controller_strategy: self.controller_strategy.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs (without colour) to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the environment.
    ///
    /// An explicit `config_file` must exist unless `may_be_absent` is set
    /// (a command that is about to create it); the default locations are
    /// always optional.
    pub fn load(config_file: Option<&PathBuf>, may_be_absent: bool) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to build default configuration")?;

        let file = match config_file {
            Some(path) => File::from(path.as_path())
                .format(FileFormat::Toml)
                .required(!may_be_absent),
            None => File::from(Self::resolve_default_path().as_path())
                .format(FileFormat::Toml)
                .required(false),
        };

        let cfg = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize()
            .context("Configuration has an invalid value")
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.nestling.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "nestling", "nestling")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file `load` reads without `--config`: a local `.nestling.toml`
    /// wins over the global one.
    pub fn resolve_default_path() -> PathBuf {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            Self::config_path()
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            conflict_policy: self.reconcile.conflict_policy,
            codegen_dir_name: self.codegen.temp_dir_name.clone(),
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialise configuration")
    }

    /// Look up one value by dotted key, e.g. `codegen.generator`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = serde_json::to_value(self).ok()?;
        let found = key
            .split('.')
            .try_fold(&value, |node, part| node.get(part))?;
        Some(match found {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set one value by dotted key in the TOML file at `path`, creating it if
    /// needed.  Keys are checked against the schema before anything is written.
    pub fn set_in_file(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
        let current = if path.is_file() {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        } else {
            String::new()
        };
        let mut doc: toml::Table = toml::from_str(&current)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let toml::Value::Table(template) = toml::Value::try_from(Self::default())
            .context("Failed to serialise default configuration")?
        else {
            anyhow::bail!("Default configuration is not a table");
        };
        let parts: Vec<&str> = key.split('.').collect();
        let Some((leaf, sections)) = parts.split_last() else {
            anyhow::bail!("Empty config key");
        };
        if sections.is_empty() {
            anyhow::bail!("Config key '{key}' must name a field, e.g. defaults.service");
        }

        let mut table = &mut doc;
        let mut schema = Some(&template);
        for section in sections {
            schema = schema
                .and_then(|s| s.get(*section))
                .and_then(|v| v.as_table());
            if schema.is_none() && !is_optional_section(section) {
                anyhow::bail!("Unknown config key: '{key}'");
            }
            table = table
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                .as_table_mut()
                .with_context(|| format!("'{section}' is not a table in {}", path.display()))?;
        }

        let value = match schema.and_then(|s| s.get(*leaf)) {
            Some(toml::Value::Boolean(_)) => toml::Value::Boolean(
                raw.parse()
                    .with_context(|| format!("'{key}' expects true or false"))?,
            ),
            Some(toml::Value::Array(_)) => toml::Value::Array(
                raw.split_whitespace()
                    .map(|s| toml::Value::String(s.to_string()))
                    .collect(),
            ),
            Some(_) => toml::Value::String(raw.to_string()),
            None if is_optional_key(key) => toml::Value::String(raw.to_string()),
            None => anyhow::bail!("Unknown config key: '{key}'"),
        };
        table.insert(leaf.to_string(), value);

        // Reject values the typed config would not accept.
        let merged = toml::to_string(&doc).context("Failed to serialise configuration")?;
        toml::from_str::<Self>(&merged)
            .with_context(|| format!("Invalid value '{raw}' for '{key}'"))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, merged)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Sections whose every field is optional and so absent from the serialised defaults.
fn is_optional_section(section: &str) -> bool {
    matches!(section, "templates" | "logging")
}

fn is_optional_key(key: &str) -> bool {
    matches!(key, "templates.local_path" | "logging.file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_generator_inputs() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.defaults.application, "demo");
        assert_eq!(cfg.defaults.service, "default");
        assert_eq!(cfg.defaults.version, "1.0.0");
        assert_eq!(cfg.codegen.generator, "typescript-nestjs");
        assert_eq!(cfg.reconcile.conflict_policy, ConflictPolicy::DropSource);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nestling.toml");
        std::fs::write(
            &path,
            "[defaults]\napplication = \"shop\"\n\n[reconcile]\nconflict_policy = \"fail\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path), false).unwrap();
        assert_eq!(cfg.defaults.application, "shop");
        assert_eq!(cfg.defaults.service, "default");
        assert_eq!(cfg.reconcile.conflict_policy, ConflictPolicy::Fail);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/nestling.toml");
        assert!(AppConfig::load(Some(&path), false).is_err());
    }

    #[test]
    fn missing_explicit_file_allowed_when_it_will_be_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.toml");
        let cfg = AppConfig::load(Some(&path), true).unwrap();
        assert_eq!(cfg.defaults.service, "default");
        assert!(!path.exists());
    }

    #[test]
    fn get_reads_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("defaults.service").as_deref(), Some("default"));
        assert_eq!(cfg.get("output.no_color").as_deref(), Some("false"));
        assert_eq!(
            cfg.get("reconcile.conflict_policy").as_deref(),
            Some("drop-source")
        );
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn set_in_file_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        AppConfig::set_in_file(&path, "defaults.service", "pet").unwrap();
        AppConfig::set_in_file(&path, "output.no_color", "true").unwrap();
        AppConfig::set_in_file(&path, "logging.file", "/tmp/nestling.log").unwrap();

        let cfg = AppConfig::load(Some(&path), false).unwrap();
        assert_eq!(cfg.defaults.service, "pet");
        assert!(cfg.output.no_color);
        assert_eq!(cfg.logging.file, Some(PathBuf::from("/tmp/nestling.log")));
    }

    #[test]
    fn set_in_file_rejects_unknown_keys_and_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert!(AppConfig::set_in_file(&path, "defaults.colour", "red").is_err());
        assert!(AppConfig::set_in_file(&path, "service", "pet").is_err());
        assert!(AppConfig::set_in_file(&path, "reconcile.conflict_policy", "merge").is_err());
        assert!(AppConfig::set_in_file(&path, "output.no_color", "maybe").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn generation_settings_follow_config() {
        let mut cfg = AppConfig::default();
        cfg.codegen.temp_dir_name = ".gen".into();
        cfg.reconcile.conflict_policy = ConflictPolicy::Fail;

        let settings = cfg.generation_settings();
        assert_eq!(settings.codegen_dir_name, ".gen");
        assert_eq!(settings.conflict_policy, ConflictPolicy::Fail);
    }
}
