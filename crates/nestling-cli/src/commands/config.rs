//! `nestling config`: read and write configuration values.

use std::path::PathBuf;

use crate::{
    cli::{ConfigCommands, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// `config_file` is the `--config` flag; `set` writes there when given.
pub fn execute(
    cmd: ConfigCommands,
    config: AppConfig,
    config_file: Option<PathBuf>,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key).ok_or_else(|| CliError::ConfigError {
                message: format!("Unknown config key: '{key}'"),
                source: None,
            })?;
            if output.format() == OutputFormat::Json {
                output.json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{value}");
            }
        }

        ConfigCommands::Set { key, value } => {
            let path = config_file.unwrap_or_else(AppConfig::resolve_default_path);
            AppConfig::set_in_file(&path, &key, &value)
                .map_err(|e| CliError::config(format!("Could not set '{key}'"), e))?;
            output.success(&format!("{key} = {value} ({})", path.display()))?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                output.json(&config)?;
            } else {
                let serialised = config
                    .to_toml()
                    .map_err(|e| CliError::config("Failed to serialise config", e))?;
                output.header("Current Configuration:")?;
                output.print(&serialised)?;
            }
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::resolve_default_path().display());
        }
    }

    Ok(())
}
