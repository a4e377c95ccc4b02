//! Implementation of the `nestling list` command.

use nestling_adapters::InMemoryStore;
use nestling_core::application::{TemplateInfo, TemplateService};

use crate::{
    cli::{ListArgs, ListFormat, OutputFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let store = InMemoryStore::with_discovered(config.templates.local_path.as_deref())?;
    let templates = TemplateService::new(Box::new(store)).list()?;

    // --output-format json wins over --format.
    let format = if output.format() == OutputFormat::Json {
        ListFormat::Json
    } else {
        args.format
    };

    if templates.is_empty() && format != ListFormat::Json {
        output.warning("No templates found. Set NESTLING_TEMPLATES_DIR or templates.local_path.")?;
        return Ok(());
    }

    match format {
        ListFormat::Table => {
            output.header("Available Templates:")?;
            for t in &templates {
                output.print(&table_row(t))?;
            }
        }
        ListFormat::Json => output.json(&templates)?,
        ListFormat::List => {
            for t in &templates {
                println!("{}", t.id);
            }
        }
        ListFormat::Csv => {
            println!("id,name,files,parameterized,tags");
            for t in &templates {
                println!("{}", csv_row(t));
            }
        }
    }

    Ok(())
}

fn table_row(t: &TemplateInfo) -> String {
    let mut row = format!("  {:<24} {}", t.id, t.name);
    if !t.description.is_empty() {
        row.push_str(&format!(" - {}", t.description));
    }
    row.push_str(&format!(" ({} files, {} parameterized)", t.files, t.parameterized));
    row
}

fn csv_row(t: &TemplateInfo) -> String {
    format!(
        "{},{},{},{},{}",
        csv_field(&t.id),
        csv_field(&t.name),
        t.files,
        t.parameterized,
        csv_field(&t.tags.join(";"))
    )
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
