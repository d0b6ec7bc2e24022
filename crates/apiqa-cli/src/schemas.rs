//! # Schemas Subcommand
//!
//! Lists registered schema names with their titles.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use apiqa_schema::SchemaRegistry;

use crate::config::{CliConfig, OutputFormat};

/// Arguments for the schemas subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Print each schema's source document as well.
    #[arg(long)]
    pub documents: bool,
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, config: &CliConfig) -> Result<u8> {
    let registry = config.registry()?;
    print!("{}", render_schemas(&registry, args.documents, config.output)?);
    Ok(crate::EXIT_PASS)
}

/// Render the registry listing.
pub fn render_schemas(
    registry: &SchemaRegistry,
    documents: bool,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let listing: Vec<_> = registry
                .iter()
                .map(|schema| {
                    let mut entry = json!({"name": schema.name(), "title": schema.title()});
                    if documents {
                        entry["document"] = schema.document().clone();
                    }
                    entry
                })
                .collect();
            let mut text = serde_json::to_string_pretty(&listing)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Text => {
            let mut text = String::new();
            for schema in registry.iter() {
                match schema.title() {
                    Some(title) => text.push_str(&format!("{:<12} {title}\n", schema.name())),
                    None => text.push_str(&format!("{}\n", schema.name())),
                }
                if documents {
                    text.push_str(&serde_json::to_string_pretty(schema.document())?);
                    text.push('\n');
                }
            }
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_builtins_in_name_order() {
        let registry = SchemaRegistry::builtin().unwrap();
        let text = render_schemas(&registry, false, OutputFormat::Text).unwrap();
        let names: Vec<&str> = text
            .lines()
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(names, vec!["post", "user"]);
    }

    #[test]
    fn json_listing_includes_documents_on_request() {
        let registry = SchemaRegistry::builtin().unwrap();
        let text = render_schemas(&registry, true, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "post");
        assert_eq!(value[1]["document"]["type"], "object");
    }
}
