//! # Check Subcommand
//!
//! Runs the standard assertion bundle on one recorded response: status
//! code, content type, response-time limit and schema.
//!
//! ```bash
//! apiqa check --schema user recorded/get-user-1.json
//! apiqa check --schema post --status 201 recorded/create-post.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use apiqa_assert::{CheckReport, ResponseSnapshot};

use crate::config::{CliConfig, OutputFormat};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema the body must satisfy.
    #[arg(long, short)]
    pub schema: String,

    /// The body is an array of `schema` resources.
    #[arg(long)]
    pub each: bool,

    /// Expected status code.
    #[arg(long, default_value_t = 200)]
    pub status: u16,

    /// Recorded response file (`status`, `headers`, `body`, `elapsed_ms`).
    pub response: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config: &CliConfig) -> Result<u8> {
    let registry = config.registry()?;
    registry.require(&args.schema)?;

    let text = std::fs::read_to_string(&args.response)
        .with_context(|| format!("failed to read {}", args.response.display()))?;
    let response = ResponseSnapshot::from_json_str(&text)
        .with_context(|| format!("invalid recorded response: {}", args.response.display()))?;

    let report = config
        .expectations(args.status, &args.schema, args.each)
        .run(&response, &registry);
    tracing::debug!(
        response = %args.response.display(),
        passed = report.passed(),
        "checks complete"
    );

    print!("{}", render_check(&report, config.output)?);
    Ok(crate::exit_code(report.passed()))
}

/// Render a check report in the requested format.
pub fn render_check(report: &CheckReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(report)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Text => {
            let failed = report.failures().count();
            Ok(format!(
                "{report}\n{} checks, {failed} failed\n",
                report.outcomes().len()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiqa_schema::{samples, SchemaRegistry};
    use std::time::Duration;

    #[test]
    fn text_rendering_counts_failures() {
        let response = ResponseSnapshot::new(500).with_json(&samples::valid_post());
        let report = CliConfig::default()
            .expectations(200, "post", false)
            .run(&response, &SchemaRegistry::builtin().unwrap());
        let text = render_check(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("FAIL status_code: expected status code 200, got 500"));
        assert!(text.contains("PASS json_schema"));
        assert!(text.ends_with("4 checks, 1 failed\n"));
    }

    #[test]
    fn json_rendering_lists_outcomes() {
        let response = ResponseSnapshot::new(200)
            .with_json(&samples::valid_user())
            .with_elapsed(Duration::from_millis(5000));
        let report = CliConfig::default()
            .expectations(200, "user", false)
            .run(&response, &SchemaRegistry::builtin().unwrap());
        let text = render_check(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[2]["name"], "response_time");
        assert_eq!(outcomes[2]["passed"], false);
    }
}
