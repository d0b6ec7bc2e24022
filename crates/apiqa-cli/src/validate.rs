//! # Validate Subcommand
//!
//! Validates JSON documents against a named schema and prints a batch
//! report.
//!
//! ```bash
//! apiqa validate --schema user user-1.json user-2.json
//! apiqa validate --schema post --each < posts.json
//! apiqa validate --schema user --conformance user-1.json
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use apiqa_core::FieldPath;
use apiqa_schema::{BatchReport, SchemaRegistry, ValidationResult, Violation, ViolationKind};

use crate::config::{CliConfig, OutputFormat};

/// Source name used for stdin in reports.
pub const STDIN_SOURCE: &str = "-";

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema name (see `apiqa schemas`).
    #[arg(long, short)]
    pub schema: String,

    /// Each document is an array; validate every element.
    #[arg(long)]
    pub each: bool,

    /// Use the full draft-07 validator instead of the compiled constraints.
    #[arg(long, conflicts_with = "each")]
    pub conformance: bool,

    /// JSON files to validate. Reads stdin when none are given.
    pub files: Vec<PathBuf>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let registry = config.registry()?;
    registry.require(&args.schema)?;

    let report = if args.files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        let mut report = BatchReport::new();
        report.push(STDIN_SOURCE, validate_text(&registry, args, &text).context("stdin")?);
        report
    } else {
        validate_files(&registry, args)?
    };

    print!("{}", render_report(&report, config.output)?);
    Ok(crate::exit_code(report.all_passed()))
}

/// Validate every file in `args.files`, one report entry per file.
///
/// # Errors
///
/// Fails on the first file that cannot be read.
pub fn validate_files(registry: &SchemaRegistry, args: &ValidateArgs) -> Result<BatchReport> {
    let mut report = BatchReport::new();
    for path in &args.files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let result = validate_text(registry, args, &text)
            .with_context(|| format!("in {}", path.display()))?;
        report.push(path.display().to_string(), result);
    }
    Ok(report)
}

/// Parse `text` and validate it according to `args`.
///
/// Text that is not JSON yields a failed result with a single
/// `invalid_json` violation at the root, so the rest of a batch still runs.
pub fn validate_text(
    registry: &SchemaRegistry,
    args: &ValidateArgs,
    text: &str,
) -> Result<ValidationResult> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(schema = %args.schema, error = %e, "document is not valid JSON");
            let violation = Violation::new(
                FieldPath::root(),
                ViolationKind::InvalidJson,
                format!("invalid JSON: {e}"),
            );
            return Ok(ValidationResult::new(args.schema.as_str(), vec![violation]));
        }
    };
    let result = if args.conformance {
        registry.conformance(&args.schema, &value)?
    } else if args.each {
        registry.validate_each(&args.schema, &value)?
    } else {
        registry.validate(&args.schema, &value)?
    };
    Ok(result)
}

/// Render a report in the requested format.
pub fn render_report(report: &BatchReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(report)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Text => {
            let mut text = String::new();
            for entry in report.entries() {
                let status = if entry.result.is_valid() { "PASS" } else { "FAIL" };
                text.push_str(&format!("{status} {}: {}\n", entry.source, entry.result));
            }
            let summary = report.summary();
            text.push_str(&format!(
                "\n{} passed, {} failed, {} total ({:.1}% pass rate)\n",
                summary.passed, summary.failed, summary.total, summary.pass_rate
            ));
            Ok(text)
        }
    }
}
