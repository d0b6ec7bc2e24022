//! # Sample Subcommand
//!
//! Prints a fixture document for a builtin schema: a valid resource or one
//! of the invalid variants used by negative tests.
//!
//! ```bash
//! apiqa sample user --kind invalid-email | apiqa validate --schema user
//! ```

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use apiqa_schema::samples::{self, SampleKind};

/// Arguments for the sample subcommand.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Schema name (`user` or `post`).
    pub schema: String,

    /// Variant: valid, empty, long-fields, invalid-email.
    #[arg(long, default_value = "valid")]
    pub kind: SampleKind,
}

/// Execute the sample subcommand.
pub fn run_sample(args: &SampleArgs) -> Result<u8> {
    let document = build_sample(&args.schema, args.kind)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(crate::EXIT_PASS)
}

/// The requested fixture, or an error when the schema has none of that kind.
pub fn build_sample(schema: &str, kind: SampleKind) -> Result<Value> {
    samples::sample(schema, kind)
        .ok_or_else(|| anyhow::anyhow!("no {kind} sample for schema '{schema}'"))
}
