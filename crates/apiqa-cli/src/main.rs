//! # apiqa CLI entry point
//!
//! Parses command-line arguments, loads configuration, installs the
//! tracing subscriber and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apiqa_cli::check::{run_check, CheckArgs};
use apiqa_cli::config::{CliConfig, LogFormat};
use apiqa_cli::sample::{run_sample, SampleArgs};
use apiqa_cli::schemas::{run_schemas, SchemasArgs};
use apiqa_cli::validate::{run_validate, ValidateArgs};

/// apiqa — API response validation.
///
/// Validates JSON payloads and recorded HTTP responses against the
/// registered resource schemas.
#[derive(Parser, Debug)]
#[command(name = "apiqa", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true, env = "APIQA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON documents against a schema.
    Validate(ValidateArgs),

    /// Run status, content-type, timing and schema checks on a recorded response.
    Check(CheckArgs),

    /// List registered schemas.
    Schemas(SchemasArgs),

    /// Print a sample document for a builtin schema.
    Sample(SampleArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref());
    let log_format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    init_tracing(cli.verbose, log_format);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(apiqa_cli::EXIT_ERROR);
        }
    };
    match &config.source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config file"),
        None => tracing::debug!("no config file, using defaults"),
    }
    tracing::debug!(?config, "apiqa starting");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Check(args) => run_check(args, &config),
        Commands::Schemas(args) => run_schemas(args, &config),
        Commands::Sample(args) => run_sample(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(apiqa_cli::EXIT_ERROR)
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiqa_schema::SampleKind;

    #[test]
    fn cli_parse_validate_files() {
        let cli =
            Cli::try_parse_from(["apiqa", "validate", "--schema", "user", "a.json", "b.json"])
                .unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.schema, "user");
            assert!(!args.each);
            assert!(!args.conformance);
            assert_eq!(args.files, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_stdin_each() {
        let cli = Cli::try_parse_from(["apiqa", "validate", "-s", "post", "--each"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert!(args.each);
            assert!(args.files.is_empty());
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_schema() {
        assert!(Cli::try_parse_from(["apiqa", "validate", "a.json"]).is_err());
    }

    #[test]
    fn cli_parse_conformance_conflicts_with_each() {
        let result = Cli::try_parse_from([
            "apiqa",
            "validate",
            "--schema",
            "user",
            "--each",
            "--conformance",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_check_defaults_status() {
        let cli =
            Cli::try_parse_from(["apiqa", "check", "--schema", "user", "resp.json"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert_eq!(args.status, 200);
            assert_eq!(args.response, PathBuf::from("resp.json"));
        } else {
            panic!("expected check");
        }
    }

    #[test]
    fn cli_parse_check_status_override() {
        let cli = Cli::try_parse_from([
            "apiqa", "check", "--schema", "post", "--status", "201", "resp.json",
        ])
        .unwrap();
        if let Commands::Check(args) = cli.command {
            assert_eq!(args.status, 201);
        }
    }

    #[test]
    fn cli_parse_sample_kind() {
        let cli =
            Cli::try_parse_from(["apiqa", "sample", "user", "--kind", "invalid-email"]).unwrap();
        if let Commands::Sample(args) = cli.command {
            assert_eq!(args.schema, "user");
            assert_eq!(args.kind, SampleKind::InvalidEmail);
        } else {
            panic!("expected sample");
        }
    }

    #[test]
    fn cli_parse_sample_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["apiqa", "sample", "user", "--kind", "huge"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "apiqa",
            "schemas",
            "-vv",
            "--config",
            "apiqa.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("apiqa.yaml")));
        assert!(matches!(cli.command, Commands::Schemas(_)));
    }
}
