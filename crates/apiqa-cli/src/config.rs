//! # CLI Configuration
//!
//! Optional YAML file, located by `--config` or `APIQA_CONFIG`:
//!
//! ```yaml
//! schema_dirs: [schemas/extra]
//! output: text            # text | json
//! log_format: text        # text | json
//! response:
//!   max_time_ms: 3000
//!   content_type: application/json
//! ```
//!
//! Every field is optional. `APIQA_OUTPUT` and `APIQA_LOG_FORMAT` override
//! the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use apiqa_assert::Expectations;
use apiqa_schema::SchemaRegistry;
use serde::Deserialize;

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One pretty-printed JSON document.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown output format {other:?} (expected text or json)"),
        }
    }
}

/// How log events are formatted on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `tracing_subscriber` compact text.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown log format {other:?} (expected text or json)"),
        }
    }
}

/// Defaults for the `check` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseDefaults {
    /// Response time limit in milliseconds.
    pub max_time_ms: u64,
    /// Expected media type.
    pub content_type: String,
}

impl Default for ResponseDefaults {
    fn default() -> Self {
        Self {
            max_time_ms: 3000,
            content_type: "application/json".to_string(),
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Extra directories of `*.schema.json` files, loaded after the builtins.
    pub schema_dirs: Vec<PathBuf>,
    /// Result format.
    pub output: OutputFormat,
    /// Log format.
    pub log_format: LogFormat,
    /// `check` defaults.
    pub response: ResponseDefaults,
    /// File the configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl CliConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("invalid configuration")
    }

    /// Read the file at `path`, or use defaults when there is none, then
    /// apply environment overrides.
    ///
    /// Relative `schema_dirs` are resolved against the file's directory.
    /// This runs before the subscriber is installed, so it does not log;
    /// the file used is recorded in `source`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?;
                let mut config = Self::from_yaml_str(&text)
                    .with_context(|| format!("in config file: {}", path.display()))?;
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                for dir in &mut config.schema_dirs {
                    if dir.is_relative() {
                        *dir = base.join(&*dir);
                    }
                }
                config.source = Some(path.to_path_buf());
                config
            }
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `APIQA_OUTPUT` and `APIQA_LOG_FORMAT` as returned by `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("APIQA_OUTPUT") {
            self.output = value.parse().context("APIQA_OUTPUT")?;
        }
        if let Some(value) = lookup("APIQA_LOG_FORMAT") {
            self.log_format = value.parse().context("APIQA_LOG_FORMAT")?;
        }
        Ok(self)
    }

    /// The builtin schemas plus every configured directory, in order.
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::builtin().context("builtin schemas failed to compile")?;
        for dir in &self.schema_dirs {
            let loaded = registry
                .load_dir(dir)
                .with_context(|| format!("failed to load schemas from {}", dir.display()))?;
            tracing::info!(dir = %dir.display(), loaded, "loaded schema directory");
        }
        Ok(registry)
    }

    /// The standard response checks: `status`, the configured content type
    /// and time limit, and the schema.
    pub fn expectations(&self, status: u16, schema: &str, each: bool) -> Expectations {
        Expectations::new()
            .status(status)
            .content_type(self.response.content_type.clone())
            .max_time(Duration::from_millis(self.response.max_time_ms))
            .schema(schema, each)
    }
}
