// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ExistingOutputs;

/// Command-line arguments for `qgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qgraph",
    version,
    about = "Build a quantum graph for a pipeline against a dataset catalog.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline file (TOML).
    ///
    /// Default: `Pipeline.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pipeline.toml")]
    pub pipeline: String,

    /// Path to the catalog fixture (TOML). Required unless `--dry-run`.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<String>,

    /// Filter expression, e.g. `visit IN (1, 2) AND detector != 3`.
    #[arg(long, value_name = "EXPR")]
    pub query: Option<String>,

    /// Skip quanta whose outputs all exist already.
    #[arg(long, overrides_with = "no_skip_existing")]
    pub skip_existing: bool,

    /// Fail the build if any output exists already.
    #[arg(long, overrides_with = "skip_existing")]
    pub no_skip_existing: bool,

    /// Assemble tasks one after another instead of in parallel.
    #[arg(long)]
    pub serial: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the pipeline, but don't query the catalog.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Policy from the flags, if either was given; `[config]` decides
    /// otherwise.
    pub fn existing_outputs(&self) -> Option<ExistingOutputs> {
        if self.no_skip_existing {
            Some(ExistingOutputs::Fail)
        } else if self.skip_existing {
            Some(ExistingOutputs::Skip)
        } else {
            None
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
