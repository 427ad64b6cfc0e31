//! wheelhouse - install Python wheels
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Unpacks a `.whl` into a prefix (a virtualenv or a system location),
//! writing console/gui launchers, fixing `#!python` shebangs and recording
//! everything in the distribution's RECORD.
//!
//! # Layout
//!
//! ```text
//! {prefix}/
//! ├── bin/                                # scripts and launchers
//! ├── include/python{X.Y}/{dist}/         # headers
//! └── lib/python{X.Y}/site-packages/      # purelib, platlib
//! ```

pub mod cmd;
pub mod config;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wheelhouse_core::ValidationMode;
use wheelhouse_core::schema::Scheme;

#[derive(Debug, Parser)]
#[command(name = "wheelhouse")]
#[command(author, version, about = "wheelhouse - install Python wheels")]
pub struct Cli {
    /// Show what would be installed without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a wheel
    Install {
        /// Path to the .whl file
        wheel: PathBuf,
        /// Installation prefix (defaults to $VIRTUAL_ENV, then /usr/local)
        #[arg(long, env = "WHEELHOUSE_PREFIX")]
        prefix: Option<PathBuf>,
        /// Stage the install under this directory
        #[arg(long, env = "WHEELHOUSE_DESTDIR")]
        destdir: Option<PathBuf>,
        /// Target Python version as X.Y (queried from the interpreter if unset)
        #[arg(long, env = "WHEELHOUSE_PYTHON_VERSION")]
        python_version: Option<String>,
        /// Interpreter for launchers and #!python shebangs
        #[arg(long, env = "WHEELHOUSE_INTERPRETER")]
        interpreter: Option<String>,
        /// Override or add a scheme directory
        #[arg(long = "scheme", value_name = "NAME=DIR", value_parser = parse_scheme_override)]
        schemes: Vec<(Scheme, PathBuf)>,
        /// Check RECORD before installing: none, entries or all
        #[arg(long, default_value = "none", value_name = "MODE")]
        validate_record: ValidationMode,
        /// Replace files that already exist
        #[arg(long)]
        overwrite: bool,
        /// Print the installed records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a wheel's RECORD against its contents
    Verify {
        /// Path to the .whl file
        wheel: PathBuf,
        /// How much to check: entries or all
        #[arg(
            long = "validate-record",
            visible_alias = "mode",
            default_value = "all",
            value_name = "MODE"
        )]
        mode: ValidationMode,
    },
}

/// Parse `NAME=DIR` for `--scheme`.
pub fn parse_scheme_override(s: &str) -> Result<(Scheme, PathBuf), String> {
    let (name, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DIR, got '{s}'"))?;
    if dir.is_empty() {
        return Err(format!("empty directory for scheme '{name}'"));
    }
    Ok((Scheme::new(name)?, PathBuf::from(dir)))
}
