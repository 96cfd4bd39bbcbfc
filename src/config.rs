//! Command-line configuration and logging setup.
//!
//! Every path and the attribute schema can also be supplied through
//! `HYPERTENSION_*` environment variables.

use crate::{
    bayes::MissingPolicy,
    error::Result,
    record::{Schema, DEFAULT_ATTRIBUTES},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "hypertension-bayes")]
#[command(author, version, about = "Naive Bayes hypertension diagnosis", long_about = None)]
pub struct Cli {
    /// Prior and likelihood table; row 0 holds the class priors.
    #[arg(long, global = true, env = "HYPERTENSION_PRIOR", default_value = "prior.csv")]
    pub prior: PathBuf,

    /// Attribute names in test-file column order.
    #[arg(
        long = "attribute",
        global = true,
        env = "HYPERTENSION_ATTRIBUTES",
        value_delimiter = ','
    )]
    pub attributes: Vec<String>,

    /// What to do with an attribute value missing from the table (exclude, fail).
    #[arg(long, global = true, default_value = "exclude")]
    pub on_missing: MissingPolicy,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Diagnose every row of a labelled test file and report accuracy.
    Batch {
        #[arg(long, env = "HYPERTENSION_TESTS", default_value = "datatest.csv")]
        tests: PathBuf,

        #[arg(long, env = "HYPERTENSION_OUTPUT", default_value = "hasil_uji_datatest.csv")]
        output: PathBuf,
    },
    /// Diagnose a single patient from attribute values given in schema order.
    Diagnose {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

impl Cli {
    pub fn schema(&self) -> Result<Schema> {
        let attributes: Vec<String> = self
            .attributes
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if attributes.is_empty() {
            return Schema::new(DEFAULT_ATTRIBUTES);
        }
        Schema::new(attributes)
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the CLI level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hypertension_bayes={}", level)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_use_reference_files_and_schema() {
        let cli = Cli::try_parse_from(["hypertension-bayes", "batch"]).unwrap();
        assert_eq!(cli.prior, PathBuf::from("prior.csv"));
        assert_eq!(cli.on_missing, MissingPolicy::Exclude);
        assert_eq!(cli.schema().unwrap(), Schema::default());
        match cli.command {
            Command::Batch { tests, output } => {
                assert_eq!(tests, PathBuf::from("datatest.csv"));
                assert_eq!(output, PathBuf::from("hasil_uji_datatest.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn attributes_accept_comma_list() {
        let cli = Cli::try_parse_from([
            "hypertension-bayes",
            "--attribute",
            "Usia,Pusing",
            "--on-missing",
            "fail",
            "diagnose",
            "Remaja",
            "Ya",
        ])
        .unwrap();
        assert_eq!(cli.schema().unwrap().attributes(), ["Usia", "Pusing"]);
        assert_eq!(cli.on_missing, MissingPolicy::Fail);
    }

    #[test]
    fn verbosity_maps_to_level() {
        let cli = Cli::try_parse_from(["hypertension-bayes", "-vv", "batch"]).unwrap();
        assert_eq!(cli.log_level(), "trace");
        let cli = Cli::try_parse_from(["hypertension-bayes", "-q", "batch"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }
}
