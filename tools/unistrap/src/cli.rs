//! Command-line surface
//!
//! getopt-style short flags. Help and version are handled here rather than
//! by clap so both exit with a failure status, and whichever comes first on
//! the command line wins. A repeated path flag keeps its last value.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use thiserror::Error;

use crate::builder::{ImageConfig, DEFAULT_OUTPUT};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "unistrap")]
#[command(about = "unistrap - mbr kernel imager")]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Args {
    /// Display this help menu
    #[arg(short = 'h')]
    pub help: bool,

    /// Display unistrap version
    #[arg(short = 'v')]
    pub version: bool,

    /// Image output path
    #[arg(short = 'o', value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Bootstrap image path
    #[arg(short = 'b', value_name = "PATH")]
    pub bootstrap: Option<PathBuf>,

    /// Kernel image path
    #[arg(short = 'k', value_name = "PATH")]
    pub kernel: Option<PathBuf>,
}

/// Reasons the command line does not describe a build
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("too few arguments")]
    TooFewArguments,

    #[error("expected bootstrap path")]
    MissingBootstrap,

    #[error("expected kernel path")]
    MissingKernel,

    #[error("help requested")]
    HelpRequested,

    #[error("version requested")]
    VersionRequested,

    #[error("{0}")]
    Parse(String),
}

impl UsageError {
    /// Whether the operator should see a `fatal:` line before the usage
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::HelpRequested | Self::VersionRequested)
    }
}

impl Args {
    /// Resolve flags into a build configuration
    pub fn into_config(self) -> Result<ImageConfig, UsageError> {
        if self.help {
            return Err(UsageError::HelpRequested);
        }
        if self.version {
            return Err(UsageError::VersionRequested);
        }

        let bootstrap = self.bootstrap.ok_or(UsageError::MissingBootstrap)?;
        let kernel = self.kernel.ok_or(UsageError::MissingKernel)?;

        Ok(ImageConfig {
            output: self.output,
            bootstrap,
            kernel,
        })
    }
}

/// Parse a full argument vector, program name included
pub fn parse_args<I, T>(argv: I) -> Result<ImageConfig, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.len() < 2 {
        return Err(UsageError::TooFewArguments);
    }

    let matches = Args::command()
        .try_get_matches_from(argv)
        .map_err(|e| UsageError::Parse(e.to_string()))?;

    match (given_at(&matches, "help"), given_at(&matches, "version")) {
        (Some(h), Some(v)) if v < h => return Err(UsageError::VersionRequested),
        (Some(_), _) => return Err(UsageError::HelpRequested),
        (None, Some(_)) => return Err(UsageError::VersionRequested),
        (None, None) => {}
    }

    Args::from_arg_matches(&matches)
        .map_err(|e| UsageError::Parse(e.to_string()))?
        .into_config()
}

/// Command-line position of a flag, if the operator passed it
fn given_at(matches: &ArgMatches, id: &str) -> Option<usize> {
    if matches.value_source(id) != Some(ValueSource::CommandLine) {
        return None;
    }
    matches.index_of(id)
}

pub fn usage() -> String {
    Args::command().render_help().to_string()
}

pub fn version_banner() -> String {
    format!(
        "-------------------------------\n\
         Copyright (c) 2026, Ian Moffett\n\
         Unistrap v{}\n\
         -------------------------------",
        VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_command_line() {
        let config = parse_args(["unistrap", "-b", "boot.bin", "-k", "kern.bin", "-o", "disk.img"])
            .unwrap();
        assert_eq!(config.bootstrap, PathBuf::from("boot.bin"));
        assert_eq!(config.kernel, PathBuf::from("kern.bin"));
        assert_eq!(config.output, PathBuf::from("disk.img"));
    }

    #[test]
    fn test_default_output() {
        let config = parse_args(["unistrap", "-b", "a", "-k", "b"]).unwrap();
        assert_eq!(config.output, PathBuf::from("kernel.img"));
    }

    #[test]
    fn test_missing_paths() {
        let err = parse_args(["unistrap", "-k", "kern.bin"]).unwrap_err();
        assert!(matches!(err, UsageError::MissingBootstrap));
        assert!(err.is_fatal());

        let err = parse_args(["unistrap", "-b", "boot.bin"]).unwrap_err();
        assert!(matches!(err, UsageError::MissingKernel));
    }

    #[test]
    fn test_too_few_arguments() {
        let err = parse_args(["unistrap"]).unwrap_err();
        assert!(matches!(err, UsageError::TooFewArguments));
    }

    #[test]
    fn test_help_and_version() {
        let err = parse_args(["unistrap", "-h"]).unwrap_err();
        assert!(matches!(err, UsageError::HelpRequested));
        assert!(!err.is_fatal());

        let err = parse_args(["unistrap", "-v", "-b", "x"]).unwrap_err();
        assert!(matches!(err, UsageError::VersionRequested));
        assert!(version_banner().contains(VERSION));
        assert!(version_banner().contains("Copyright (c) 2026, Ian Moffett"));
    }

    #[test]
    fn test_first_of_help_and_version_wins() {
        let err = parse_args(["unistrap", "-v", "-h"]).unwrap_err();
        assert!(matches!(err, UsageError::VersionRequested));

        let err = parse_args(["unistrap", "-h", "-v"]).unwrap_err();
        assert!(matches!(err, UsageError::HelpRequested));

        let err = parse_args(["unistrap", "-b", "a", "-k", "b", "-v"]).unwrap_err();
        assert!(matches!(err, UsageError::VersionRequested));
    }

    #[test]
    fn test_repeated_path_keeps_last() {
        let config = parse_args(["unistrap", "-b", "old.bin", "-k", "k", "-b", "new.bin"]).unwrap();
        assert_eq!(config.bootstrap, PathBuf::from("new.bin"));

        let config = parse_args(["unistrap", "-b", "a", "-k", "k", "-o", "x.img", "-o", "y.img"])
            .unwrap();
        assert_eq!(config.output, PathBuf::from("y.img"));
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse_args(["unistrap", "-x"]).unwrap_err();
        assert!(matches!(err, UsageError::Parse(_)));
    }

    #[test]
    fn test_usage_lists_flags() {
        let text = usage();
        for flag in ["-h", "-v", "-o", "-b", "-k"] {
            assert!(text.contains(flag), "missing {flag} in usage");
        }
    }
}
