//! Command-line argument parsing for the jobstream CLI.

use thiserror::Error;

/// Arguments of a streaming run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    /// Repository to index
    pub resource_id: String,
    /// Branch to index
    pub branch: Option<String>,
    /// Overrides `JOBSTREAM_BASE_URL`
    pub base_url: Option<String>,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Start indexing and follow its progress
    Run(RunArgs),
}

/// Argument errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("missing repository id")]
    MissingResource,

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub const USAGE: &str = "\
Usage: jobstream <repository-id> [--branch <name>] [--base-url <url>]

Starts indexing a repository and prints its progress until the job ends.

Options:
  -b, --branch <name>    Branch to index (server default when omitted)
      --base-url <url>   API base URL (default: $JOBSTREAM_BASE_URL)
  -V, --version          Print version
  -h, --help             Print this help

Environment:
  JOBSTREAM_TOKEN        Bearer token (required)
  JOBSTREAM_LOG          Log filter, e.g. `jobstream=debug`";

/// Parse command-line arguments, skipping the program name.
///
/// # Examples
///
/// ```
/// use jobstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["jobstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, CliError>
where
    I: Iterator<Item = String>,
{
    let mut run = RunArgs::default();
    let mut resource = None;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--branch" | "-b" => run.branch = Some(take_value(&arg, &mut args)?),
            "--base-url" => run.base_url = Some(take_value(&arg, &mut args)?),
            _ => {
                if let Some(value) = arg.strip_prefix("--branch=") {
                    run.branch = Some(value.to_string());
                } else if let Some(value) = arg.strip_prefix("--base-url=") {
                    run.base_url = Some(value.to_string());
                } else if arg.starts_with('-') {
                    return Err(CliError::UnknownOption(arg));
                } else if resource.is_none() {
                    resource = Some(arg);
                } else {
                    return Err(CliError::UnexpectedArgument(arg));
                }
            }
        }
    }

    run.resource_id = resource.ok_or(CliError::MissingResource)?;
    Ok(CliCommand::Run(run))
}

fn take_value<I>(flag: &str, args: &mut I) -> Result<String, CliError>
where
    I: Iterator<Item = String>,
{
    match args.next() {
        Some(value) if !value.starts_with('-') => Ok(value),
        _ => Err(CliError::MissingValue(flag.to_string())),
    }
}
