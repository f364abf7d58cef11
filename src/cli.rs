//! Command-line Interface
//!
//! Flags keep their historical Go-style spelling (`-service=firewalls`), so
//! single-dash long flags are rewritten to clap's double-dash form before
//! parsing. Help and version are handled here rather than by clap: both go to
//! stderr and end the process with a failure status.

use crate::config::{Action, Config, LogLevel};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;

pub const USAGE: &str = "gcloud-backup [-import|-export] -account=<user_name> -project=<project_name> -service=<service_list> OPTIONS...";

/// Raw command-line flags
#[derive(Parser, Debug, Default)]
#[command(
    name = "gcloud-backup",
    about = "Export Google Compute Engine resources to a JSON backup",
    override_usage = USAGE,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Flags {
    /// Display version information
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
        default_value_t = false, default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    pub version: bool,

    /// Display this help
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
        default_value_t = false, default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    pub help: bool,

    /// Create new services export
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
        default_value_t = false, default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    pub export: bool,

    /// Start services import from backup
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
        default_value_t = false, default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    pub import: bool,

    /// Output JSON in readable format
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true,
        default_value_t = false, default_missing_value = "true",
        value_parser = BoolishValueParser::new())]
    pub readable: bool,

    /// List of services to export/import (comma separated)
    #[arg(long, default_value = "")]
    pub service: String,

    /// Google SDK account name, or `application-default`
    #[arg(long, default_value = "")]
    pub account: String,

    /// Google SDK project name
    #[arg(long, default_value = "")]
    pub project: String,

    /// Google compute region
    #[arg(long)]
    pub region: Option<String>,

    /// Log level written to stderr
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// What the process was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Version,
    Help,
    Run(Config),
}

/// A problem with the command line, reported together with the usage text
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("please include a service")]
    MissingService,
    #[error("please specify a Google SDK user account")]
    MissingAccount,
    #[error("please specify a Google SDK project")]
    MissingProject,
    #[error("please select an action - export/import")]
    MissingAction,
    #[error(transparent)]
    Parse(#[from] clap::Error),
}

impl Flags {
    /// Check required flags in their historical order
    pub fn validate(self) -> Result<Invocation, UsageError> {
        if self.version {
            return Ok(Invocation::Version);
        }
        if self.help {
            return Ok(Invocation::Help);
        }
        if self.service.is_empty() {
            return Err(UsageError::MissingService);
        }
        if self.account.is_empty() {
            return Err(UsageError::MissingAccount);
        }
        if self.project.is_empty() {
            return Err(UsageError::MissingProject);
        }

        let action = match (self.export, self.import) {
            (true, false) => Action::Export,
            (false, true) => Action::Import,
            _ => return Err(UsageError::MissingAction),
        };

        Ok(Invocation::Run(Config {
            action,
            services: self.service.split(',').map(str::to_string).collect(),
            account: self.account,
            project: self.project,
            region: self.region.filter(|r| !r.is_empty()),
            readable: self.readable,
            log_level: self.log_level,
        }))
    }
}

/// Parse and validate a full argument vector (program name first)
pub fn parse_from<I, T>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let flags = Flags::try_parse_from(normalize_args(args))?;
    flags.validate()
}

/// Rewrite `-name[=value]` into `--name[=value]`, leaving the program name,
/// short flags, values and double-dash flags untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            let arg = arg.into();
            if idx == 0 {
                return arg;
            }
            match arg.to_str() {
                Some(s) if is_single_dash_long(s) => OsString::from(format!("-{}", s)),
                _ => arg,
            }
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or(rest);
    name.len() > 1 && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Usage text, optionally preceded by the error that triggered it
pub fn render_usage(error: Option<&UsageError>) -> String {
    let mut out = String::new();

    match error {
        Some(UsageError::Parse(err)) => {
            out.push_str(&err.render().to_string());
            out.push('\n');
        }
        Some(err) => out.push_str(&format!("Error: {}\n\n", err)),
        None => {}
    }

    out.push_str(&Flags::command().render_help().to_string());
    out
}
