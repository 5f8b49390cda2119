//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading rulesets, choosing
//! terminal colour and mapping errors to exit codes.

use crate::cli::args::ColorChoice;
use crate::config::load_ruleset;
use crate::error::{BindrulesError, ConfigError};
use crate::ruleset::CompiledRuleset;
use std::io::IsTerminal;
use std::path::Path;
use termcolor::StandardStream;

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;
pub const EXIT_ACTION_ERROR: i32 = 4;

/// Load a ruleset file with its ancestors and compile every table
///
/// # Errors
///
/// Returns `ConfigError` if any file in the chain cannot be loaded or any
/// rule fails validation.
pub(crate) fn load_compiled(path: &Path) -> Result<CompiledRuleset, ConfigError> {
    let ruleset = load_ruleset(path)?;
    ruleset.compile()
}

/// Map an error to the process exit code
pub(crate) fn exit_code(error: &BindrulesError) -> i32 {
    match error {
        BindrulesError::Config(ConfigError::Io(_)) => EXIT_ERROR,
        BindrulesError::Config(_) => EXIT_PARSE_ERROR,
        BindrulesError::Action(_) => EXIT_ACTION_ERROR,
        BindrulesError::Input(_) | BindrulesError::Io(_) => EXIT_ERROR,
    }
}

/// Stdout stream honouring the colour choice
pub(crate) fn stdout(choice: ColorChoice) -> StandardStream {
    let choice = match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    };
    StandardStream::stdout(choice)
}

/// Print an error and return its exit code
pub(crate) fn report(error: &BindrulesError) -> i32 {
    tracing::debug!(error = ?error, "command failed");
    eprintln!("Error: {}", error);
    exit_code(error)
}
