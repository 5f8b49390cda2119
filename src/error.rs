//! Error types for bindrules
//!
//! Configuration problems (malformed patterns, wrong arity, kind mismatches,
//! unreadable rule files) are fatal and surface before any declaration is
//! processed. Failures raised by rewrite actions are reported separately so
//! the caller can name the declaration that could not be transformed.

use crate::types::DeclarationKind;
use std::path::PathBuf;

/// Rule configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A pattern field is not a valid regular expression
    #[error(
        "Invalid pattern '{pattern}' in {kind} rule #{index}{}: {message}",
        origin_suffix(.origin)
    )]
    InvalidPattern {
        kind: DeclarationKind,
        index: usize,
        origin: Option<String>,
        pattern: String,
        message: String,
    },

    /// A rule has the wrong number of pattern fields for its kind
    #[error(
        "Wrong arity in {kind} rule #{index}{}: expected {expected} patterns, found {found}",
        origin_suffix(.origin)
    )]
    WrongArity {
        kind: DeclarationKind,
        index: usize,
        origin: Option<String>,
        expected: usize,
        found: usize,
    },

    /// A rule or record of one kind was handed to a table of another kind
    #[error("{found} {subject} used with the {expected} rule table")]
    KindMismatch {
        expected: DeclarationKind,
        found: DeclarationKind,
        subject: String,
    },

    /// Rule file could not be parsed
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Invalid value in a rule file
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Rule files extend each other in a loop
    #[error("Ruleset inheritance cycle: {0}")]
    InheritanceCycle(String),

    /// I/O error while reading rule files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn origin_suffix(origin: &Option<String>) -> String {
    match origin {
        Some(name) => format!(" (from ruleset '{}')", name),
        None => String::new(),
    }
}

/// A rewrite action failed while transforming a declaration
#[derive(Debug, thiserror::Error)]
#[error("Action '{action}' of {kind} rule #{rule} failed on '{}': {message}", qualified(.container, .name))]
pub struct ActionError {
    pub kind: DeclarationKind,
    pub container: String,
    pub name: String,
    pub rule: usize,
    pub action: String,
    pub message: String,
}

fn qualified(container: &str, name: &str) -> String {
    if container.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", container, name)
    }
}

/// Malformed declaration input
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// A line is not a valid declaration record
    #[error("Invalid declaration on line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// I/O error while reading declarations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type for bindrules
#[derive(Debug, thiserror::Error)]
pub enum BindrulesError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Action error
    #[error("Transformation error: {0}")]
    Action(#[from] ActionError),

    /// Input error
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_names_index_and_kind() {
        let err = ConfigError::InvalidPattern {
            kind: DeclarationKind::Function,
            index: 3,
            origin: Some("PyKF5".to_string()),
            pattern: "[unclosed".to_string(),
            message: "unclosed character class".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("function rule #3"));
        assert!(msg.contains("PyKF5"));
        assert!(msg.contains("[unclosed"));
    }

    #[test]
    fn test_wrong_arity_without_origin() {
        let err = ConfigError::WrongArity {
            kind: DeclarationKind::Typedef,
            index: 0,
            origin: None,
            expected: 2,
            found: 5,
        };

        assert_eq!(
            err.to_string(),
            "Wrong arity in typedef rule #0: expected 2 patterns, found 5"
        );
    }

    #[test]
    fn test_action_error_qualifies_name() {
        let err = ActionError {
            kind: DeclarationKind::Container,
            container: "KDE".to_string(),
            name: "KUserId".to_string(),
            rule: 1,
            action: "explode".to_string(),
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("'KDE::KUserId'"));

        let top_level = ActionError {
            container: String::new(),
            ..err
        };
        assert!(top_level.to_string().contains("'KUserId'"));
    }

    #[test]
    fn test_error_conversion_to_top_level() {
        let err: BindrulesError = ConfigError::InheritanceCycle("a -> a".to_string()).into();
        assert!(matches!(err, BindrulesError::Config(_)));

        let err: BindrulesError = InputError::Malformed {
            line: 4,
            message: "eof".to_string(),
        }
        .into();
        assert!(err.to_string().contains("line 4"));
    }
}
