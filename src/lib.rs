#![forbid(unsafe_code)]

//! bindrules: declarative override rules for binding generators
//!
//! A binding generator walks the public declarations of a C++ library and
//! asks a [`ruleset::CompiledRuleset`] what to do with each one. Rules are
//! ordered pattern-to-action tables, one per declaration kind; the first
//! rule whose patterns fully match a declaration either discards it or
//! rewrites its intermediate form before emission.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod record;
pub mod rules;
pub mod ruleset;
pub mod types;

// Re-export error types for convenient access
pub use error::{ActionError, BindrulesError, ConfigError, InputError};

// Re-export core domain types for convenient access
pub use record::{DeclarationRecord, IntermediateForm};
pub use rules::{Action, MatchContext, RuleDatabase, RuleEntry};
pub use ruleset::{CompiledRuleset, Ruleset};
pub use types::{AccessSpecifier, DeclarationKind, RecordField, RulesetName};
