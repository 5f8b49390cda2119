//! Ruleset file parsing and loading

pub mod ruleset_toml;

pub use ruleset_toml::{RuleDef, RulesetDefinition, RulesetLoader, RulesetMeta, load_ruleset};
