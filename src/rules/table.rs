#![forbid(unsafe_code)]

//! Compiled rule tables
//!
//! A RuleTable owns the validated, compiled entries for one declaration
//! kind. Every entry is checked when the table is built, so a malformed
//! pattern is reported before any declaration is matched.

use crate::error::ConfigError;
use crate::record::DeclarationRecord;
use crate::rules::action::Action;
use crate::rules::entry::RuleEntry;
use crate::rules::pattern::{FieldPattern, MatchContext};
use crate::types::{DeclarationKind, RulesetName};

/// A rule whose patterns have been compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub index: usize,
    pub patterns: Vec<FieldPattern>,
    pub action: Action,
    pub origin: Option<RulesetName>,
}

impl CompiledRule {
    /// Match every pattern against its record field, collecting captures
    fn matches(&self, kind: DeclarationKind, record: &DeclarationRecord) -> Option<MatchContext> {
        let mut fields = Vec::with_capacity(self.patterns.len());
        for (pattern, &field) in self.patterns.iter().zip(kind.fields()) {
            let value = record.field(field);
            fields.push(pattern.capture(field, &value)?);
        }
        Some(MatchContext::new(fields))
    }

    /// Pattern sources as written
    pub fn pattern_sources(&self) -> Vec<&str> {
        self.patterns.iter().map(FieldPattern::as_str).collect()
    }
}

/// Ordered, compiled rules for one declaration kind
#[derive(Debug, Clone)]
pub struct RuleTable {
    kind: DeclarationKind,
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    /// Validate and compile `entries`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the entry index and kind if:
    /// - an entry belongs to another kind
    /// - an entry has the wrong number of patterns
    /// - a pattern is not a valid regular expression
    pub fn new(kind: DeclarationKind, entries: Vec<RuleEntry>) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            let origin_name = entry.origin.as_ref().map(|o| o.to_string());

            if entry.kind != kind {
                return Err(ConfigError::KindMismatch {
                    expected: kind,
                    found: entry.kind,
                    subject: match &origin_name {
                        Some(origin) => format!("rule #{} (from ruleset '{}')", index, origin),
                        None => format!("rule #{}", index),
                    },
                });
            }

            if entry.patterns.len() != kind.arity() {
                return Err(ConfigError::WrongArity {
                    kind,
                    index,
                    origin: origin_name,
                    expected: kind.arity(),
                    found: entry.patterns.len(),
                });
            }

            let mut patterns = Vec::with_capacity(entry.patterns.len());
            for source in &entry.patterns {
                let pattern =
                    FieldPattern::new(source).map_err(|e| ConfigError::InvalidPattern {
                        kind,
                        index,
                        origin: origin_name.clone(),
                        pattern: source.clone(),
                        message: e.to_string(),
                    })?;
                patterns.push(pattern);
            }

            rules.push(CompiledRule {
                index,
                patterns,
                action: entry.action,
                origin: entry.origin,
            });
        }

        Ok(Self { kind, rules })
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// First rule whose every pattern fully matches the record
    ///
    /// The record's kind is not checked here; see
    /// [`RuleDatabase::resolve`](crate::rules::RuleDatabase::resolve).
    pub fn first_match(&self, record: &DeclarationRecord) -> Option<(&CompiledRule, MatchContext)> {
        self.rules
            .iter()
            .find_map(|rule| rule.matches(self.kind, record).map(|ctx| (rule, ctx)))
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&CompiledRule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
