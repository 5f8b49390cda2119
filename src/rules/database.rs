#![forbid(unsafe_code)]

//! Rule databases: one compiled table per declaration kind
//!
//! The RuleDatabase is responsible for:
//! - Answering which rule, if any, applies to a declaration
//! - Rejecting records of a kind it was not built for
//! - Counting how often each rule fired, so stale rules can be found

use crate::error::ConfigError;
use crate::record::DeclarationRecord;
use crate::rules::action::Action;
use crate::rules::entry::RuleEntry;
use crate::rules::pattern::MatchContext;
use crate::rules::table::{CompiledRule, RuleTable};
use crate::types::{DeclarationKind, RulesetName};
use std::sync::atomic::{AtomicU64, Ordering};

/// The rule that matched a declaration
#[derive(Debug, Clone)]
pub struct RuleMatch<'a> {
    /// Position of the rule in the flattened table
    pub index: usize,
    pub action: &'a Action,
    pub origin: Option<&'a RulesetName>,
    pub context: MatchContext,
}

/// Hit count for one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUsage {
    pub kind: DeclarationKind,
    pub index: usize,
    pub origin: Option<RulesetName>,
    pub patterns: Vec<String>,
    pub action: String,
    pub hits: u64,
}

/// Resolves declarations of one kind against an ordered rule table
#[derive(Debug)]
pub struct RuleDatabase {
    table: RuleTable,
    hits: Vec<AtomicU64>,
}

impl RuleDatabase {
    /// Compile `entries` into a database for `kind`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any entry is malformed; see [`RuleTable::new`].
    pub fn new(kind: DeclarationKind, entries: Vec<RuleEntry>) -> Result<Self, ConfigError> {
        Ok(Self::from_table(RuleTable::new(kind, entries)?))
    }

    pub fn from_table(table: RuleTable) -> Self {
        let hits = (0..table.len()).map(|_| AtomicU64::new(0)).collect();
        Self { table, hits }
    }

    pub fn kind(&self) -> DeclarationKind {
        self.table.kind()
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Find the first rule that matches `record`
    ///
    /// Returns `Ok(None)` when no rule matches; the declaration then passes
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::KindMismatch` if `record` is not of this
    /// database's kind.
    pub fn resolve(&self, record: &DeclarationRecord) -> Result<Option<RuleMatch<'_>>, ConfigError> {
        if record.kind != self.kind() {
            return Err(ConfigError::KindMismatch {
                expected: self.kind(),
                found: record.kind,
                subject: format!("declaration '{}'", record.qualified_name()),
            });
        }

        let Some((rule, context)) = self.table.first_match(record) else {
            return Ok(None);
        };

        self.hits[rule.index].fetch_add(1, Ordering::Relaxed);

        Ok(Some(RuleMatch {
            index: rule.index,
            action: &rule.action,
            origin: rule.origin.as_ref(),
            context,
        }))
    }

    /// Hit counts for every rule, in table order
    pub fn usage(&self) -> Vec<RuleUsage> {
        self.table
            .rules()
            .iter()
            .map(|rule| self.usage_of(rule))
            .collect()
    }

    /// Rules that have not matched any declaration so far
    pub fn unused(&self) -> Vec<RuleUsage> {
        self.usage().into_iter().filter(|u| u.hits == 0).collect()
    }

    /// Clear all hit counters
    pub fn reset_usage(&self) {
        for hits in &self.hits {
            hits.store(0, Ordering::Relaxed);
        }
    }

    fn usage_of(&self, rule: &CompiledRule) -> RuleUsage {
        RuleUsage {
            kind: self.kind(),
            index: rule.index,
            origin: rule.origin.clone(),
            patterns: rule
                .pattern_sources()
                .into_iter()
                .map(str::to_string)
                .collect(),
            action: rule.action.label().to_string(),
            hits: self.hits[rule.index].load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
