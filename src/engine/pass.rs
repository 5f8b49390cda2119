#![forbid(unsafe_code)]

//! Generation pass driver
//!
//! This module provides the GenerationPass which runs every declaration of a
//! pass through a compiled ruleset, optionally in parallel using rayon.
//! Results always come back in input order.

use crate::engine::apply::{Disposition, Outcome, apply_match};
use crate::error::BindrulesError;
use crate::record::DeclarationRecord;
use crate::ruleset::CompiledRuleset;
use crate::types::{DeclarationKind, RulesetName};
use rayon::prelude::*;
use serde::Serialize;

/// What happened to one input declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PassItem {
    pub kind: DeclarationKind,
    pub container: String,
    pub name: String,
    pub disposition: Disposition,
    /// Ruleset that supplied the matching rule
    pub origin: Option<RulesetName>,
    /// Attributes whose value the rule changed
    pub changed: Vec<String>,
    /// The record to emit; `None` when discarded
    pub record: Option<DeclarationRecord>,
}

/// Counts per disposition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub declarations: u64,
    pub unmatched: u64,
    pub rewritten: u64,
    pub discarded: u64,
}

impl PassSummary {
    pub fn emitted(&self) -> u64 {
        self.declarations - self.discarded
    }
}

/// Result of a generation pass
#[derive(Debug, Clone, Default)]
pub struct PassResult {
    pub items: Vec<PassItem>,
}

impl PassResult {
    /// Records to hand to the emitter, in input order
    pub fn emitted(&self) -> impl Iterator<Item = &DeclarationRecord> {
        self.items.iter().filter_map(|item| item.record.as_ref())
    }

    pub fn summary(&self) -> PassSummary {
        let mut summary = PassSummary {
            declarations: self.items.len() as u64,
            ..PassSummary::default()
        };
        for item in &self.items {
            match item.disposition {
                Disposition::Unmatched => summary.unmatched += 1,
                Disposition::Rewritten { .. } => summary.rewritten += 1,
                Disposition::Discarded { .. } => summary.discarded += 1,
            }
        }
        summary
    }
}

/// Runs declarations through a compiled ruleset
pub struct GenerationPass<'a> {
    ruleset: &'a CompiledRuleset,
    parallel: bool,
}

impl<'a> GenerationPass<'a> {
    pub fn new(ruleset: &'a CompiledRuleset) -> Self {
        Self {
            ruleset,
            parallel: false,
        }
    }

    /// Match declarations on the rayon thread pool
    ///
    /// Output order and error reporting are the same as for a sequential pass.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process every record
    ///
    /// # Errors
    ///
    /// Returns the error of the earliest failing declaration in input order.
    /// No partial result is returned.
    pub fn run(&self, records: Vec<DeclarationRecord>) -> Result<PassResult, BindrulesError> {
        let results: Vec<Result<PassItem, BindrulesError>> = if self.parallel {
            records
                .into_par_iter()
                .map(|record| self.process(record))
                .collect()
        } else {
            records
                .into_iter()
                .map(|record| self.process(record))
                .collect()
        };

        let items = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        let result = PassResult { items };

        let summary = result.summary();
        tracing::info!(
            ruleset = %self.ruleset.name(),
            declarations = summary.declarations,
            rewritten = summary.rewritten,
            discarded = summary.discarded,
            unmatched = summary.unmatched,
            "generation pass finished"
        );

        Ok(result)
    }

    /// Resolve and apply the rule for a single declaration
    pub fn process(&self, record: DeclarationRecord) -> Result<PassItem, BindrulesError> {
        let resolved = self.ruleset.resolve(&record)?;

        let kind = record.kind;
        let container = record.container.clone();
        let name = record.name.clone();
        let before = resolved.as_ref().map(|_| record.form.clone());
        let origin = resolved.as_ref().and_then(|m| m.origin.cloned());

        let (outcome, disposition) = apply_match(record, resolved.as_ref())?;

        let changed = match (&outcome, &before) {
            (Outcome::Kept(after), Some(before)) => before.changed_keys(&after.form),
            _ => Vec::new(),
        };

        if let Some(rule) = disposition.rule() {
            tracing::debug!(
                kind = %kind,
                container = %container,
                name = %name,
                rule,
                origin = origin.as_ref().map(|o| o.as_str()).unwrap_or("-"),
                disposition = disposition.as_str(),
                "rule applied"
            );
        }

        Ok(PassItem {
            kind,
            container,
            name,
            disposition,
            origin,
            changed,
            record: outcome.into_record(),
        })
    }
}
