#![forbid(unsafe_code)]

//! Ruleset composition
//!
//! A Ruleset bundles one rule provider per declaration kind and an ordered
//! list of ancestor rulesets. Building the table for a kind concatenates the
//! local rules with every ancestor's rules, most specific first, so local
//! rules shadow inherited ones. Nothing is mutated in place: ancestors are
//! shared through `Arc` and only ever read.

use crate::error::ConfigError;
use crate::record::DeclarationRecord;
use crate::rules::{RuleDatabase, RuleEntry, RuleMatch, RuleTable, RuleUsage};
use crate::types::{DeclarationKind, RulesetName};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Zero-argument provider of a local rule table
pub type RuleProvider = Arc<dyn Fn() -> Vec<RuleEntry> + Send + Sync>;

/// A named, layered bundle of rule tables
#[derive(Clone)]
pub struct Ruleset {
    name: RulesetName,
    description: Option<String>,
    parents: Vec<Arc<Ruleset>>,
    providers: BTreeMap<DeclarationKind, RuleProvider>,
}

impl fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ruleset")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("kinds", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Ruleset {
    /// Create a ruleset with no local rules and no ancestors
    pub fn new(name: RulesetName) -> Self {
        Self {
            name,
            description: None,
            parents: Vec::new(),
            providers: BTreeMap::new(),
        }
    }

    /// Attach a one-line summary shown by `check`
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an ancestor; earlier ancestors take precedence over later ones
    pub fn extends(mut self, parent: Arc<Ruleset>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Set the local rule provider for `kind`
    pub fn with_rules<F>(mut self, kind: DeclarationKind, provider: F) -> Self
    where
        F: Fn() -> Vec<RuleEntry> + Send + Sync + 'static,
    {
        self.providers.insert(kind, Arc::new(provider));
        self
    }

    /// Set the local rules for `kind` from a fixed list
    pub fn with_entries(self, kind: DeclarationKind, entries: Vec<RuleEntry>) -> Self {
        self.with_rules(kind, move || entries.clone())
    }

    pub fn name(&self) -> &RulesetName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parents(&self) -> &[Arc<Ruleset>] {
        &self.parents
    }

    /// Rules this ruleset itself contributes for `kind`
    pub fn local(&self, kind: DeclarationKind) -> Vec<RuleEntry> {
        match self.providers.get(&kind) {
            Some(provider) => provider()
                .into_iter()
                .map(|entry| entry.with_origin(&self.name))
                .collect(),
            None => Vec::new(),
        }
    }

    /// The effective rule list for `kind`: local rules, then each ancestor's
    /// effective rules in order
    pub fn build(&self, kind: DeclarationKind) -> Vec<RuleEntry> {
        let mut entries = self.local(kind);
        for parent in &self.parents {
            entries.extend(parent.build(kind));
        }
        entries
    }

    /// Names of this ruleset and its ancestors, depth-first
    pub fn lineage(&self) -> Vec<RulesetName> {
        let mut names = vec![self.name.clone()];
        for parent in &self.parents {
            names.extend(parent.lineage());
        }
        names
    }

    /// Build and compile the tables for every kind
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` raised while compiling a table.
    pub fn compile(&self) -> Result<CompiledRuleset, ConfigError> {
        let mut databases = BTreeMap::new();
        for kind in DeclarationKind::ALL {
            let table = RuleTable::new(kind, self.build(kind))?;
            tracing::debug!(
                ruleset = %self.name,
                kind = %kind,
                rules = table.len(),
                "compiled rule table"
            );
            databases.insert(kind, RuleDatabase::from_table(table));
        }

        Ok(CompiledRuleset {
            name: self.name.clone(),
            description: self.description.clone(),
            lineage: self.lineage(),
            databases,
        })
    }
}

/// A ruleset whose tables have been built and validated
///
/// Read-only apart from the usage counters of its databases, so a single
/// instance can serve a whole generation pass, including a parallel one.
#[derive(Debug)]
pub struct CompiledRuleset {
    name: RulesetName,
    description: Option<String>,
    lineage: Vec<RulesetName>,
    databases: BTreeMap<DeclarationKind, RuleDatabase>,
}

impl CompiledRuleset {
    pub fn name(&self) -> &RulesetName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn lineage(&self) -> &[RulesetName] {
        &self.lineage
    }

    /// The database for `kind`
    pub fn database(&self, kind: DeclarationKind) -> &RuleDatabase {
        // compile() fills every kind
        &self.databases[&kind]
    }

    /// Resolve `record` against the database for its own kind
    pub fn resolve(&self, record: &DeclarationRecord) -> Result<Option<RuleMatch<'_>>, ConfigError> {
        self.database(record.kind).resolve(record)
    }

    /// Hit counts for every rule of every kind
    pub fn usage(&self) -> Vec<RuleUsage> {
        self.databases.values().flat_map(RuleDatabase::usage).collect()
    }

    /// Rules of every kind that never matched
    pub fn unused(&self) -> Vec<RuleUsage> {
        self.databases.values().flat_map(RuleDatabase::unused).collect()
    }

    /// Total number of rules across all kinds
    pub fn len(&self) -> usize {
        self.databases.values().map(RuleDatabase::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
