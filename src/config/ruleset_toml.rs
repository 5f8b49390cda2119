//! Parsing and loading of ruleset TOML files
//!
//! A ruleset file names itself, lists the files it extends and carries one
//! array of tables per declaration kind:
//!
//! ```toml
//! [ruleset]
//! name = "PyKF5"
//! extends = ["qt5.toml"]
//!
//! [[typedef]]
//! name = "K_UID"
//! action = { rewrite_decl = "unsigned int" }
//! ```
//!
//! Pattern fields that are left out default to `.*`.

use crate::error::ConfigError;
use crate::rules::{ActionSpec, RuleEntry};
use crate::ruleset::Ruleset;
use crate::types::{DeclarationKind, RecordField, RulesetName};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const WILDCARD: &str = ".*";

/// Parsed contents of one ruleset file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesetDefinition {
    pub ruleset: RulesetMeta,

    #[serde(default)]
    pub function: Vec<RuleDef>,

    #[serde(default)]
    pub container: Vec<RuleDef>,

    #[serde(default)]
    pub typedef: Vec<RuleDef>,

    #[serde(default)]
    pub forward_declaration: Vec<RuleDef>,
}

/// The `[ruleset]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesetMeta {
    pub name: RulesetName,

    /// Files this ruleset extends, relative to this file, most specific first
    #[serde(default)]
    pub extends: Vec<PathBuf>,

    /// One-line summary printed by `check`
    #[serde(default)]
    pub description: Option<String>,
}

/// One rule as written in a file
///
/// Patterns are given either by field name or positionally through
/// `patterns`, never both.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub container: Option<String>,
    pub name: Option<String>,
    pub access: Option<String>,
    pub result: Option<String>,
    pub parameters: Option<String>,
    pub template_parameters: Option<String>,
    pub declaration: Option<String>,
    pub base_specifiers: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub action: ActionSpec,
}

impl RuleDef {
    fn named(&self, field: RecordField) -> Option<&String> {
        match field {
            RecordField::Container => self.container.as_ref(),
            RecordField::Name => self.name.as_ref(),
            RecordField::Access => self.access.as_ref(),
            RecordField::Result => self.result.as_ref(),
            RecordField::Parameters => self.parameters.as_ref(),
            RecordField::TemplateParameters => self.template_parameters.as_ref(),
            RecordField::Declaration => self.declaration.as_ref(),
            RecordField::BaseSpecifiers => self.base_specifiers.as_ref(),
        }
    }

    /// Convert to a rule entry of `kind`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the rule names a field that
    /// `kind` does not match on, or mixes named and positional patterns.
    pub fn to_entry(&self, kind: DeclarationKind, index: usize) -> Result<RuleEntry, ConfigError> {
        const ALL_FIELDS: [RecordField; 8] = [
            RecordField::Container,
            RecordField::Name,
            RecordField::Access,
            RecordField::Result,
            RecordField::Parameters,
            RecordField::TemplateParameters,
            RecordField::Declaration,
            RecordField::BaseSpecifiers,
        ];

        let location = format!("{} rule #{}", kind, index);

        for field in ALL_FIELDS {
            if self.named(field).is_some() && !kind.fields().contains(&field) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.{}", location, field),
                    message: format!("{} rules do not match on '{}'", kind, field),
                });
            }
        }

        let action = self.action.to_action();

        if let Some(patterns) = &self.patterns {
            if kind.fields().iter().any(|&f| self.named(f).is_some()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.patterns", location),
                    message: "positional patterns cannot be combined with named fields"
                        .to_string(),
                });
            }
            return Ok(RuleEntry::positional(kind, patterns.clone(), action));
        }

        let patterns = kind
            .fields()
            .iter()
            .map(|&f| self.named(f).cloned().unwrap_or_else(|| WILDCARD.to_string()));
        Ok(RuleEntry::positional(kind, patterns, action))
    }
}

impl RulesetDefinition {
    /// Parse a ruleset definition from a TOML string
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn defs(&self, kind: DeclarationKind) -> &[RuleDef] {
        match kind {
            DeclarationKind::Function => &self.function,
            DeclarationKind::Container => &self.container,
            DeclarationKind::Typedef => &self.typedef,
            DeclarationKind::ForwardDeclaration => &self.forward_declaration,
        }
    }

    /// Local rule entries for `kind`, in file order
    pub fn entries(&self, kind: DeclarationKind) -> Result<Vec<RuleEntry>, ConfigError> {
        self.defs(kind)
            .iter()
            .enumerate()
            .map(|(index, def)| def.to_entry(kind, index))
            .collect()
    }

    /// Build a ruleset from this definition and its already-loaded parents
    pub fn into_ruleset(self, parents: Vec<Arc<Ruleset>>) -> Result<Ruleset, ConfigError> {
        let mut ruleset = Ruleset::new(self.ruleset.name.clone());
        if let Some(description) = &self.ruleset.description {
            ruleset = ruleset.with_description(description.clone());
        }
        for parent in parents {
            ruleset = ruleset.extends(parent);
        }
        for kind in DeclarationKind::ALL {
            let entries = self.entries(kind)?;
            if !entries.is_empty() {
                ruleset = ruleset.with_entries(kind, entries);
            }
        }
        Ok(ruleset)
    }
}

/// Loads ruleset files and the files they extend
///
/// A file reached through several `extends` paths is loaded once and shared.
#[derive(Debug, Default)]
pub struct RulesetLoader {
    loaded: HashMap<PathBuf, Arc<Ruleset>>,
}

impl RulesetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ruleset at `path` with its whole inheritance chain
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a file cannot be read or parsed, holds an
    /// invalid rule, or the `extends` chain loops back on itself.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Ruleset>, ConfigError> {
        let mut stack = Vec::new();
        self.load_inner(path, &mut stack)
    }

    fn load_inner(
        &mut self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Arc<Ruleset>, ConfigError> {
        let canonical = fs::canonicalize(path).map_err(|e| {
            ConfigError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        if let Some(start) = stack.iter().position(|p| p == &canonical) {
            let chain: Vec<String> = stack[start..]
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect();
            return Err(ConfigError::InheritanceCycle(chain.join(" -> ")));
        }

        if let Some(ruleset) = self.loaded.get(&canonical) {
            return Ok(Arc::clone(ruleset));
        }

        let content = fs::read_to_string(&canonical)?;
        let definition = RulesetDefinition::parse(&content, &canonical)?;
        let base_dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        stack.push(canonical.clone());
        let mut parents = Vec::with_capacity(definition.ruleset.extends.len());
        for parent in &definition.ruleset.extends {
            parents.push(self.load_inner(&base_dir.join(parent), stack)?);
        }
        stack.pop();

        let ruleset = Arc::new(definition.into_ruleset(parents)?);
        tracing::debug!(
            path = %canonical.display(),
            ruleset = %ruleset.name(),
            "loaded ruleset"
        );

        self.loaded.insert(canonical, Arc::clone(&ruleset));
        Ok(ruleset)
    }
}

/// Load a ruleset file with a fresh loader
pub fn load_ruleset(path: impl AsRef<Path>) -> Result<Arc<Ruleset>, ConfigError> {
    RulesetLoader::new().load(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Action;
    use std::fs;
    use tempfile::TempDir;

    const PYKF5: &str = r#"
[ruleset]
name = "PyKF5"

[[container]]
name = "KUserId"
action = "discard_base"

[[function]]
container = "KUser"
name = "KUser"
parameters = ".*passwd.*"
action = "discard"

[[typedef]]
name = "K_UID"
action = { rewrite_decl = "unsigned int" }

[[typedef]]
patterns = ["KPluginFactory", "CreateInstanceFunction"]
action = "discard"
"#;

    fn parse(content: &str) -> Result<RulesetDefinition, ConfigError> {
        RulesetDefinition::parse(content, Path::new("test.toml"))
    }

    #[test]
    fn test_parse_named_and_positional_rules() {
        let def = parse(PYKF5).unwrap();
        assert_eq!(def.ruleset.name.as_str(), "PyKF5");

        let containers = def.entries(DeclarationKind::Container).unwrap();
        assert_eq!(containers[0].patterns, vec![".*", "KUserId", ".*", ".*", ".*"]);

        let functions = def.entries(DeclarationKind::Function).unwrap();
        assert_eq!(
            functions[0].patterns,
            vec!["KUser", "KUser", ".*", ".*", ".*passwd.*"]
        );
        assert!(matches!(functions[0].action, Action::Discard));

        let typedefs = def.entries(DeclarationKind::Typedef).unwrap();
        assert_eq!(typedefs.len(), 2);
        assert_eq!(typedefs[0].action.label(), "rewrite_decl(unsigned int)");
        assert_eq!(typedefs[1].patterns, vec!["KPluginFactory", "CreateInstanceFunction"]);
    }

    #[test]
    fn test_description_carried_to_ruleset() {
        let def = parse(
            "[ruleset]\nname = \"Qt5\"\ndescription = \"Rules every Qt5 binding inherits\"\n",
        )
        .unwrap();
        let ruleset = def.into_ruleset(vec![]).unwrap();
        assert_eq!(ruleset.description(), Some("Rules every Qt5 binding inherits"));

        let plain = parse(PYKF5).unwrap().into_ruleset(vec![]).unwrap();
        assert_eq!(plain.description(), None);
    }

    #[test]
    fn test_field_not_valid_for_kind() {
        let def = parse(
            r#"
[ruleset]
name = "Bad"

[[typedef]]
name = "K_UID"
parameters = "int"
action = "discard"
"#,
        )
        .unwrap();

        let err = def.entries(DeclarationKind::Typedef).unwrap_err();
        assert!(err.to_string().contains("typedef rule #0.parameters"));
    }

    #[test]
    fn test_mixed_named_and_positional() {
        let def = parse(
            r#"
[ruleset]
name = "Bad"

[[typedef]]
name = "K_UID"
patterns = [".*", "K_UID"]
action = "discard"
"#,
        )
        .unwrap();
        assert!(def.entries(DeclarationKind::Typedef).is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = parse(
            r#"
[ruleset]
name = "Bad"

[[typedef]]
nmae = "K_UID"
action = "discard"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        assert!(parse("[ruleset]\nname = \"bad name\"\n").is_err());
        assert!(parse("[[typedef]]\naction = \"discard\"\n").is_err());
    }

    #[test]
    fn test_positional_arity_checked_on_compile() {
        let def = parse(
            r#"
[ruleset]
name = "Short"

[[function]]
patterns = ["KUser", "KUser"]
action = "discard"
"#,
        )
        .unwrap();

        let ruleset = def.into_ruleset(vec![]).unwrap();
        let err = ruleset.compile().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongArity {
                expected: 5,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_loader_resolves_extends() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("qt5.toml"),
            r#"
[ruleset]
name = "Qt5"

[[forward_declaration]]
name = "QWidget"
action = "mark_external"
"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("pykf5.toml"),
            format!("{}\n", PYKF5.replace("name = \"PyKF5\"", "name = \"PyKF5\"\nextends = [\"qt5.toml\"]")),
        )
        .unwrap();

        let ruleset = load_ruleset(dir.path().join("pykf5.toml")).unwrap();
        let lineage: Vec<_> = ruleset.lineage().iter().map(|n| n.to_string()).collect();
        assert_eq!(lineage, vec!["PyKF5", "Qt5"]);
        assert_eq!(ruleset.build(DeclarationKind::ForwardDeclaration).len(), 1);
    }

    #[test]
    fn test_loader_shares_common_ancestor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.toml"), "[ruleset]\nname = \"Base\"\n").unwrap();
        fs::write(
            dir.path().join("a.toml"),
            "[ruleset]\nname = \"A\"\nextends = [\"base.toml\"]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.toml"),
            "[ruleset]\nname = \"B\"\nextends = [\"base.toml\"]\n",
        )
        .unwrap();

        let mut loader = RulesetLoader::new();
        let a = loader.load(&dir.path().join("a.toml")).unwrap();
        let b = loader.load(&dir.path().join("b.toml")).unwrap();
        assert!(Arc::ptr_eq(&a.parents()[0], &b.parents()[0]));
    }

    #[test]
    fn test_loader_rejects_cycle() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.toml"),
            "[ruleset]\nname = \"A\"\nextends = [\"b.toml\"]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.toml"),
            "[ruleset]\nname = \"B\"\nextends = [\"a.toml\"]\n",
        )
        .unwrap();

        let err = load_ruleset(dir.path().join("a.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InheritanceCycle(_)));
        assert!(err.to_string().contains("a.toml"));
    }

    #[test]
    fn test_loader_missing_file() {
        let err = load_ruleset("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().contains("/nonexistent/rules.toml"));
    }
}
