#![forbid(unsafe_code)]

//! Core domain types for bindrules
//!
//! This module defines the fundamental types shared by records, rules and
//! rulesets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of declaration a generation pass can encounter
///
/// Each kind has its own rule table with its own pattern schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Container,
    Typedef,
    ForwardDeclaration,
}

impl DeclarationKind {
    /// All kinds, in the order tables are reported
    pub const ALL: [DeclarationKind; 4] = [
        DeclarationKind::Function,
        DeclarationKind::Container,
        DeclarationKind::Typedef,
        DeclarationKind::ForwardDeclaration,
    ];

    /// Fields a rule of this kind matches against, in positional order
    pub fn fields(self) -> &'static [RecordField] {
        match self {
            DeclarationKind::Function => &[
                RecordField::Container,
                RecordField::Name,
                RecordField::Access,
                RecordField::Result,
                RecordField::Parameters,
            ],
            DeclarationKind::Container => &[
                RecordField::Container,
                RecordField::Name,
                RecordField::TemplateParameters,
                RecordField::Declaration,
                RecordField::BaseSpecifiers,
            ],
            DeclarationKind::Typedef => &[RecordField::Container, RecordField::Name],
            DeclarationKind::ForwardDeclaration => &[
                RecordField::Container,
                RecordField::Name,
                RecordField::TemplateParameters,
            ],
        }
    }

    /// Number of pattern fields a rule of this kind must carry
    pub fn arity(self) -> usize {
        self.fields().len()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Container => "container",
            DeclarationKind::Typedef => "typedef",
            DeclarationKind::ForwardDeclaration => "forward_declaration",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C++ access level of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
    #[default]
    Unspecified,
}

impl AccessSpecifier {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessSpecifier::Public => "public",
            AccessSpecifier::Protected => "protected",
            AccessSpecifier::Private => "private",
            AccessSpecifier::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for AccessSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field of a declaration record that a rule pattern can match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    /// Fully-qualified name of the enclosing scope
    Container,
    /// The declaration's own identifier
    Name,
    /// Access specifier, lowercase
    Access,
    /// Function result type (`fn_result` in the intermediate form)
    Result,
    /// Function parameter text
    Parameters,
    /// Template parameters joined with ", "
    TemplateParameters,
    /// Container declaration text
    Declaration,
    /// Base specifiers joined with ", "
    BaseSpecifiers,
}

impl RecordField {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordField::Container => "container",
            RecordField::Name => "name",
            RecordField::Access => "access",
            RecordField::Result => "result",
            RecordField::Parameters => "parameters",
            RecordField::TemplateParameters => "template_parameters",
            RecordField::Declaration => "declaration",
            RecordField::BaseSpecifiers => "base_specifiers",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated ruleset name
///
/// Names must be non-empty and contain only alphanumeric characters, hyphens,
/// underscores and dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RulesetName(String);

impl RulesetName {
    /// Creates a new RulesetName, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            return None;
        }
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return None;
        }
        Some(RulesetName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RulesetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RulesetName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RulesetName::new(value.clone()).ok_or_else(|| format!("Invalid ruleset name: {}", value))
    }
}

impl From<RulesetName> for String {
    fn from(name: RulesetName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_name_validation() {
        assert!(RulesetName::new("PyKF5").is_some());
        assert!(RulesetName::new("qt5-base").is_some());
        assert!(RulesetName::new("kf5.core_addons").is_some());
        assert!(RulesetName::new("").is_none());
        assert!(RulesetName::new("bad name").is_none());
        assert!(RulesetName::new("bad/name").is_none());
    }

    #[test]
    fn test_kind_arity() {
        assert_eq!(DeclarationKind::Function.arity(), 5);
        assert_eq!(DeclarationKind::Container.arity(), 5);
        assert_eq!(DeclarationKind::Typedef.arity(), 2);
        assert_eq!(DeclarationKind::ForwardDeclaration.arity(), 3);
    }

    #[test]
    fn test_every_kind_starts_with_container_and_name() {
        for kind in DeclarationKind::ALL {
            assert_eq!(&kind.fields()[..2], &[RecordField::Container, RecordField::Name]);
        }
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&DeclarationKind::ForwardDeclaration).unwrap();
        assert_eq!(json, "\"forward_declaration\"");

        let kind: DeclarationKind = serde_json::from_str("\"typedef\"").unwrap();
        assert_eq!(kind, DeclarationKind::Typedef);
        assert_eq!(kind.to_string(), "typedef");
    }

    #[test]
    fn test_access_default_is_unspecified() {
        assert_eq!(AccessSpecifier::default(), AccessSpecifier::Unspecified);
        assert_eq!(AccessSpecifier::Protected.as_str(), "protected");
    }
}
