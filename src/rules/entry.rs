#![forbid(unsafe_code)]

//! Uncompiled rule entries, as supplied by ruleset providers

use crate::rules::action::Action;
use crate::types::{DeclarationKind, RulesetName};

/// One row of a rule table before compilation
///
/// The typed constructors fix the pattern count for their kind.
/// [`RuleEntry::positional`] accepts any number of patterns; the count is
/// checked when the entry is compiled into a [`RuleTable`](crate::rules::RuleTable).
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub kind: DeclarationKind,
    pub patterns: Vec<String>,
    pub action: Action,
    /// Ruleset that contributed this entry
    pub origin: Option<RulesetName>,
}

impl RuleEntry {
    /// Function rule: container, name, access, result type, parameters
    pub fn function(
        container: &str,
        name: &str,
        access: &str,
        result: &str,
        parameters: &str,
        action: Action,
    ) -> Self {
        Self::positional(
            DeclarationKind::Function,
            [container, name, access, result, parameters],
            action,
        )
    }

    /// Container rule: container, name, template parameters, declaration,
    /// base specifiers
    pub fn container(
        container: &str,
        name: &str,
        template_parameters: &str,
        declaration: &str,
        base_specifiers: &str,
        action: Action,
    ) -> Self {
        Self::positional(
            DeclarationKind::Container,
            [container, name, template_parameters, declaration, base_specifiers],
            action,
        )
    }

    /// Typedef rule: container, name
    pub fn typedef(container: &str, name: &str, action: Action) -> Self {
        Self::positional(DeclarationKind::Typedef, [container, name], action)
    }

    /// Forward declaration rule: container, name, template parameters
    pub fn forward_declaration(
        container: &str,
        name: &str,
        template_parameters: &str,
        action: Action,
    ) -> Self {
        Self::positional(
            DeclarationKind::ForwardDeclaration,
            [container, name, template_parameters],
            action,
        )
    }

    /// Rule with patterns in the kind's positional field order
    pub fn positional<I, S>(kind: DeclarationKind, patterns: I, action: Action) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            patterns: patterns.into_iter().map(Into::into).collect(),
            action,
            origin: None,
        }
    }

    /// Tag the entry with the ruleset that supplied it, unless already tagged
    pub fn with_origin(mut self, origin: &RulesetName) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin.clone());
        }
        self
    }
}
