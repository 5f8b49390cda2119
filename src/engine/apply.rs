#![forbid(unsafe_code)]

//! Transformation application
//!
//! Turns a resolved action into the final form of a declaration. Discard
//! short-circuits without calling anything; a rewrite edits a copy of the
//! form and only replaces the record's form when the callable succeeds.

use crate::error::ActionError;
use crate::record::DeclarationRecord;
use crate::rules::{Action, MatchContext, RuleMatch};
use serde::Serialize;

/// Result of applying an action to a declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The declaration is emitted with this (possibly edited) record
    Kept(DeclarationRecord),
    /// The declaration is excluded from emission
    Discarded,
}

impl Outcome {
    pub fn is_discarded(&self) -> bool {
        matches!(self, Outcome::Discarded)
    }

    pub fn into_record(self) -> Option<DeclarationRecord> {
        match self {
            Outcome::Kept(record) => Some(record),
            Outcome::Discarded => None,
        }
    }
}

/// How a declaration was handled, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    /// No rule matched; the declaration passed through unchanged
    Unmatched,
    /// Rule `rule` rewrote the declaration
    Rewritten { rule: usize },
    /// Rule `rule` discarded the declaration
    Discarded { rule: usize },
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Unmatched => "unmatched",
            Disposition::Rewritten { .. } => "rewritten",
            Disposition::Discarded { .. } => "discarded",
        }
    }

    pub fn rule(&self) -> Option<usize> {
        match self {
            Disposition::Unmatched => None,
            Disposition::Rewritten { rule } | Disposition::Discarded { rule } => Some(*rule),
        }
    }
}

/// Apply `action` to `record`
///
/// `rule` is the index of the matching rule, used to identify it in errors.
///
/// # Errors
///
/// Returns `ActionError` if a rewrite callable fails. The record's form is
/// never left half-edited: the edit happens on a copy.
pub fn apply(
    mut record: DeclarationRecord,
    action: &Action,
    ctx: &MatchContext,
    rule: usize,
) -> Result<Outcome, ActionError> {
    let transform = match action {
        Action::Discard => return Ok(Outcome::Discarded),
        Action::Rewrite(transform) => transform,
    };

    let mut form = record.form.clone();
    transform
        .call(&record.container, &record.name, &mut form, ctx)
        .map_err(|message| ActionError {
            kind: record.kind,
            container: record.container.clone(),
            name: record.name.clone(),
            rule,
            action: transform.label().to_string(),
            message,
        })?;

    record.form = form;
    Ok(Outcome::Kept(record))
}

/// Apply a resolved match, or pass the record through when nothing matched
pub fn apply_match(
    record: DeclarationRecord,
    resolved: Option<&RuleMatch<'_>>,
) -> Result<(Outcome, Disposition), ActionError> {
    let Some(m) = resolved else {
        return Ok((Outcome::Kept(record), Disposition::Unmatched));
    };

    let outcome = apply(record, m.action, &m.context, m.index)?;
    let disposition = if outcome.is_discarded() {
        Disposition::Discarded { rule: m.index }
    } else {
        Disposition::Rewritten { rule: m.index }
    };
    Ok((outcome, disposition))
}
