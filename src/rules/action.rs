#![forbid(unsafe_code)]

//! Rule actions: discard a declaration or rewrite its intermediate form

use crate::record::IntermediateForm;
use crate::rules::pattern::MatchContext;
use std::fmt;
use std::sync::Arc;

/// Signature of a rewrite callable
///
/// Receives the container name, the declaration name, the form to edit in
/// place and the captures of the matching rule.
pub type TransformFn =
    dyn Fn(&str, &str, &mut IntermediateForm, &MatchContext) -> Result<(), String> + Send + Sync;

/// A labelled rewrite callable that can be shared between rule tables
#[derive(Clone)]
pub struct Transform {
    label: String,
    func: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &str, &mut IntermediateForm, &MatchContext) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(
        &self,
        container: &str,
        name: &str,
        form: &mut IntermediateForm,
        ctx: &MatchContext,
    ) -> Result<(), String> {
        (self.func)(container, name, form, ctx)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("label", &self.label)
            .field("func", &"<fn>")
            .finish()
    }
}

/// What happens to a declaration once a rule matches it
#[derive(Debug, Clone)]
pub enum Action {
    /// Drop the declaration from the emitted output
    Discard,
    /// Keep the declaration, editing its form first
    Rewrite(Transform),
}

impl Action {
    /// Build a rewrite action from a closure
    pub fn rewrite<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str, &str, &mut IntermediateForm, &MatchContext) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Action::Rewrite(Transform::new(label, func))
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, Action::Discard)
    }

    pub fn label(&self) -> &str {
        match self {
            Action::Discard => "discard",
            Action::Rewrite(transform) => transform.label(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
