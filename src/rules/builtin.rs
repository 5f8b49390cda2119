#![forbid(unsafe_code)]

//! Standard actions shared by rule tables
//!
//! These cover the edits binding rule tables need most often. Rule files
//! refer to them through [`ActionSpec`]; Rust rulesets call the
//! constructors directly.

use crate::record::{ANNOTATIONS, BASE_SPECIFIERS, DECL, FN_RESULT};
use crate::rules::action::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Drop the declaration
pub fn discard() -> Action {
    Action::Discard
}

/// Strip a container's base classes
pub fn discard_base() -> Action {
    Action::rewrite("discard_base", |_, _, form, _| {
        form.set(BASE_SPECIFIERS, Value::Array(Vec::new()));
        Ok(())
    })
}

/// Replace `decl`; `${name}` expands to a named capture of the rule
pub fn rewrite_decl(template: impl Into<String>) -> Action {
    let template = template.into();
    Action::rewrite(format!("rewrite_decl({})", template), move |_, _, form, ctx| {
        form.set(DECL, ctx.expand(&template));
        Ok(())
    })
}

/// Replace a function's result type; `${name}` expands as in [`rewrite_decl`]
pub fn rewrite_result(template: impl Into<String>) -> Action {
    let template = template.into();
    Action::rewrite(format!("rewrite_result({})", template), move |_, _, form, ctx| {
        form.set(FN_RESULT, ctx.expand(&template));
        Ok(())
    })
}

/// Add an annotation, once
pub fn annotate(annotation: impl Into<String>) -> Action {
    let annotation = annotation.into();
    Action::rewrite(format!("annotate({})", annotation), move |_, _, form, _| {
        form.push_unique(ANNOTATIONS, &annotation)
    })
}

/// Mark a forward declaration as defined in another module
pub fn mark_external() -> Action {
    annotate("External")
}

/// Mark a container as not instantiable from the bindings
pub fn mark_abstract() -> Action {
    annotate("Abstract")
}

/// Set an arbitrary attribute
pub fn set_attribute(key: impl Into<String>, value: Value) -> Action {
    let key = key.into();
    Action::rewrite(format!("set({})", key), move |_, _, form, _| {
        form.set(key.clone(), value.clone());
        Ok(())
    })
}

/// Remove an attribute if present
pub fn remove_attribute(key: impl Into<String>) -> Action {
    let key = key.into();
    Action::rewrite(format!("remove({})", key), move |_, _, form, _| {
        form.remove(&key);
        Ok(())
    })
}

/// Keep the declaration as it is
///
/// Placed in a local table, this shadows any inherited rule for the same
/// declarations.
pub fn noop() -> Action {
    Action::rewrite("noop", |_, _, _, _| Ok(()))
}

/// Serialized form of an action in rule files
///
/// Unit variants are written as strings (`action = "discard"`), the others
/// as single-key tables (`action = { rewrite_decl = "unsigned int" }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpec {
    Discard,
    DiscardBase,
    MarkExternal,
    MarkAbstract,
    Noop,
    RewriteDecl(String),
    RewriteResult(String),
    Annotate(String),
    Remove(String),
    Set { key: String, value: Value },
}

impl ActionSpec {
    pub fn to_action(&self) -> Action {
        match self {
            ActionSpec::Discard => discard(),
            ActionSpec::DiscardBase => discard_base(),
            ActionSpec::MarkExternal => mark_external(),
            ActionSpec::MarkAbstract => mark_abstract(),
            ActionSpec::Noop => noop(),
            ActionSpec::RewriteDecl(template) => rewrite_decl(template.clone()),
            ActionSpec::RewriteResult(template) => rewrite_result(template.clone()),
            ActionSpec::Annotate(annotation) => annotate(annotation.clone()),
            ActionSpec::Remove(key) => remove_attribute(key.clone()),
            ActionSpec::Set { key, value } => set_attribute(key.clone(), value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IntermediateForm;
    use crate::rules::action::Transform;
    use crate::rules::pattern::{FieldPattern, MatchContext};
    use crate::types::RecordField;
    use serde_json::json;

    fn transform(action: &Action) -> &Transform {
        match action {
            Action::Rewrite(t) => t,
            Action::Discard => panic!("Expected a rewrite action"),
        }
    }

    fn run(action: &Action, form: &mut IntermediateForm, ctx: &MatchContext) {
        transform(action).call("KDE", "decl", form, ctx).unwrap();
    }

    #[test]
    fn test_discard_base_clears_list() {
        let mut form = IntermediateForm::new();
        form.set(BASE_SPECIFIERS, json!(["KUserOrGroupId<uid_t>"]));

        run(&discard_base(), &mut form, &MatchContext::default());
        assert_eq!(form.get(BASE_SPECIFIERS), Some(&json!([])));
    }

    #[test]
    fn test_rewrite_decl_plain() {
        let mut form = IntermediateForm::new();
        form.set(DECL, "uid_t");

        run(&rewrite_decl("unsigned int"), &mut form, &MatchContext::default());
        assert_eq!(form.get_str(DECL), Some("unsigned int"));
    }

    #[test]
    fn test_rewrite_result_expands_captures() {
        let pattern = FieldPattern::new("QList<(?P<item>\\w+)>").unwrap();
        let ctx = MatchContext::new(vec![
            pattern.capture(RecordField::Result, "QList<KUser>").unwrap(),
        ]);

        let mut form = IntermediateForm::new();
        run(&rewrite_result("QVector<${item}>"), &mut form, &ctx);
        assert_eq!(form.get_str(FN_RESULT), Some("QVector<KUser>"));
    }

    #[test]
    fn test_mark_external_is_idempotent() {
        let mut form = IntermediateForm::new();
        let action = mark_external();
        run(&action, &mut form, &MatchContext::default());
        run(&action, &mut form, &MatchContext::default());
        assert_eq!(form.get_list(ANNOTATIONS), vec!["External"]);
    }

    #[test]
    fn test_annotate_fails_on_non_list() {
        let mut form = IntermediateForm::new();
        form.set(ANNOTATIONS, "oops");
        let result = transform(&mark_abstract()).call("", "x", &mut form, &MatchContext::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_set_and_remove() {
        let mut form = IntermediateForm::new();
        run(&set_attribute("throws", json!(false)), &mut form, &MatchContext::default());
        assert_eq!(form.get("throws"), Some(&json!(false)));

        run(&remove_attribute("throws"), &mut form, &MatchContext::default());
        assert!(form.is_empty());
    }

    #[test]
    fn test_noop_leaves_form() {
        let mut form = IntermediateForm::new();
        form.set(DECL, "int");
        let before = form.clone();
        run(&noop(), &mut form, &MatchContext::default());
        assert_eq!(form, before);
    }

    #[test]
    fn test_action_spec_from_toml() {
        #[derive(Deserialize)]
        struct Row {
            action: ActionSpec,
        }

        let row: Row = toml::from_str(r#"action = "discard_base""#).unwrap();
        assert_eq!(row.action, ActionSpec::DiscardBase);

        let row: Row = toml::from_str(r#"action = { rewrite_decl = "unsigned int" }"#).unwrap();
        assert_eq!(row.action, ActionSpec::RewriteDecl("unsigned int".to_string()));

        let row: Row =
            toml::from_str(r#"action = { set = { key = "transfer", value = true } }"#).unwrap();
        assert_eq!(
            row.action,
            ActionSpec::Set {
                key: "transfer".to_string(),
                value: json!(true)
            }
        );

        assert!(toml::from_str::<Row>(r#"action = "explode""#).is_err());
    }

    #[test]
    fn test_action_spec_labels() {
        assert_eq!(ActionSpec::Discard.to_action().label(), "discard");
        assert!(ActionSpec::Discard.to_action().is_discard());
        assert_eq!(
            ActionSpec::RewriteDecl("int".to_string()).to_action().label(),
            "rewrite_decl(int)"
        );
        assert_eq!(ActionSpec::MarkExternal.to_action().label(), "annotate(External)");
    }
}
