#![forbid(unsafe_code)]

//! Declaration records and their editable intermediate form
//!
//! A [`DeclarationRecord`] is what the front end hands the engine for each
//! declaration it discovers. Rules match against the record's fields and
//! rewrite actions edit its [`IntermediateForm`].

use crate::types::{AccessSpecifier, DeclarationKind, RecordField};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Attribute holding a container's base classes
pub const BASE_SPECIFIERS: &str = "base_specifiers";
/// Attribute holding the declaration text (e.g. a typedef's target type)
pub const DECL: &str = "decl";
/// Attribute holding a function's result type
pub const FN_RESULT: &str = "fn_result";
/// Attribute holding template parameters
pub const TEMPLATE_PARAMETERS: &str = "template_parameters";
/// Attribute holding binding annotations
pub const ANNOTATIONS: &str = "annotations";

/// One declaration seen during a generation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub kind: DeclarationKind,

    /// Enclosing scope, empty at top level
    #[serde(default)]
    pub container: String,

    pub name: String,

    #[serde(default)]
    pub access: AccessSpecifier,

    /// Parameter text for functions, declaration text for containers,
    /// underlying type for typedefs
    #[serde(default)]
    pub signature: String,

    #[serde(default)]
    pub form: IntermediateForm,
}

impl DeclarationRecord {
    /// Creates a record with an empty signature and form
    pub fn new(
        kind: DeclarationKind,
        container: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            container: container.into(),
            name: name.into(),
            access: AccessSpecifier::Unspecified,
            signature: String::new(),
            form: IntermediateForm::new(),
        }
    }

    pub fn with_access(mut self, access: AccessSpecifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.form.set(key, value);
        self
    }

    /// Collapses whitespace runs in the signature so patterns see one
    /// canonical spelling
    pub fn normalize(&mut self) {
        self.signature = normalize_whitespace(&self.signature);
    }

    /// Extracts the text a pattern for `field` is matched against
    pub fn field(&self, field: RecordField) -> Cow<'_, str> {
        match field {
            RecordField::Container => Cow::Borrowed(&self.container),
            RecordField::Name => Cow::Borrowed(&self.name),
            RecordField::Access => Cow::Borrowed(self.access.as_str()),
            RecordField::Result => Cow::Borrowed(self.form.get_str(FN_RESULT).unwrap_or("")),
            RecordField::Parameters | RecordField::Declaration => Cow::Borrowed(&self.signature),
            RecordField::TemplateParameters => Cow::Owned(self.form.joined(TEMPLATE_PARAMETERS)),
            RecordField::BaseSpecifiers => Cow::Owned(self.form.joined(BASE_SPECIFIERS)),
        }
    }

    /// `Container::name`, or just the name at top level
    pub fn qualified_name(&self) -> String {
        if self.container.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.container, self.name)
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The editable attributes of a declaration
///
/// Attributes are kept sorted by name so the serialized form is stable
/// across runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntermediateForm(BTreeMap<String, Value>);

impl IntermediateForm {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the attribute if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the string items of a list attribute, empty if absent
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// List attribute joined with ", "
    pub fn joined(&self, key: &str) -> String {
        self.get_list(key).join(", ")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Appends `item` to a list attribute unless it is already present
    ///
    /// A missing attribute becomes a one-element list. Returns an error if
    /// the attribute exists and is not a list.
    pub fn push_unique(&mut self, key: &str, item: &str) -> Result<(), String> {
        let entry = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => {
                if !items.iter().any(|v| v.as_str() == Some(item)) {
                    items.push(Value::String(item.to_string()));
                }
                Ok(())
            }
            other => Err(format!("attribute '{}' is not a list: {}", key, other)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of attributes whose value differs between `self` and `other`
    pub fn changed_keys(&self, other: &IntermediateForm) -> Vec<String> {
        let mut keys: Vec<String> = self
            .0
            .iter()
            .filter(|(k, v)| other.0.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.extend(
            other
                .0
                .keys()
                .filter(|k| !self.0.contains_key(*k))
                .cloned(),
        );
        keys.sort();
        keys
    }
}

impl FromIterator<(String, Value)> for IntermediateForm {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_extraction() {
        let record = DeclarationRecord::new(DeclarationKind::Container, "KDE", "KUserId")
            .with_signature("class KUserId")
            .with_attribute(BASE_SPECIFIERS, json!(["KUserOrGroupId<uid_t>", "QObject"]))
            .with_attribute(TEMPLATE_PARAMETERS, json!([]));

        assert_eq!(record.field(RecordField::Container), "KDE");
        assert_eq!(record.field(RecordField::Name), "KUserId");
        assert_eq!(record.field(RecordField::Access), "unspecified");
        assert_eq!(record.field(RecordField::Declaration), "class KUserId");
        assert_eq!(
            record.field(RecordField::BaseSpecifiers),
            "KUserOrGroupId<uid_t>, QObject"
        );
        assert_eq!(record.field(RecordField::TemplateParameters), "");
        assert_eq!(record.field(RecordField::Result), "");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let mut record = DeclarationRecord::new(DeclarationKind::Function, "KUser", "KUser")
            .with_signature("  const   passwd *\tp ");
        record.normalize();
        assert_eq!(record.signature, "const passwd * p");
    }

    #[test]
    fn test_qualified_name() {
        let nested = DeclarationRecord::new(DeclarationKind::Typedef, "KPluginFactory", "Fn");
        assert_eq!(nested.qualified_name(), "KPluginFactory::Fn");

        let top = DeclarationRecord::new(DeclarationKind::Typedef, "", "K_UID");
        assert_eq!(top.qualified_name(), "K_UID");
    }

    #[test]
    fn test_push_unique() {
        let mut form = IntermediateForm::new();
        form.push_unique(ANNOTATIONS, "External").unwrap();
        form.push_unique(ANNOTATIONS, "External").unwrap();
        form.push_unique(ANNOTATIONS, "Abstract").unwrap();
        assert_eq!(form.get_list(ANNOTATIONS), vec!["External", "Abstract"]);

        form.set(DECL, "uid_t");
        assert!(form.push_unique(DECL, "x").is_err());
    }

    #[test]
    fn test_changed_keys() {
        let mut before = IntermediateForm::new();
        before.set(DECL, "uid_t");
        before.set(BASE_SPECIFIERS, json!(["QObject"]));

        let mut after = before.clone();
        after.set(DECL, "unsigned int");
        after.remove(BASE_SPECIFIERS);
        after.set(ANNOTATIONS, json!(["External"]));

        assert_eq!(
            before.changed_keys(&after),
            vec![
                ANNOTATIONS.to_string(),
                BASE_SPECIFIERS.to_string(),
                DECL.to_string()
            ]
        );
        assert!(before.changed_keys(&before).is_empty());
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: DeclarationRecord =
            serde_json::from_str(r#"{"kind":"typedef","name":"K_UID","form":{"decl":"uid_t"}}"#)
                .unwrap();
        assert_eq!(record.container, "");
        assert_eq!(record.access, AccessSpecifier::Unspecified);
        assert_eq!(record.form.get_str(DECL), Some("uid_t"));
    }
}
