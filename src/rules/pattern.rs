#![forbid(unsafe_code)]

//! Full-match field patterns and the match context they produce

use crate::types::RecordField;
use regex::Regex;
use std::collections::BTreeMap;

/// A compiled pattern for one record field
///
/// The source is wrapped as `^(?:source)$`, so a pattern only matches when it
/// covers the whole field value.
#[derive(Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl std::fmt::Debug for FieldPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FieldPattern").field(&self.source).finish()
    }
}

impl FieldPattern {
    /// Compile a pattern, returning the regex error message on failure
    ///
    /// The source must be a valid regex on its own; wrapping alone could
    /// otherwise balance a stray `)` and split the anchors.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source)?;
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the rule
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Match `value`, capturing groups on success
    pub fn capture(&self, field: RecordField, value: &str) -> Option<FieldMatch> {
        let caps = self.regex.captures(value)?;

        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();

        let named = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();

        Some(FieldMatch {
            field,
            value: value.to_string(),
            groups,
            named,
        })
    }
}

/// What one pattern captured from one record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: RecordField,
    /// The whole field value
    pub value: String,
    /// Positional groups; index 0 is the whole match
    pub groups: Vec<Option<String>>,
    /// Named groups that participated in the match
    pub named: BTreeMap<String, String>,
}

/// Captures of the winning rule, one entry per pattern field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchContext {
    fields: Vec<FieldMatch>,
}

impl MatchContext {
    pub fn new(fields: Vec<FieldMatch>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldMatch] {
        &self.fields
    }

    pub fn field(&self, field: RecordField) -> Option<&FieldMatch> {
        self.fields.iter().find(|m| m.field == field)
    }

    /// Positional group `index` captured from `field`
    pub fn group(&self, field: RecordField, index: usize) -> Option<&str> {
        self.field(field)?.groups.get(index)?.as_deref()
    }

    /// First named group called `name`, searching fields in rule order
    pub fn named(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find_map(|m| m.named.get(name).map(String::as_str))
    }

    /// Replace every `${name}` in `template` with its named group
    ///
    /// Unknown names expand to the empty string.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    out.push_str(self.named(&after[..end]).unwrap_or(""));
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}
