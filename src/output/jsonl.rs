#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. One declaration record per emitted declaration, in input order
//! 2. One summary record

use crate::engine::{PassItem, PassResult, PassSummary};
use crate::record::IntermediateForm;
use crate::rules::RuleUsage;
use serde::Serialize;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format a pass result as JSONL
    ///
    /// Discarded declarations produce no declaration record; they are only
    /// counted in the summary.
    pub fn format(&self, result: &PassResult) -> String {
        let mut output = String::new();

        for item in &result.items {
            if let Some(record) = declaration_record(item) {
                push_line(&mut output, &record);
            }
        }

        push_line(&mut output, &SummaryRecord::new(result.summary()));
        output
    }

    /// Format rule rows (for listings and unused-rule reports)
    pub fn format_rules(&self, record_type: &str, rules: &[RuleUsage]) -> String {
        let mut output = String::new();
        for rule in rules {
            push_line(
                &mut output,
                &RuleRecord {
                    record_type,
                    kind: rule.kind.as_str(),
                    index: rule.index,
                    origin: rule.origin.as_ref().map(|o| o.as_str()),
                    patterns: &rule.patterns,
                    action: &rule.action,
                    hits: rule.hits,
                },
            );
        }
        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_line<T: Serialize>(output: &mut String, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        output.push_str(&json);
        output.push('\n');
    }
}

fn declaration_record(item: &PassItem) -> Option<DeclarationLine<'_>> {
    let record = item.record.as_ref()?;
    Some(DeclarationLine {
        record_type: "declaration",
        kind: record.kind.as_str(),
        container: &record.container,
        name: &record.name,
        access: record.access.as_str(),
        signature: &record.signature,
        form: &record.form,
        disposition: item.disposition.as_str(),
        rule: item.disposition.rule(),
        origin: item.origin.as_ref().map(|o| o.as_str()),
        changed: &item.changed,
    })
}

/// Declaration record for JSONL output
#[derive(Debug, Serialize)]
struct DeclarationLine<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    kind: &'static str,
    container: &'a str,
    name: &'a str,
    access: &'static str,
    signature: &'a str,
    form: &'a IntermediateForm,
    disposition: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    changed: &'a [String],
}

/// Summary record for JSONL output
#[derive(Debug, Serialize)]
struct SummaryRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    #[serde(flatten)]
    summary: PassSummary,
    emitted: u64,
}

impl SummaryRecord {
    fn new(summary: PassSummary) -> Self {
        Self {
            record_type: "summary",
            summary,
            emitted: summary.emitted(),
        }
    }
}

/// Rule record for JSONL output
#[derive(Debug, Serialize)]
struct RuleRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    kind: &'static str,
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<&'a str>,
    patterns: &'a [String],
    action: &'a str,
    hits: u64,
}
