#![forbid(unsafe_code)]

//! Human-readable output formatter

use crate::engine::{Disposition, PassItem, PassResult};
use crate::rules::RuleUsage;
use std::io::{self, Write};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Human-readable formatter for pass results and rule listings
pub struct HumanFormatter {
    /// Also print declarations no rule matched
    pub show_unmatched: bool,
}

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter {
            show_unmatched: true,
        }
    }

    /// Write one line per declaration, then a summary line
    pub fn write(&self, result: &PassResult, out: &mut dyn WriteColor) -> io::Result<()> {
        for item in &result.items {
            if item.disposition == Disposition::Unmatched && !self.show_unmatched {
                continue;
            }
            write_item(item, out)?;
        }

        let summary = result.summary();
        writeln!(
            out,
            "\n{} declarations: {} rewritten, {} discarded, {} unmatched",
            summary.declarations, summary.rewritten, summary.discarded, summary.unmatched
        )
    }

    /// Write rule rows grouped under `heading`
    pub fn write_rules(
        &self,
        heading: &str,
        rules: &[RuleUsage],
        out: &mut dyn WriteColor,
    ) -> io::Result<()> {
        writeln!(out, "{} ({}):", heading, rules.len())?;
        for rule in rules {
            out.set_color(ColorSpec::new().set_bold(true))?;
            write!(out, "  {} #{}", rule.kind, rule.index)?;
            out.reset()?;
            if let Some(origin) = &rule.origin {
                write!(out, " [{}]", origin)?;
            }
            writeln!(
                out,
                " {} -> {}",
                quoted(&rule.patterns),
                rule.action
            )?;
        }
        Ok(())
    }

    /// Format a pass result without colour
    pub fn format(&self, result: &PassResult) -> String {
        let mut buffer = Buffer::no_color();
        // Writing to an in-memory buffer cannot fail
        let _ = self.write(result, &mut buffer);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_item(item: &PassItem, out: &mut dyn WriteColor) -> io::Result<()> {
    let (label, color) = match item.disposition {
        Disposition::Unmatched => ("keep", None),
        Disposition::Rewritten { .. } => ("rewrite", Some(Color::Yellow)),
        Disposition::Discarded { .. } => ("discard", Some(Color::Red)),
    };

    out.set_color(ColorSpec::new().set_fg(color).set_bold(color.is_some()))?;
    write!(out, "{:<8}", label)?;
    out.reset()?;

    write!(out, "{} ", item.kind)?;
    if item.container.is_empty() {
        write!(out, "{}", item.name)?;
    } else {
        write!(out, "{}::{}", item.container, item.name)?;
    }

    if let Some(rule) = item.disposition.rule() {
        write!(out, " (rule #{}", rule)?;
        if let Some(origin) = &item.origin {
            write!(out, " from {}", origin)?;
        }
        write!(out, ")")?;
    }
    if !item.changed.is_empty() {
        write!(out, " changed: {}", item.changed.join(", "))?;
    }
    writeln!(out)
}

fn quoted(patterns: &[String]) -> String {
    let parts: Vec<String> = patterns.iter().map(|p| format!("\"{}\"", p)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclarationKind, RulesetName};

    fn item(container: &str, name: &str, disposition: Disposition) -> PassItem {
        PassItem {
            kind: DeclarationKind::Function,
            container: container.to_string(),
            name: name.to_string(),
            disposition,
            origin: disposition.rule().map(|_| RulesetName::new("PyKF5").unwrap()),
            changed: vec![],
            record: None,
        }
    }

    #[test]
    fn test_format_lines() {
        let result = PassResult {
            items: vec![
                item("KUser", "KUser", Disposition::Discarded { rule: 0 }),
                item("", "qobject_cast", Disposition::Unmatched),
            ],
        };

        let output = HumanFormatter::new().format(&result);
        assert!(output.contains("discard function KUser::KUser (rule #0 from PyKF5)"));
        assert!(output.contains("keep    function qobject_cast\n"));
        assert!(output.contains("2 declarations: 0 rewritten, 1 discarded, 1 unmatched"));
    }

    #[test]
    fn test_hide_unmatched() {
        let result = PassResult {
            items: vec![item("", "qobject_cast", Disposition::Unmatched)],
        };
        let formatter = HumanFormatter {
            show_unmatched: false,
        };
        assert!(!formatter.format(&result).contains("qobject_cast"));
    }

    #[test]
    fn test_write_rules() {
        let rules = vec![RuleUsage {
            kind: DeclarationKind::Typedef,
            index: 1,
            origin: RulesetName::new("PyKF5"),
            patterns: vec![".*".to_string(), "K_UID".to_string()],
            action: "rewrite_decl(unsigned int)".to_string(),
            hits: 0,
        }];

        let mut buffer = Buffer::no_color();
        HumanFormatter::new()
            .write_rules("Unused rules", &rules, &mut buffer)
            .unwrap();
        let output = String::from_utf8(buffer.into_inner()).unwrap();

        assert!(output.starts_with("Unused rules (1):\n"));
        assert!(output.contains(
            "  typedef #1 [PyKF5] [\".*\", \"K_UID\"] -> rewrite_decl(unsigned int)"
        ));
    }
}
