//! List command implementation
//!
//! Prints the effective, flattened rule tables of a ruleset in the order the
//! engine tries them.

use crate::cli::args::{ColorChoice, KindArg, OutputFormat};
use crate::cli::common::{EXIT_SUCCESS, load_compiled, report, stdout};
use crate::error::BindrulesError;
use crate::output::{HumanFormatter, JsonlFormatter};
use crate::rules::RuleUsage;
use crate::ruleset::CompiledRuleset;
use crate::types::DeclarationKind;
use std::io::{self, Write};
use std::path::Path;

/// Run the list command
pub fn run_list(rules: &Path, kind: Option<KindArg>, format: OutputFormat, color: ColorChoice) -> i32 {
    match run_list_inner(rules, kind.map(DeclarationKind::from), format, color) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report(&e),
    }
}

fn run_list_inner(
    rules: &Path,
    kind: Option<DeclarationKind>,
    format: OutputFormat,
    color: ColorChoice,
) -> Result<(), BindrulesError> {
    let ruleset = load_compiled(rules)?;
    let rows = collect_rules(&ruleset, kind);

    match format {
        OutputFormat::Human => {
            let mut out = stdout(color);
            let heading = format!("Rules of {}", ruleset.name());
            HumanFormatter::new().write_rules(&heading, &rows, &mut out)?;
        }
        OutputFormat::Jsonl => {
            let output = JsonlFormatter::new().format_rules("rule", &rows);
            io::stdout().lock().write_all(output.as_bytes())?;
        }
    }
    Ok(())
}

fn collect_rules(ruleset: &CompiledRuleset, kind: Option<DeclarationKind>) -> Vec<RuleUsage> {
    DeclarationKind::ALL
        .into_iter()
        .filter(|k| kind.is_none_or(|wanted| wanted == *k))
        .flat_map(|k| ruleset.database(k).usage())
        .collect()
}
