//! Check command implementation
//!
//! Loads a ruleset with its whole inheritance chain and compiles every rule
//! table, reporting the first malformed rule. On success prints the
//! description, the lineage and the number of effective rules per
//! declaration kind.

use crate::cli::common::{EXIT_SUCCESS, load_compiled, report};
use crate::error::BindrulesError;
use crate::ruleset::CompiledRuleset;
use crate::types::DeclarationKind;
use std::path::Path;

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: Every table compiled
/// - 2: A ruleset file could not be read
/// - 3: A ruleset file is malformed
pub fn run_check(rules: &Path) -> i32 {
    match load_compiled(rules) {
        Ok(ruleset) => {
            print!("{}", describe(&ruleset));
            EXIT_SUCCESS
        }
        Err(e) => report(&BindrulesError::from(e)),
    }
}

fn describe(ruleset: &CompiledRuleset) -> String {
    let lineage: Vec<&str> = ruleset.lineage().iter().map(|n| n.as_str()).collect();

    let mut output = format!("Ruleset {} is valid\n", ruleset.name());
    if let Some(description) = ruleset.description() {
        output.push_str(&format!("  Description: {}\n", description));
    }
    output.push_str(&format!("  Lineage: {}\n", lineage.join(" -> ")));
    for kind in DeclarationKind::ALL {
        output.push_str(&format!(
            "  {}: {} rules\n",
            kind,
            ruleset.database(kind).len()
        ));
    }
    output
}
