//! Apply command implementation
//!
//! This module implements the `bindrules apply` command, which:
//! - Loads and compiles the ruleset and its ancestors
//! - Reads declarations as JSON Lines from a file or stdin
//! - Runs the generation pass
//! - Prints the surviving declarations (human or JSONL), optionally leaving
//!   unmatched ones out of human output
//! - Optionally reports rules that never fired

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_SUCCESS, load_compiled, report, stdout};
use crate::engine::GenerationPass;
use crate::error::BindrulesError;
use crate::input::read_records;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

/// Options for the apply command
#[derive(Debug, Clone)]
pub struct ApplyOptions<'a> {
    pub rules: &'a Path,
    pub input: &'a str,
    pub format: OutputFormat,
    pub parallel: bool,
    pub report_unused: bool,
    pub hide_unmatched: bool,
    pub color: ColorChoice,
}

/// Run the apply command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: I/O or input error
/// - 3: Ruleset parse or validation error
/// - 4: A rewrite action failed
pub fn run_apply(options: &ApplyOptions<'_>) -> i32 {
    match run_apply_inner(options) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report(&e),
    }
}

fn run_apply_inner(options: &ApplyOptions<'_>) -> Result<(), BindrulesError> {
    // Rule tables are validated before any declaration is read
    let ruleset = load_compiled(options.rules)?;

    let records = if options.input == "-" {
        read_records(io::stdin().lock())?
    } else {
        let file = File::open(options.input)?;
        read_records(BufReader::new(file))?
    };

    let result = GenerationPass::new(&ruleset)
        .parallel(options.parallel)
        .run(records)?;

    match options.format {
        OutputFormat::Human => {
            let mut out = stdout(options.color);
            let formatter = HumanFormatter {
                show_unmatched: !options.hide_unmatched,
            };
            formatter.write(&result, &mut out)?;
            if options.report_unused {
                writeln!(out)?;
                formatter.write_rules("Unused rules", &ruleset.unused(), &mut out)?;
            }
        }
        OutputFormat::Jsonl => {
            let formatter = JsonlFormatter::new();
            let mut output = formatter.format(&result);
            if options.report_unused {
                output.push_str(&formatter.format_rules("unused_rule", &ruleset.unused()));
            }
            io::stdout().lock().write_all(output.as_bytes())?;
        }
    }

    Ok(())
}
