//! bindrules CLI entry point

use bindrules::cli::apply::{ApplyOptions, run_apply};
use bindrules::cli::{Command, args::Cli};
use clap::Parser;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Command::Apply {
            rules,
            input,
            format,
            parallel,
            report_unused,
            hide_unmatched,
        } => run_apply(&ApplyOptions {
            rules: &rules,
            input: &input,
            format,
            parallel,
            report_unused,
            hide_unmatched,
            color: cli.color,
        }),
        Command::Check { rules } => bindrules::cli::check::run_check(&rules),
        Command::List {
            rules,
            kind,
            format,
        } => bindrules::cli::list::run_list(&rules, kind, format, cli.color),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("bindrules=debug")
        } else {
            EnvFilter::new("bindrules=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}
