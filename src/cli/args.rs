//! CLI argument parsing using clap

use crate::types::DeclarationKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for bindrules commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Use color when stdout is a terminal
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Declaration kind filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Function,
    Container,
    Typedef,
    ForwardDeclaration,
}

impl From<KindArg> for DeclarationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Function => DeclarationKind::Function,
            KindArg::Container => DeclarationKind::Container,
            KindArg::Typedef => DeclarationKind::Typedef,
            KindArg::ForwardDeclaration => DeclarationKind::ForwardDeclaration,
        }
    }
}

/// bindrules CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "bindrules")]
#[command(about = "Select, discard and rewrite C++ declarations for binding generators")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Log each applied rule
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available bindrules subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run declarations through a ruleset
    Apply {
        /// Ruleset file
        #[arg(short, long)]
        rules: PathBuf,

        /// Declarations as JSON Lines ("-" reads stdin)
        #[arg(default_value = "-")]
        input: String,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        /// Match declarations in parallel
        #[arg(long)]
        parallel: bool,

        /// Report rules that matched no declaration
        #[arg(long)]
        report_unused: bool,

        /// Leave declarations no rule matched out of human output
        #[arg(long)]
        hide_unmatched: bool,
    },

    /// Load and validate a ruleset
    Check {
        /// Ruleset file
        #[arg(short, long)]
        rules: PathBuf,
    },

    /// Print the effective rule tables of a ruleset
    List {
        /// Ruleset file
        #[arg(short, long)]
        rules: PathBuf,

        /// Only list rules for this declaration kind
        #[arg(short, long)]
        kind: Option<KindArg>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },
}
