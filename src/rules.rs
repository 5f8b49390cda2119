#![forbid(unsafe_code)]

//! Rule entries, compiled tables and per-kind rule databases

pub mod action;
pub mod builtin;
pub mod database;
pub mod entry;
pub mod pattern;
pub mod table;

pub use action::{Action, Transform, TransformFn};
pub use builtin::ActionSpec;
pub use database::{RuleDatabase, RuleMatch, RuleUsage};
pub use entry::RuleEntry;
pub use pattern::{FieldMatch, FieldPattern, MatchContext};
pub use table::{CompiledRule, RuleTable};
