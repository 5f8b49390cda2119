//! Transformation application and the generation pass driver

pub mod apply;
pub mod pass;

pub use apply::{Disposition, Outcome, apply, apply_match};
pub use pass::{GenerationPass, PassItem, PassResult, PassSummary};
