//! Format-agnostic tree building shared by every parser.

pub mod flat_to_nested;
pub mod tables;

pub use flat_to_nested::{events_to_tree, ParseReport};
