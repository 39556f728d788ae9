//! Document tree and parse event stream.
//!
//! `nodes` is the format-agnostic tree every format converts to and from;
//! `events` is the flat stream the parsers emit before the tree is built.

pub mod events;
pub mod nodes;
