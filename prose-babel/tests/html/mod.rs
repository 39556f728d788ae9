//! HTML format tests
//!
//! Tests for bidirectional HTML ↔ document tree conversion.

mod import;
