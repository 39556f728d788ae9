//! Format implementations
//!
//! This module contains all format implementations that convert between
//! document trees and text representations. Each format holds the schema it
//! converts against; Markdown also holds its parse and serialize options.

pub mod html;
pub mod json;
pub mod markdown;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
