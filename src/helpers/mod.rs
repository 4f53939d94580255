//! Helper functions for templates
//!
//! These back the filters and functions registered on the template
//! renderer: date display and plain-text excerpts of CMS HTML.

mod date;
mod html;

pub use date::*;
pub use html::*;
