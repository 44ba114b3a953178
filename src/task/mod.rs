//! The canonical task document: reconstruction from the action store,
//! parsing of both accepted layouts, float-aware export and line diffs.

pub mod build;
pub mod diff;
pub mod document;
pub mod serialize;

pub use build::*;
pub use diff::*;
pub use document::*;
pub use serialize::{render, render_float_aware, to_pretty_string};

/// Reserved key listing the float-flagged names of an arguments or output object.
pub const FLOAT_FIELDS_KEY: &str = "_floatFields";
