//! codegraph - a static analyzer that builds a code property graph from a
//! repository of source files.
//!
//! This is the umbrella crate; it re-exports the component crates so
//! downstream users can depend on a single package.

pub use codegraph_core as core;
pub use codegraph_engine as engine;
pub use codegraph_languages as languages;
pub use codegraph_parse as parse;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
