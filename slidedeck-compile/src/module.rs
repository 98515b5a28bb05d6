//! ES module output.

use crate::registry::RuleRegistry;
use crate::render_html::compile;
use crate::types::SlideDeck;

/// Wrap already escaped markup in a module exporting it as `default`.
///
/// Any `${` in `markup` is evaluated as an interpolation when the module runs.
pub fn to_module(markup: &str) -> String {
    format!("const text = `{markup}`; export default text;")
}

/// Compile a deck straight to module source.
pub fn compile_module(deck: &SlideDeck, registry: &RuleRegistry) -> String {
    to_module(&compile(deck, registry))
}
