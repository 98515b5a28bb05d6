//! `slidedeck-compile`: compiler from YAML slide decks to markup.
//!
//! A deck is a mapping of sections. A section is either a list of elements or
//! a mapping of named subsections (plus an optional `config` entry). Each
//! element is a scalar, a built-in block (`h1`..`h6`, `p`, `div`, `img`, `ul`)
//! or a custom block rendered by a rule registered for its `type`.
//!
//! The compiled markup is escaped so it can be placed verbatim between
//! backticks in generated JavaScript.
//!
//! # Quick start
//!
//! ```
//! use slidedeck_compile::RuleRegistry;
//!
//! let deck = slidedeck_compile::parse("intro:\n  - Hello\n").unwrap();
//! let html = deck.compile(&RuleRegistry::new());
//! assert_eq!(
//!     html,
//!     "<section class=\"\"><section class=\"\"><p class=\"\">Hello</p></section></section>"
//! );
//! ```

pub mod error;
pub mod inserter;
pub mod module;
pub mod parse;
pub mod registry;
pub mod render_html;
pub mod types;
pub mod validate;

pub use error::*;
pub use inserter::{Container, Inserter};
pub use module::{compile_module, to_module};
pub use parse::parse;
pub use registry::{ElementRenderer, RuleRegistry};
pub use render_html::{compile, compile_str};
pub use types::*;

impl SlideDeck {
    /// Compile this deck into escaped markup.
    pub fn compile(&self, registry: &RuleRegistry) -> String {
        render_html::compile(self, registry)
    }

    /// Render this deck without escaping, e.g. for previews.
    pub fn to_html(&self, registry: &RuleRegistry) -> String {
        render_html::render_unescaped(self, registry)
    }

    /// Compile this deck into an ES module exporting the markup.
    pub fn to_module(&self, registry: &RuleRegistry) -> String {
        module::compile_module(self, registry)
    }

    /// Validate this deck and return any diagnostics.
    pub fn validate(&self, registry: &RuleRegistry) -> Vec<crate::error::Diagnostic> {
        validate::validate(self, registry)
    }
}
