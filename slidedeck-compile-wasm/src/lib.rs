//! WASM bindings for `slidedeck-compile`.
//!
//! Exposes the deck compiler and the placeholder inserter to JavaScript via
//! wasm-bindgen. Custom element rules are not available here; custom
//! elements render as nothing.

use slidedeck_compile::{Inserter, RuleRegistry};
use wasm_bindgen::prelude::*;

fn to_js_error(err: slidedeck_compile::CompileError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a YAML deck and return the document model as a JSON string.
#[wasm_bindgen]
pub fn parse(input: &str) -> Result<String, JsValue> {
    let deck = slidedeck_compile::parse(input).map_err(to_js_error)?;
    serde_json::to_string(&deck).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compile a YAML deck into markup escaped for a template literal.
#[wasm_bindgen]
pub fn compile(input: &str) -> Result<String, JsValue> {
    slidedeck_compile::compile_str(input, &RuleRegistry::new()).map_err(to_js_error)
}

/// Compile a YAML deck into unescaped markup, ready to insert into a page.
#[wasm_bindgen]
pub fn render_html(input: &str) -> Result<String, JsValue> {
    let deck = slidedeck_compile::parse(input).map_err(to_js_error)?;
    Ok(deck.to_html(&RuleRegistry::new()))
}

/// Compile a YAML deck into ES module source.
#[wasm_bindgen]
pub fn compile_module(input: &str) -> Result<String, JsValue> {
    let deck = slidedeck_compile::parse(input).map_err(to_js_error)?;
    Ok(deck.to_module(&RuleRegistry::new()))
}

/// Validate a YAML deck and return diagnostics.
///
/// Returns an array of `{ severity, message, section, code }` objects.
/// An empty array means nothing will be silently dropped.
#[wasm_bindgen]
pub fn validate(input: &str) -> JsValue {
    let diagnostics = slidedeck_compile::validate::validate_str(input, &RuleRegistry::new());
    serde_wasm_bindgen::to_value(&diagnostics).unwrap_or(JsValue::NULL)
}

/// Collects fragments and splices them into page markup at
/// `<!-- Insert Point N -->` comments.
#[wasm_bindgen]
pub struct PlaceholderInserter {
    inner: Inserter<String>,
}

#[wasm_bindgen]
impl PlaceholderInserter {
    /// Start from the serialized contents of the target container.
    #[wasm_bindgen(constructor)]
    pub fn new(html: String) -> PlaceholderInserter {
        PlaceholderInserter {
            inner: Inserter::new(html),
        }
    }

    /// Queue `content` at `position`, or at the default position if omitted.
    pub fn insert(&mut self, content: String, position: Option<i32>) {
        match position {
            Some(position) => self.inner.insert_at(content, i64::from(position)),
            None => self.inner.insert(content),
        };
    }

    #[wasm_bindgen(js_name = setDefaultPosition)]
    pub fn set_default_position(&mut self, position: i32) {
        self.inner.set_default_position(i64::from(position));
    }

    /// Replace sentinels and return the updated markup.
    pub fn flush(&mut self) -> String {
        self.inner.flush();
        self.inner.container().clone()
    }
}
