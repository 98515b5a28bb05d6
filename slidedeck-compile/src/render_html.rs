//! Markup renderer.
//!
//! Walks a [`SlideDeck`] and produces nested `section` elements: one per deck
//! section, one per subsection, and one element per subsection entry. The
//! joined output is escaped once so it can sit between backticks in generated
//! JavaScript. Content is trusted and inserted without HTML escaping.

use std::fmt::Write;

use tracing::debug;

use crate::error::Result;
use crate::registry::RuleRegistry;
use crate::types::{SectionElement, SlideDeck, SlideMainSection, SlideSection, SlideSubSection};

/// Tag used for bare scalars.
pub const DEFAULT_TAG: &str = "p";

const SECTION_TAG: &str = "section";

/// Compile a deck into escaped markup, ready to embed in a template literal.
pub fn compile(deck: &SlideDeck, registry: &RuleRegistry) -> String {
    escape_template(&render_unescaped(deck, registry))
}

/// Parse YAML source and compile it.
pub fn compile_str(input: &str, registry: &RuleRegistry) -> Result<String> {
    let deck = crate::parse::parse(input)?;
    Ok(compile(&deck, registry))
}

/// Render a deck without the final escaping pass.
pub fn render_unescaped(deck: &SlideDeck, registry: &RuleRegistry) -> String {
    deck.sections
        .iter()
        .map(|(name, section)| render_section(name, section, registry))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_section(name: &str, section: &SlideSection, registry: &RuleRegistry) -> String {
    debug!(section = name, "Rendering section");
    match section {
        SlideSection::Sub(sub) => wrap(&render_subsection(sub, registry), SECTION_TAG, &[], &[]),
        SlideSection::Main(main) => render_main_section(main, registry),
    }
}

/// Render a main section: its subsections inside a `section` carrying the
/// section's own `config.className`.
pub fn render_main_section(main: &SlideMainSection, registry: &RuleRegistry) -> String {
    let content = main
        .subsections
        .iter()
        .map(|(_, sub)| render_subsection(sub, registry))
        .collect::<Vec<_>>()
        .join("\n");
    let class_name = main
        .config
        .as_ref()
        .map(|config| config.class_name.as_slice())
        .unwrap_or_default();
    wrap(&content, SECTION_TAG, class_name, &[])
}

/// Render a subsection inside a `section` decorated by its config marker.
///
/// The marker is still mapped through [`render_element`], so it contributes
/// an empty line to the content.
pub fn render_subsection(sub: &SlideSubSection, registry: &RuleRegistry) -> String {
    let class_name = sub
        .config()
        .map(|config| config.class_name.as_slice())
        .unwrap_or_default();
    let content = sub
        .elements
        .iter()
        .map(|element| render_element(element, registry))
        .collect::<Vec<_>>()
        .join("\n");
    wrap(&content, SECTION_TAG, class_name, &[])
}

/// Render one element. Config markers, unregistered custom tags and
/// unrecognized shapes render as an empty string.
pub fn render_element(element: &SectionElement, registry: &RuleRegistry) -> String {
    match element {
        SectionElement::Scalar { text } => wrap(text, DEFAULT_TAG, &[], &[]),
        SectionElement::Text {
            tag,
            content,
            config,
        } => wrap(content, tag.as_str(), &config.class_name, &[]),
        SectionElement::Image { src, config } => {
            wrap("", "img", &config.class_name, &[("src", src.as_str())])
        }
        SectionElement::List {
            contents, config, ..
        } => {
            let items = contents
                .iter()
                .map(|entry| format!("<li>{entry}</li>"))
                .collect::<Vec<_>>()
                .join("\n");
            wrap(&items, "ul", &config.class_name, &[])
        }
        SectionElement::Custom { tag, value } => match registry.lookup(tag) {
            Some(renderer) => renderer.render(value),
            None => {
                debug!(tag = %tag, "No rule registered, dropping element");
                String::new()
            }
        },
        SectionElement::Config(_) => String::new(),
        SectionElement::Unrecognized { .. } => {
            debug!("Unrecognized element shape, dropping element");
            String::new()
        }
    }
}

/// Build `<tag class="a b" k="v">content</tag>`.
///
/// The class attribute is always present; attributes keep the given order.
pub fn wrap(content: &str, tag: &str, class_name: &[String], attrs: &[(&str, &str)]) -> String {
    let mut html = format!("<{tag} class=\"{}\"", class_name.join(" "));
    for (key, value) in attrs {
        let _ = write!(html, " {key}=\"{value}\"");
    }
    let _ = write!(html, ">{content}</{tag}>");
    html
}

/// Escape markup for a backtick-delimited template literal.
///
/// Backslashes are doubled first, then backticks are escaped, so the
/// backslashes introduced by the second step are never doubled.
///
/// `${` is left as is. The generated literal would interpolate it, so deck
/// content must not contain that sequence.
pub fn escape_template(markup: &str) -> String {
    let backslashes_doubled = markup.replace('\\', "\\\\");
    backslashes_doubled.replace('`', "\\`")
}
