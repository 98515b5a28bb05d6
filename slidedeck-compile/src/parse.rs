//! Loading decks from YAML.
//!
//! Deserialization is done by `serde_yaml` into a generic [`Value`]; this
//! module resolves that value into the typed model once, so the renderer only
//! ever pattern-matches on [`SlideSection`] and [`SectionElement`].

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Number, Value};

use crate::error::{CompileError, Result};
use crate::types::{
    SectionConfig, SectionElement, SlideDeck, SlideMainSection, SlideSection, SlideSubSection,
    StyleValue, TextTag,
};

/// Name reported when the document root itself has the wrong shape.
pub const ROOT_SECTION: &str = "<root>";

/// Reserved key of a main section holding its [`SectionConfig`].
pub const CONFIG_KEY: &str = "config";

/// YAML merge key (`<<: *anchor`).
pub const MERGE_KEY: &str = "<<";

/// Parse YAML source into a [`SlideDeck`].
///
/// Merge keys are expanded before the deck is built. An empty document
/// yields an empty deck.
pub fn parse(input: &str) -> Result<SlideDeck> {
    let value: Value = serde_yaml::from_str(input)?;
    SlideDeck::from_value(resolve_merges(value, ROOT_SECTION)?)
}

/// Expand `<<` merge keys in place of the key.
///
/// Merged entries take the position of the `<<` key; keys already present,
/// or given explicitly later in the same mapping, win over merged ones.
/// A list of mappings is merged in order, the first mapping winning.
pub fn resolve_merges(value: Value, path: &str) -> Result<Value> {
    match value {
        Value::Mapping(mapping) => {
            let mut resolved = Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                let child_path = match scalar_text(&key) {
                    Some(name) if path == ROOT_SECTION => name,
                    Some(name) => format!("{path}.{name}"),
                    None => path.to_string(),
                };
                let value = resolve_merges(value, &child_path)?;
                if key.as_str() != Some(MERGE_KEY) {
                    resolved.insert(key, value);
                    continue;
                }
                for source in merge_sources(value, path)? {
                    for (merged_key, merged_value) in source {
                        if !resolved.contains_key(&merged_key) {
                            resolved.insert(merged_key, merged_value);
                        }
                    }
                }
            }
            Ok(Value::Mapping(resolved))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| resolve_merges(item, path))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        other => Ok(other),
    }
}

fn merge_sources(value: Value, path: &str) -> Result<Vec<Mapping>> {
    let invalid = |found: &Value| {
        CompileError::malformed(
            path,
            format!("merge key expects a mapping or a list of mappings, found {}", shape(found)),
        )
    };
    match value {
        Value::Mapping(mapping) => Ok(vec![mapping]),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(mapping) => Ok(mapping),
                other => Err(invalid(&other)),
            })
            .collect(),
        other => Err(invalid(&other)),
    }
}

impl SlideDeck {
    /// Build a deck from an already deserialized value.
    ///
    /// The value's mapping order is the render order.
    pub fn from_value(value: Value) -> Result<Self> {
        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(CompileError::malformed(
                    ROOT_SECTION,
                    format!("expected a mapping of sections, found {}", shape(&other)),
                ));
            }
        };

        let mut sections = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key_text(&key, ROOT_SECTION)?;
            let section = section_from_value(&name, value)?;
            sections.push((name, section));
        }
        Ok(Self { sections })
    }
}

fn section_from_value(name: &str, value: Value) -> Result<SlideSection> {
    match value {
        Value::Sequence(items) => Ok(SlideSection::Sub(subsection_from_items(items))),
        Value::Mapping(mapping) => main_section_from_mapping(name, mapping).map(SlideSection::Main),
        other => Err(CompileError::malformed(
            name,
            format!("expected a list of elements or a mapping of subsections, found {}", shape(&other)),
        )),
    }
}

fn main_section_from_mapping(name: &str, mapping: Mapping) -> Result<SlideMainSection> {
    let mut main = SlideMainSection::default();
    for (key, value) in mapping {
        let key = key_text(&key, name)?;
        if key == CONFIG_KEY {
            main.config = Some(match &value {
                Value::Mapping(config) => config_from_mapping(config),
                _ => SectionConfig::default(),
            });
            continue;
        }
        match value {
            Value::Sequence(items) => main.subsections.push((key, subsection_from_items(items))),
            other => {
                return Err(CompileError::malformed(
                    format!("{name}.{key}"),
                    format!("expected a list of elements, found {}", shape(&other)),
                ));
            }
        }
    }
    Ok(main)
}

fn subsection_from_items(items: Vec<Value>) -> SlideSubSection {
    SlideSubSection {
        elements: items.into_iter().map(element_from_value).collect(),
    }
}

/// Classify a single element value.
pub fn element_from_value(value: Value) -> SectionElement {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => match scalar_text(&value) {
            Some(text) => SectionElement::Scalar { text },
            None => SectionElement::Unrecognized { value },
        },
        Value::Mapping(mapping) => typed_element(mapping),
        other => SectionElement::Unrecognized { value: other },
    }
}

fn typed_element(mapping: Mapping) -> SectionElement {
    let tag = match mapping.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        _ => {
            return SectionElement::Unrecognized {
                value: Value::Mapping(mapping),
            };
        }
    };

    if tag == CONFIG_KEY {
        return SectionElement::Config(config_from_mapping(&mapping));
    }

    if let Some(text_tag) = TextTag::from_tag(&tag) {
        return match mapping.get("content").and_then(scalar_text) {
            Some(content) => SectionElement::Text {
                tag: text_tag,
                content,
                config: config_from_mapping(&mapping),
            },
            None => SectionElement::Unrecognized {
                value: Value::Mapping(mapping),
            },
        };
    }

    match tag.as_str() {
        "img" => match mapping.get("src").and_then(scalar_text) {
            Some(src) => SectionElement::Image {
                src,
                config: config_from_mapping(&mapping),
            },
            None => SectionElement::Unrecognized {
                value: Value::Mapping(mapping),
            },
        },
        "ul" => match mapping.get("contents") {
            Some(Value::Sequence(entries)) => {
                let contents: Vec<String> = entries.iter().filter_map(scalar_text).collect();
                SectionElement::List {
                    skipped_entries: entries.len() - contents.len(),
                    contents,
                    config: config_from_mapping(&mapping),
                }
            }
            _ => SectionElement::Unrecognized {
                value: Value::Mapping(mapping),
            },
        },
        _ => SectionElement::Custom {
            tag,
            value: Value::Mapping(mapping),
        },
    }
}

fn config_from_mapping(mapping: &Mapping) -> SectionConfig {
    let class_name = match mapping.get("className") {
        Some(Value::Sequence(tokens)) => tokens.iter().filter_map(scalar_text).collect(),
        Some(Value::String(token)) => vec![token.clone()],
        _ => Vec::new(),
    };

    let style = match mapping.get("style") {
        Some(Value::Mapping(properties)) => {
            let mut style = BTreeMap::new();
            for (key, value) in properties {
                let Some(key) = scalar_text(key) else { continue };
                match value {
                    Value::String(s) => {
                        style.insert(key, StyleValue::String(s.clone()));
                    }
                    Value::Number(n) => {
                        style.insert(key, StyleValue::Number(n.clone()));
                    }
                    _ => {}
                }
            }
            Some(style)
        }
        _ => None,
    };

    SectionConfig { class_name, style }
}

/// Textual form of a scalar: strings verbatim, `true`/`false`, decimal numbers.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Decimal representation of a number, written the way JavaScript prints it.
///
/// Integral floats drop the fraction (`1.0` → `1`); exponents of 21 and above
/// or -7 and below use exponent form (`1e+21`, `1e-7`); non-finite values use
/// `NaN`, `Infinity`, `-Infinity`.
pub fn number_text(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) if f.is_nan() => "NaN".to_string(),
        Some(f) if f.is_infinite() && f > 0.0 => "Infinity".to_string(),
        Some(f) if f.is_infinite() => "-Infinity".to_string(),
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => float_text(f),
        None => number.to_string(),
    }
}

fn float_text(f: f64) -> String {
    let scientific = format!("{f:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-6..21).contains(&exponent) {
        f.to_string()
    } else if exponent < 0 {
        format!("{mantissa}e{exponent}")
    } else {
        format!("{mantissa}e+{exponent}")
    }
}

fn key_text(key: &Value, parent: &str) -> Result<String> {
    scalar_text(key).ok_or_else(|| {
        CompileError::malformed(parent, format!("keys must be scalars, found {}", shape(key)))
    })
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(yaml: &str) -> SectionElement {
        element_from_value(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn empty_document_is_empty_deck() {
        let deck = parse("").unwrap();
        assert!(deck.is_empty());
    }

    #[test]
    fn sequence_section_is_flat() {
        let deck = parse("intro:\n  - Hello\n").unwrap();
        assert_eq!(deck.len(), 1);
        match deck.section("intro").unwrap() {
            SlideSection::Sub(sub) => assert_eq!(
                sub.elements,
                vec![SectionElement::Scalar { text: "Hello".into() }]
            ),
            other => panic!("Expected flat section, got {other:?}"),
        }
    }

    #[test]
    fn mapping_section_extracts_config() {
        let yaml = "\
main:
  first:
    - a
  config:
    className: [dark, wide]
  second:
    - b
";
        let deck = parse(yaml).unwrap();
        let SlideSection::Main(main) = deck.section("main").unwrap() else {
            panic!("Expected main section");
        };
        assert_eq!(
            main.config.as_ref().unwrap().class_name,
            vec!["dark".to_string(), "wide".to_string()]
        );
        let names: Vec<&str> = main.subsections.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn section_order_follows_source() {
        let deck = parse("zeta: [a]\nalpha: [b]\nmid: [c]\n").unwrap();
        let names: Vec<&str> = deck.sections.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn scalar_section_is_malformed() {
        let err = parse("intro: hello\n").unwrap_err();
        match err {
            CompileError::MalformedDocument { section, .. } => assert_eq!(section, "intro"),
            other => panic!("Expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn scalar_subsection_is_malformed() {
        let err = parse("main:\n  title: hello\n").unwrap_err();
        match err {
            CompileError::MalformedDocument { section, .. } => assert_eq!(section, "main.title"),
            other => panic!("Expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn list_root_is_malformed() {
        let err = parse("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains(ROOT_SECTION));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        assert!(matches!(parse("a: [b\n"), Err(CompileError::Yaml(_))));
    }

    #[test]
    fn numeric_keys_become_text() {
        let deck = parse("1: [a]\n").unwrap();
        assert!(deck.section("1").is_some());
    }

    #[test]
    fn scalars_convert_to_text() {
        assert_eq!(element("42"), SectionElement::Scalar { text: "42".into() });
        assert_eq!(element("1.0"), SectionElement::Scalar { text: "1".into() });
        assert_eq!(element("2.5"), SectionElement::Scalar { text: "2.5".into() });
        assert_eq!(element("true"), SectionElement::Scalar { text: "true".into() });
        assert_eq!(element(".inf"), SectionElement::Scalar { text: "Infinity".into() });
    }

    #[test]
    fn large_and_small_numbers_use_exponent_form() {
        assert_eq!(number_text(&Number::from(1e21)), "1e+21");
        assert_eq!(number_text(&Number::from(-2.5e30)), "-2.5e+30");
        assert_eq!(number_text(&Number::from(1.0e-7)), "1e-7");
        assert_eq!(number_text(&Number::from(1.5e-7)), "1.5e-7");
        assert_eq!(number_text(&Number::from(1e20)), "100000000000000000000");
        assert_eq!(number_text(&Number::from(0.000001)), "0.000001");
        assert_eq!(number_text(&Number::from(123.456)), "123.456");
    }

    #[test]
    fn merge_key_expands_in_place() {
        let deck = parse("base: &b\n  one: [a]\ndeck:\n  <<: *b\n  two: [c]\n").unwrap();
        let SlideSection::Main(main) = deck.section("deck").unwrap() else {
            panic!("Expected main section");
        };
        let names: Vec<&str> = main.subsections.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn explicit_keys_win_over_merged_ones() {
        let yaml = "\
base: &b
  one: [a]
  two: [b]
deck:
  two: [early]
  <<: *b
  one: [late]
";
        let deck = parse(yaml).unwrap();
        let SlideSection::Main(main) = deck.section("deck").unwrap() else {
            panic!("Expected main section");
        };
        let names: Vec<&str> = main.subsections.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["two", "one"]);
        assert_eq!(
            main.subsections[0].1.elements,
            vec![SectionElement::Scalar { text: "early".into() }]
        );
        assert_eq!(
            main.subsections[1].1.elements,
            vec![SectionElement::Scalar { text: "late".into() }]
        );
    }

    #[test]
    fn merge_list_first_mapping_wins() {
        let yaml = "\
a: &a
  x: [from-a]
b: &b
  x: [from-b]
  y: [from-b]
deck:
  <<: [*a, *b]
";
        let deck = parse(yaml).unwrap();
        let SlideSection::Main(main) = deck.section("deck").unwrap() else {
            panic!("Expected main section");
        };
        assert_eq!(main.subsections.len(), 2);
        assert_eq!(
            main.subsections[0].1.elements,
            vec![SectionElement::Scalar { text: "from-a".into() }]
        );
    }

    #[test]
    fn merge_of_scalar_is_malformed() {
        let err = parse("deck:\n  <<: nope\n").unwrap_err();
        match err {
            CompileError::MalformedDocument { section, .. } => assert_eq!(section, "deck"),
            other => panic!("Expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn merge_inside_elements() {
        let yaml = "\
s:
  - &title { type: h1, content: Hi }
  - { <<: *title, content: Again }
";
        let deck = parse(yaml).unwrap();
        let SlideSection::Sub(sub) = deck.section("s").unwrap() else {
            panic!("Expected flat section");
        };
        assert!(matches!(
            &sub.elements[1],
            SectionElement::Text { tag: TextTag::H1, content, .. } if content == "Again"
        ));
    }

    #[test]
    fn non_scalar_list_entries_are_counted() {
        assert!(matches!(
            element("{ type: ul, contents: [a, ~, b] }"),
            SectionElement::List { ref contents, skipped_entries: 1, .. } if contents.len() == 2
        ));
    }

    #[test]
    fn text_element() {
        assert_eq!(
            element("{ type: h2, content: Title, className: [big] }"),
            SectionElement::Text {
                tag: TextTag::H2,
                content: "Title".into(),
                config: SectionConfig {
                    class_name: vec!["big".into()],
                    style: None,
                },
            }
        );
    }

    #[test]
    fn text_element_without_content_is_unrecognized() {
        assert!(matches!(element("{ type: p }"), SectionElement::Unrecognized { .. }));
    }

    #[test]
    fn image_and_list_elements() {
        assert!(matches!(
            element("{ type: img, src: a.png }"),
            SectionElement::Image { ref src, .. } if src == "a.png"
        ));
        assert!(matches!(
            element("{ type: ul, contents: [a, 2, b] }"),
            SectionElement::List { ref contents, .. } if contents == &["a", "2", "b"]
        ));
    }

    #[test]
    fn unknown_tag_is_custom() {
        match element("{ type: quote, text: hi }") {
            SectionElement::Custom { tag, value } => {
                assert_eq!(tag, "quote");
                assert_eq!(value["text"], Value::String("hi".into()));
            }
            other => panic!("Expected custom element, got {other:?}"),
        }
    }

    #[test]
    fn mapping_without_type_is_unrecognized() {
        assert!(matches!(element("{ content: hi }"), SectionElement::Unrecognized { .. }));
        assert!(matches!(element("{ type: 3 }"), SectionElement::Unrecognized { .. }));
        assert!(matches!(element("[a, b]"), SectionElement::Unrecognized { .. }));
        assert!(matches!(element("~"), SectionElement::Unrecognized { .. }));
    }

    #[test]
    fn config_marker_keeps_style() {
        let SectionElement::Config(config) =
            element("{ type: config, className: solo, style: { color: red, opacity: 0.5 } }")
        else {
            panic!("Expected config marker");
        };
        assert_eq!(config.class_name, vec!["solo".to_string()]);
        let style = config.style.unwrap();
        assert_eq!(style["color"], StyleValue::String("red".into()));
        assert!(matches!(style["opacity"], StyleValue::Number(_)));
    }
}
