//! Shape diagnostics for slide decks.
//!
//! Flags elements that will silently render as nothing, duplicate config
//! markers and unused `style` settings. Returns a list of `Diagnostic` items
//! (non-fatal); rendering is never affected.

use crate::error::{CompileError, Diagnostic, Severity};
use crate::registry::RuleRegistry;
use crate::types::{SectionConfig, SectionElement, SlideDeck, SlideSection, SlideSubSection};

/// Validate a loaded deck against the rules it will be compiled with.
pub fn validate(deck: &SlideDeck, registry: &RuleRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (name, section) in &deck.sections {
        match section {
            SlideSection::Sub(sub) => validate_subsection(name, sub, registry, &mut diagnostics),
            SlideSection::Main(main) => {
                if let Some(config) = &main.config {
                    check_style(name, config, &mut diagnostics);
                }
                if main.subsections.is_empty() {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        message: "Section has no subsections".into(),
                        section: name.clone(),
                        code: "D005".into(),
                    });
                }
                for (sub_name, sub) in &main.subsections {
                    let path = format!("{name}.{sub_name}");
                    validate_subsection(&path, sub, registry, &mut diagnostics);
                }
            }
        }
    }

    diagnostics
}

/// Parse and validate YAML source. A load failure becomes a single error
/// diagnostic.
pub fn validate_str(input: &str, registry: &RuleRegistry) -> Vec<Diagnostic> {
    match crate::parse::parse(input) {
        Ok(deck) => validate(&deck, registry),
        Err(err) => {
            let section = match &err {
                CompileError::MalformedDocument { section, .. } => section.clone(),
                CompileError::Yaml(_) => crate::parse::ROOT_SECTION.to_string(),
            };
            vec![Diagnostic {
                severity: Severity::Error,
                message: err.to_string(),
                section,
                code: "D000".into(),
            }]
        }
    }
}

fn validate_subsection(
    path: &str,
    sub: &SlideSubSection,
    registry: &RuleRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if sub.elements.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: "Subsection has no elements".into(),
            section: path.to_string(),
            code: "D005".into(),
        });
    }

    let mut markers = 0;
    for (index, element) in sub.elements.iter().enumerate() {
        if let Some(config) = element.config() {
            check_style(path, config, diagnostics);
        }

        match element {
            SectionElement::Config(_) => {
                markers += 1;
                if markers == 2 {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        message: format!(
                            "Element {index}: more than one config marker; only the first is used"
                        ),
                        section: path.to_string(),
                        code: "D003".into(),
                    });
                }
            }
            SectionElement::Custom { tag, .. } if !registry.contains(tag) => {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    message: format!(
                        "Element {index}: no rule registered for type '{tag}'; it renders as nothing"
                    ),
                    section: path.to_string(),
                    code: "D001".into(),
                });
            }
            SectionElement::List {
                skipped_entries, ..
            } if *skipped_entries > 0 => {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    message: format!(
                        "Element {index}: {skipped_entries} list entries are not text and render as nothing"
                    ),
                    section: path.to_string(),
                    code: "D002".into(),
                });
            }
            SectionElement::Unrecognized { .. } => {
                diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    message: format!(
                        "Element {index}: unrecognized element shape; it renders as nothing"
                    ),
                    section: path.to_string(),
                    code: "D002".into(),
                });
            }
            _ => {}
        }
    }
}

fn check_style(path: &str, config: &SectionConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.style.as_ref().is_some_and(|style| !style.is_empty()) {
        diagnostics.push(Diagnostic {
            severity: Severity::Info,
            message: "style is not rendered and has no effect".into(),
            section: path.to_string(),
            code: "D004".into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;
    use serde_yaml::Value;

    fn codes(yaml: &str, registry: &RuleRegistry) -> Vec<String> {
        validate(&parse(yaml).unwrap(), registry)
            .into_iter()
            .map(|d| d.code)
            .collect()
    }

    #[test]
    fn clean_deck_has_no_diagnostics() {
        let yaml = "\
intro:
  - Hello
  - { type: img, src: a.png }
main:
  config:
    className: [x]
  one:
    - { type: config, className: [y] }
    - { type: ul, contents: [a] }
";
        assert!(codes(yaml, &RuleRegistry::new()).is_empty());
    }

    #[test]
    fn unregistered_custom_tag() {
        let yaml = "s:\n  - { type: quote }\n";
        assert_eq!(codes(yaml, &RuleRegistry::new()), vec!["D001"]);

        let mut registry = RuleRegistry::new();
        registry.register("quote", |_: &Value| String::new());
        assert!(codes(yaml, &registry).is_empty());
    }

    #[test]
    fn unrecognized_shape_reports_path() {
        let diagnostics = validate(
            &parse("main:\n  sub:\n    - { type: img }\n").unwrap(),
            &RuleRegistry::new(),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "D002");
        assert_eq!(diagnostics[0].section, "main.sub");
        assert!(diagnostics[0].message.starts_with("Element 0"));
    }

    #[test]
    fn non_scalar_list_entries_warn() {
        let diagnostics = validate(
            &parse("s:\n  - { type: ul, contents: [a, ~, b, [c]] }\n").unwrap(),
            &RuleRegistry::new(),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "D002");
        assert!(diagnostics[0].message.contains("2 list entries"));
    }

    #[test]
    fn duplicate_config_marker_reported_once() {
        let yaml = "s:\n  - { type: config }\n  - { type: config }\n  - { type: config }\n";
        assert_eq!(codes(yaml, &RuleRegistry::new()), vec!["D003"]);
    }

    #[test]
    fn style_is_info() {
        let diagnostics = validate(
            &parse("s:\n  - { type: p, content: x, style: { color: red } }\n").unwrap(),
            &RuleRegistry::new(),
        );
        assert_eq!(diagnostics[0].severity, Severity::Info);
        assert_eq!(diagnostics[0].code, "D004");
    }

    #[test]
    fn empty_sections_warn() {
        assert_eq!(codes("s: []\nm:\n  config: {}\n", &RuleRegistry::new()), vec!["D005", "D005"]);
    }

    #[test]
    fn load_failure_is_error() {
        let diagnostics = validate_str("s: hello\n", &RuleRegistry::new());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].section, "s");
    }
}
