//! Template rules for custom elements declared in slidedeck.json.
//!
//! A template such as `<q>{text}</q>` renders a custom element by replacing
//! each `{field}` with the element's scalar field value. Missing or
//! non-scalar fields become empty. `{{` and `}}` produce literal braces.

use serde_yaml::Value;
use slidedeck_compile::ElementRenderer;
use slidedeck_compile::parse::scalar_text;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

#[derive(Debug, Clone)]
pub struct TemplateRule {
    segments: Vec<Segment>,
}

impl TemplateRule {
    pub fn new(template: &str) -> Self {
        Self {
            segments: parse_template(template),
        }
    }
}

impl ElementRenderer for TemplateRule {
    fn render(&self, element: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    if let Some(text) = element.get(name.as_str()).and_then(scalar_text) {
                        out.push_str(&text);
                    }
                }
            }
        }
        out
    }
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("{{") {
            literal.push('{');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("}}") {
            literal.push('}');
            rest = after;
        } else if c == '{' {
            match rest[1..].find('}') {
                Some(end) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(rest[1..=end].trim().to_string()));
                    rest = &rest[end + 2..];
                }
                // Unclosed brace: keep the rest verbatim.
                None => {
                    literal.push_str(rest);
                    rest = "";
                }
            }
        } else {
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
