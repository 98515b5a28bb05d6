use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

/// A loaded slide deck: sections in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideDeck {
    pub sections: Vec<(String, SlideSection)>,
}

impl SlideDeck {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&SlideSection> {
        self.sections
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, section)| section)
    }
}

/// A top-level section of a deck.
///
/// A YAML sequence becomes a flat [`SlideSection::Sub`]; a YAML mapping becomes
/// a [`SlideSection::Main`] with named subsections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlideSection {
    Sub(SlideSubSection),
    Main(SlideMainSection),
}

/// An ordered list of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideSubSection {
    pub elements: Vec<SectionElement>,
}

impl SlideSubSection {
    /// The first config marker among the elements, if any.
    pub fn config(&self) -> Option<&SectionConfig> {
        self.elements.iter().find_map(|element| match element {
            SectionElement::Config(config) => Some(config),
            _ => None,
        })
    }
}

/// Named subsections plus the section's own `config` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlideMainSection {
    /// Taken from the reserved `config` key; never a subsection.
    pub config: Option<SectionConfig>,
    pub subsections: Vec<(String, SlideSubSection)>,
}

/// Wrapper decoration shared by sections, subsections and elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionConfig {
    #[serde(rename = "className", skip_serializing_if = "Vec::is_empty")]
    pub class_name: Vec<String>,

    /// Parsed and kept, but not rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<BTreeMap<String, StyleValue>>,
}

/// A `style` property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StyleValue {
    String(String),
    Number(serde_yaml::Number),
}

/// Tags a text element may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Div,
}

impl TextTag {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "h1" => Self::H1,
            "h2" => Self::H2,
            "h3" => Self::H3,
            "h4" => Self::H4,
            "h5" => Self::H5,
            "h6" => Self::H6,
            "p" => Self::P,
            "div" => Self::Div,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
            Self::H6 => "h6",
            Self::P => "p",
            Self::Div => "div",
        }
    }
}

impl fmt::Display for TextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single element of a subsection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionElement {
    /// A bare scalar, already converted to its textual form.
    Scalar { text: String },

    /// `{ type: config, ... }`: decorates the enclosing subsection.
    Config(SectionConfig),

    /// `{ type: h1..h6|p|div, content }`.
    Text {
        tag: TextTag,
        content: String,
        #[serde(flatten)]
        config: SectionConfig,
    },

    /// `{ type: img, src }`.
    Image {
        src: String,
        #[serde(flatten)]
        config: SectionConfig,
    },

    /// `{ type: ul, contents: [...] }`.
    List {
        contents: Vec<String>,
        /// Non-scalar entries of `contents`, which are not rendered.
        #[serde(skip)]
        skipped_entries: usize,
        #[serde(flatten)]
        config: SectionConfig,
    },

    /// Any mapping with a non-built-in `type`. The whole value is handed to
    /// the registered renderer for `tag`.
    Custom { tag: String, value: Value },

    /// Anything else. Renders as nothing.
    Unrecognized { value: Value },
}

impl SectionElement {
    /// The `type` tag of a typed element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Scalar { .. } | Self::Unrecognized { .. } => None,
            Self::Config(_) => Some("config"),
            Self::Text { tag, .. } => Some(tag.as_str()),
            Self::Image { .. } => Some("img"),
            Self::List { .. } => Some("ul"),
            Self::Custom { tag, .. } => Some(tag),
        }
    }

    /// The element's own config, for elements that carry one.
    pub fn config(&self) -> Option<&SectionConfig> {
        match self {
            Self::Config(config)
            | Self::Text { config, .. }
            | Self::Image { config, .. }
            | Self::List { config, .. } => Some(config),
            _ => None,
        }
    }
}
