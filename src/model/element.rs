use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of element kinds the extraction script reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Button,
    Link,
    Input,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Toggle,
    Slider,
    Datepicker,
    FileInput,
    Video,
    Audio,
    Table,
    TableRow,
    TableCell,
    Form,
    Svg,
    Canvas,
    Iframe,
    Tab,
    Other,
}

impl ElementType {
    pub const ALL: [ElementType; 22] = [
        ElementType::Button,
        ElementType::Link,
        ElementType::Input,
        ElementType::Textarea,
        ElementType::Select,
        ElementType::Checkbox,
        ElementType::Radio,
        ElementType::Toggle,
        ElementType::Slider,
        ElementType::Datepicker,
        ElementType::FileInput,
        ElementType::Video,
        ElementType::Audio,
        ElementType::Table,
        ElementType::TableRow,
        ElementType::TableCell,
        ElementType::Form,
        ElementType::Svg,
        ElementType::Canvas,
        ElementType::Iframe,
        ElementType::Tab,
        ElementType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Button => "BUTTON",
            ElementType::Link => "LINK",
            ElementType::Input => "INPUT",
            ElementType::Textarea => "TEXTAREA",
            ElementType::Select => "SELECT",
            ElementType::Checkbox => "CHECKBOX",
            ElementType::Radio => "RADIO",
            ElementType::Toggle => "TOGGLE",
            ElementType::Slider => "SLIDER",
            ElementType::Datepicker => "DATEPICKER",
            ElementType::FileInput => "FILE_INPUT",
            ElementType::Video => "VIDEO",
            ElementType::Audio => "AUDIO",
            ElementType::Table => "TABLE",
            ElementType::TableRow => "TABLE_ROW",
            ElementType::TableCell => "TABLE_CELL",
            ElementType::Form => "FORM",
            ElementType::Svg => "SVG",
            ElementType::Canvas => "CANVAS",
            ElementType::Iframe => "IFRAME",
            ElementType::Tab => "TAB",
            ElementType::Other => "OTHER",
        }
    }

    /// Parse an extraction-script type name. Case-insensitive, `-` and `_`
    /// are interchangeable (`file-input` == `FILE_INPUT`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// A validated DOM element and its owned subtree.
///
/// Produced only by the sanitizer; `id` is unique across the whole tree a
/// graph carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub tag: String,
    pub text: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub is_sensitive: bool,
    #[serde(default)]
    pub children: Vec<Element>,
    pub aria_role: Option<String>,
    pub input_type: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<String>, element_type: ElementType, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type,
            tag: tag.into(),
            text: None,
            attributes: BTreeMap::new(),
            bounding_box: BoundingBox::default(),
            is_visible: true,
            is_interactive: false,
            is_sensitive: false,
            children: Vec::new(),
            aria_role: None,
            input_type: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// This element followed by all descendants, depth-first, pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Number of elements in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        self.descendants().count()
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}
