use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Page-level extraction metadata
// ============================================================================
//
// The graph keeps the extraction record's page-level fields as an opaque
// JSON map. These types are a lenient read-only view over it: every field
// defaults, and a section that does not fit its shape falls back to its
// default instead of failing.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub url: Option<String>,
    pub canonical: Option<String>,
    pub title: Option<String>,
    /// HTTP status as reported, `"200"` or `200`.
    #[serde(deserialize_with = "string_or_number")]
    pub status: Option<String>,
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: String,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub required: bool,
    pub pattern: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub options: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInfo {
    pub id: Option<String>,
    pub action: Option<String>,
    pub method: Option<String>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaElement {
    #[serde(rename = "type")]
    pub media_type: String,
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub loading: Option<String>,
    pub controls: Option<bool>,
    pub autoplay: Option<bool>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub muted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicElement {
    pub id: Option<String>,
    pub role: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub element_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicState {
    pub modals: Vec<DynamicElement>,
    pub notifications: Vec<DynamicElement>,
    pub loading: Vec<DynamicElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutInfo {
    #[serde(rename = "type")]
    pub layout_type: String,
    pub id: Option<String>,
    pub rect: Map<String, Value>,
    #[serde(rename = "zIndex")]
    pub z_index: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub pages: Vec<Map<String, Value>>,
}

/// Typed view of a page-level extraction record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub meta: PageMeta,
    pub outline: Vec<OutlineEntry>,
    pub text: Vec<TextBlock>,
    pub forms: Vec<FormInfo>,
    pub media: Vec<MediaElement>,
    pub links: Vec<LinkInfo>,
    pub structured_data: Vec<Value>,
    pub dynamic: DynamicState,
    pub layout: Vec<LayoutInfo>,
    pub pagination: Pagination,
}

impl PageMetadata {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let mut meta: PageMeta = section(map, "meta");
        // Legacy records put the title at the top level.
        if meta.title.is_none() {
            meta.title = map.get("title").and_then(Value::as_str).map(str::to_string);
        }

        Self {
            meta,
            outline: section(map, "outline"),
            text: section(map, "text"),
            forms: section(map, "forms"),
            media: section(map, "media"),
            links: section(map, "links"),
            structured_data: section(map, "structuredData"),
            dynamic: section(map, "dynamic"),
            layout: section(map, "layout"),
            pagination: section(map, "pagination"),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn section<T: DeserializeOwned + Default>(map: &Map<String, Value>, key: &str) -> T {
    match map.get(key) {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::debug!("page metadata section '{}' ignored: {}", key, e);
            T::default()
        }),
        None => T::default(),
    }
}
