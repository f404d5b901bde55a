use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};

use crate::error::SanitizeError;
use crate::model::element::{BoundingBox, Element, ElementType};

/// Nesting bound for untrusted element trees. Elements below it are dropped.
pub const MAX_DEPTH: usize = 64;

/// Turn raw extraction records into validated elements.
///
/// Records that cannot be converted are dropped and logged; a dropped
/// element takes its own subtree with it but never its parent. Never fails.
pub fn sanitize_elements(raw: &[Value]) -> Vec<Element> {
    let mut sanitizer = Sanitizer::new();
    sanitizer.sanitize(raw)
}

/// Stateful sanitizer: tracks claimed ids across every tree it converts so
/// that no id appears twice in its output.
#[derive(Debug, Default)]
pub struct Sanitizer {
    seen_ids: HashSet<String>,
    /// Root records seen by earlier calls; offsets the paths of later ones.
    roots: usize,
    accepted: usize,
    dropped: usize,
    records: Option<Vec<Value>>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sanitize(&mut self, raw: &[Value]) -> Vec<Element> {
        let base = self.roots;
        self.roots += raw.len();
        raw.iter()
            .enumerate()
            .filter_map(|(i, record)| self.convert(record, &(base + i).to_string(), 0))
            .collect()
    }

    /// Like `sanitize`, also returning every accepted raw record in
    /// pre-order, without `children` and with `id` replaced by the id its
    /// element was given. Rejected records and their subtrees are absent,
    /// so actions inferred from these records always resolve to the
    /// element they were derived from.
    pub fn sanitize_with_records(&mut self, raw: &[Value]) -> (Vec<Element>, Vec<Value>) {
        self.records = Some(Vec::new());
        let elements = self.sanitize(raw);
        let records = self.records.take().unwrap_or_default();
        (elements, records)
    }

    /// Elements accepted so far, nested ones included.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Records dropped so far, nested ones included. Descendants of a
    /// dropped record are not visited and not counted.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn convert(&mut self, raw: &Value, path: &str, depth: usize) -> Option<Element> {
        match self.try_convert(raw, path, depth) {
            Ok(element) => {
                self.accepted += 1;
                Some(element)
            }
            Err(err) => {
                self.dropped += 1;
                match err {
                    SanitizeError::NotAnObject(_) => debug!("skipping element {}: {}", path, err),
                    _ => warn!("dropping element {}: {} (record: {})", path, err, describe(raw)),
                }
                None
            }
        }
    }

    fn try_convert(&mut self, raw: &Value, path: &str, depth: usize) -> Result<Element, SanitizeError> {
        if depth > MAX_DEPTH {
            return Err(SanitizeError::TooDeep(MAX_DEPTH));
        }
        let record = raw
            .as_object()
            .ok_or_else(|| SanitizeError::NotAnObject(kind_of(raw)))?;

        let element_type = match opt_str(record, "type")? {
            Some(name) => ElementType::parse(name)
                .ok_or_else(|| SanitizeError::UnknownElementType(name.to_string()))?,
            None => ElementType::Other,
        };
        let tag = opt_str(record, "tag")?.unwrap_or_default().to_string();

        let mut element = Element {
            element_type,
            text: opt_str(record, "text")?.map(str::to_string),
            attributes: attributes(record)?,
            bounding_box: bounding_box(record)?,
            is_visible: opt_bool(record, "is_visible")?.unwrap_or(true),
            is_interactive: opt_bool(record, "is_interactive")?.unwrap_or(false),
            is_sensitive: opt_bool(record, "is_sensitive")?.unwrap_or(false),
            children: Vec::new(),
            aria_role: opt_str(record, "aria_role")?.map(str::to_string),
            input_type: opt_str(record, "input_type")?.map(str::to_string),
            id: element_id(record, path, &tag)?,
            tag,
        };

        if !self.seen_ids.insert(element.id.clone()) {
            return Err(SanitizeError::DuplicateId(element.id));
        }
        if let Some(records) = self.records.as_mut() {
            records.push(accepted_record(record, &element.id));
        }

        // Non-list children are ignored rather than failing the element.
        if let Some(Value::Array(children)) = record.get("children") {
            element.children = children
                .iter()
                .enumerate()
                .filter_map(|(i, child)| self.convert(child, &format!("{}/{}", path, i), depth + 1))
                .collect();
        }

        Ok(element)
    }
}

fn accepted_record(record: &Map<String, Value>, id: &str) -> Value {
    let mut copy: Map<String, Value> = record
        .iter()
        .filter(|(k, _)| k.as_str() != "children")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    copy.insert("id".into(), Value::String(id.to_string()));
    Value::Object(copy)
}

/// Records without an id get a stable fingerprint of their tree position.
fn element_id(record: &Map<String, Value>, path: &str, tag: &str) -> Result<String, SanitizeError> {
    match record.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(fingerprint_id(path, tag)),
        Some(other) => Err(invalid("id", "a string", other)),
    }
}

pub fn fingerprint_id(path: &str, tag: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(path.as_bytes());
    hasher.update(b":");
    hasher.update(tag.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("el-{}", &digest[..12])
}

fn attributes(record: &Map<String, Value>) -> Result<BTreeMap<String, String>, SanitizeError> {
    let map = match record.get("attributes") {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(invalid("attributes", "an object", other)),
    };

    map.iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name.clone(), s.clone())),
            other => Err(invalid(&format!("attributes.{}", name), "a string", other)),
        })
        .collect()
}

fn bounding_box(record: &Map<String, Value>) -> Result<BoundingBox, SanitizeError> {
    let map = match record.get("bounding_box") {
        None | Some(Value::Null) => return Ok(BoundingBox::default()),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(invalid("bounding_box", "an object", other)),
    };

    let coord = |key: &str| -> Result<f64, SanitizeError> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(0.0),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| invalid(&format!("bounding_box.{}", key), "a number", &map[key])),
            Some(other) => Err(invalid(&format!("bounding_box.{}", key), "a number", other)),
        }
    };

    Ok(BoundingBox {
        top: coord("top")?,
        left: coord("left")?,
        width: coord("width")?,
        height: coord("height")?,
    })
}

fn opt_str<'a>(record: &'a Map<String, Value>, field: &str) -> Result<Option<&'a str>, SanitizeError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(field, "a string", other)),
    }
}

fn opt_bool(record: &Map<String, Value>, field: &str) -> Result<Option<bool>, SanitizeError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(invalid(field, "a boolean", other)),
    }
}

fn invalid(field: &str, expected: &'static str, found: &Value) -> SanitizeError {
    SanitizeError::InvalidField {
        field: field.to_string(),
        expected,
        found: kind_of(found),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact form of a raw record for logs: children are summarized.
fn describe(raw: &Value) -> String {
    match raw {
        Value::Object(map) => {
            let mut shallow = map.clone();
            if let Some(Value::Array(children)) = shallow.get("children") {
                let summary = format!("<{} children>", children.len());
                shallow.insert("children".into(), Value::String(summary));
            }
            Value::Object(shallow).to_string()
        }
        other => other.to_string(),
    }
}
