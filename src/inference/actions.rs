use log::debug;
use serde_json::{Map, Value};

use crate::model::action::{Action, ActionType};

const CLICK_CONFIDENCE: f64 = 0.9;
const HOVER_CONFIDENCE: f64 = 0.8;
const ENTRY_CONFIDENCE: f64 = 0.8;

/// Input subtypes that take typed text.
const TEXT_INPUT_TYPES: [&str; 4] = ["text", "email", "password", "number"];

/// Derive the edge set of a graph from the interactive element records.
///
/// Element actions come first, in record order, followed by the four
/// page-global actions. Malformed records yield no actions.
pub fn infer_actions(records: &[Value]) -> Vec<Action> {
    let mut actions: Vec<Action> = records.iter().flat_map(element_actions).collect();
    actions.extend(global_actions());
    actions
}

/// Actions available on every page regardless of its content.
pub fn global_actions() -> [Action; 4] {
    [
        Action::new(ActionType::Back, "Go back in browser history", 1.0),
        Action::new(ActionType::Forward, "Go forward in browser history", 1.0),
        Action::new(ActionType::Screenshot, "Take screenshot of viewport", 1.0),
        // Needs caller-supplied script, hence lower trust.
        Action::new(ActionType::Evaluate, "Execute JavaScript", 0.5),
    ]
}

/// Candidate actions for one raw record.
pub fn element_actions(raw: &Value) -> Vec<Action> {
    let Some(record) = raw.as_object() else {
        debug!("no actions for non-object record");
        return Vec::new();
    };

    let interactive = record
        .get("interactive")
        .or_else(|| record.get("is_interactive"))
        .is_some_and(is_truthy);
    if !interactive {
        return Vec::new();
    }

    let Some(kind) = record.get("type").and_then(Value::as_str) else {
        return Vec::new();
    };

    // Numeric ids are stringified, as the sanitizer does for nodes.
    let element_id = match record.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let target = Labels::new(record);
    let actions = match kind.to_ascii_lowercase().as_str() {
        "link" => pointer_actions(target.label("link")),
        "button" => pointer_actions(target.label("button")),
        "input" => {
            let subtype = input_subtype(record);
            match subtype.as_str() {
                t if TEXT_INPUT_TYPES.contains(&t) => vec![Action::new(
                    ActionType::Type,
                    format!("Type into {}", target.label("input field")),
                    ENTRY_CONFIDENCE,
                )],
                "checkbox" => vec![Action::new(
                    ActionType::Click,
                    format!("Toggle {}", target.label("checkbox")),
                    CLICK_CONFIDENCE,
                )],
                "radio" => vec![Action::new(
                    ActionType::Click,
                    format!("Select {}", target.label("radio button")),
                    CLICK_CONFIDENCE,
                )],
                _ => Vec::new(),
            }
        }
        "select" => vec![Action::new(
            ActionType::Select,
            format!("Select option from {}", target.label("dropdown")),
            ENTRY_CONFIDENCE,
        )],
        "textarea" => vec![Action::new(
            ActionType::Type,
            format!("Type into {}", target.label("text area")),
            ENTRY_CONFIDENCE,
        )],
        _ => Vec::new(),
    };

    actions
        .into_iter()
        .map(|a| a.for_element(element_id.clone()))
        .collect()
}

fn pointer_actions(label: &str) -> Vec<Action> {
    vec![
        Action::new(ActionType::Click, format!("Click {}", label), CLICK_CONFIDENCE),
        Action::new(ActionType::Hover, format!("Hover over {}", label), HOVER_CONFIDENCE),
    ]
}

/// `input_type`, else the `type` attribute, else `text`.
fn input_subtype(record: &Map<String, Value>) -> String {
    record
        .get("input_type")
        .and_then(Value::as_str)
        .or_else(|| {
            record
                .get("attributes")
                .and_then(Value::as_object)
                .and_then(|attrs| attrs.get("type"))
                .and_then(Value::as_str)
        })
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

/// Label sources for descriptions: visible text, then `placeholder`, then
/// `name`, then a generic noun for the element kind.
struct Labels<'a> {
    text: Option<&'a str>,
    placeholder: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> Labels<'a> {
    fn new(record: &'a Map<String, Value>) -> Self {
        let attrs = record.get("attributes").and_then(Value::as_object);
        let attr = |key: &str| {
            attrs
                .and_then(|a| a.get(key))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        Self {
            text: record
                .get("text")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            placeholder: attr("placeholder"),
            name: attr("name"),
        }
    }

    fn label(&self, noun: &'a str) -> &'a str {
        self.text.or(self.placeholder).or(self.name).unwrap_or(noun)
    }
}

/// JavaScript truthiness for values coming out of the extraction script.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
