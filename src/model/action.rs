use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Click,
    Hover,
    Type,
    Select,
    Check,
    Toggle,
    Slide,
    DatePick,
    Play,
    Pause,
    Back,
    Forward,
    Screenshot,
    Evaluate,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Click => "click",
            ActionType::Hover => "hover",
            ActionType::Type => "type",
            ActionType::Select => "select",
            ActionType::Check => "check",
            ActionType::Toggle => "toggle",
            ActionType::Slide => "slide",
            ActionType::DatePick => "date_pick",
            ActionType::Play => "play",
            ActionType::Pause => "pause",
            ActionType::Back => "back",
            ActionType::Forward => "forward",
            ActionType::Screenshot => "screenshot",
            ActionType::Evaluate => "evaluate",
        }
    }

    /// Whether the action enters free text into the page.
    pub fn is_text_entry(&self) -> bool {
        matches!(self, ActionType::Type)
    }
}

/// A candidate interaction. `element_id` is a lookup key into the graph's
/// node tree, never an owning reference; `None` means page-global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub description: String,
    pub confidence: f64,
    pub element_id: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

impl Action {
    pub fn new(action_type: ActionType, description: impl Into<String>, confidence: f64) -> Self {
        Self {
            action_type,
            description: description.into(),
            confidence: confidence.clamp(0.0, 1.0),
            element_id: None,
            metadata: None,
        }
    }

    pub fn for_element(mut self, element_id: Option<String>) -> Self {
        self.element_id = element_id;
        self
    }

    pub fn is_global(&self) -> bool {
        self.element_id.is_none()
    }

    pub fn is_sensitive(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("is_sensitive"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
