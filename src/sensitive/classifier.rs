use serde_json::Value;

use crate::model::action::Action;
use crate::model::element::Element;
use crate::model::graph::ActionGraph;
use crate::sensitive::patterns::SensitivePatterns;

/// Description every sensitive text-entry action is rewritten to.
pub const REDACTED_DESCRIPTION: &str = "Enter sensitive information";

/// Second pass over a built graph that flags sensitive nodes and redacts
/// sensitive text-entry actions.
///
/// `classify` is pure and idempotent: the input graph is only read, and
/// `classify(&classify(g)) == classify(g)`.
#[derive(Debug, Clone, Default)]
pub struct SensitivityClassifier {
    patterns: SensitivePatterns,
}

impl SensitivityClassifier {
    pub fn new(patterns: SensitivePatterns) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &SensitivePatterns {
        &self.patterns
    }

    pub fn classify(&self, graph: &ActionGraph) -> ActionGraph {
        ActionGraph {
            url: graph.url.clone(),
            nodes: graph.nodes.iter().map(|n| self.classify_element(n)).collect(),
            edges: graph.edges.iter().map(|a| self.classify_action(a)).collect(),
            metadata: graph.metadata.clone(),
        }
    }

    /// Copy of `element` with `is_sensitive` set where its own attributes or
    /// text match. Children are classified independently.
    pub fn classify_element(&self, element: &Element) -> Element {
        Element {
            is_sensitive: element.is_sensitive || self.element_matches(element),
            children: element
                .children
                .iter()
                .map(|c| self.classify_element(c))
                .collect(),
            ..shallow_clone(element)
        }
    }

    pub fn classify_action(&self, action: &Action) -> Action {
        if !action.action_type.is_text_entry() || !self.patterns.is_sensitive(&action.description) {
            return action.clone();
        }

        let mut redacted = action.clone();
        redacted
            .metadata
            .get_or_insert_with(Default::default)
            .insert("is_sensitive".into(), Value::Bool(true));
        redacted.description = REDACTED_DESCRIPTION.to_string();
        redacted
    }

    fn element_matches(&self, element: &Element) -> bool {
        let attribute_hit = element
            .attributes
            .iter()
            .any(|(name, value)| self.patterns.is_sensitive(&format!("{} {}", name, value)));

        attribute_hit
            || element
                .text
                .as_deref()
                .is_some_and(|text| self.patterns.is_sensitive(text))
    }
}

/// Clone of an element without its subtree.
fn shallow_clone(element: &Element) -> Element {
    Element {
        id: element.id.clone(),
        element_type: element.element_type,
        tag: element.tag.clone(),
        text: element.text.clone(),
        attributes: element.attributes.clone(),
        bounding_box: element.bounding_box,
        is_visible: element.is_visible,
        is_interactive: element.is_interactive,
        is_sensitive: element.is_sensitive,
        children: Vec::new(),
        aria_role: element.aria_role.clone(),
        input_type: element.input_type.clone(),
    }
}
