use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::action::Action;
use crate::model::element::Element;
use crate::model::page::PageMetadata;

/// Elements and candidate actions of one page, produced fresh per
/// `generate_graph` call.
///
/// `nodes` holds root elements only; nesting carries the tree. Edges refer
/// to nodes by id and may dangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGraph {
    pub url: String,
    pub nodes: Vec<Element>,
    pub edges: Vec<Action>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ActionGraph {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Every element in the graph, depth-first across root nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().flat_map(Element::descendants)
    }

    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    pub fn find_node(&self, id: &str) -> Option<&Element> {
        self.elements().find(|e| e.id == id)
    }

    /// Element an action targets. `None` both for page-global actions and
    /// for ids that match no node.
    pub fn resolve(&self, action: &Action) -> Option<&Element> {
        action.element_id.as_deref().and_then(|id| self.find_node(id))
    }

    /// Element-scoped actions whose `element_id` matches no node.
    pub fn dangling_edges(&self) -> Vec<&Action> {
        self.edges
            .iter()
            .filter(|a| !a.is_global() && self.resolve(a).is_none())
            .collect()
    }

    pub fn sensitive_node_count(&self) -> usize {
        self.elements().filter(|e| e.is_sensitive).count()
    }

    /// Typed view of the page-level metadata; defaults when it does not fit.
    pub fn page_metadata(&self) -> PageMetadata {
        PageMetadata::from_map(&self.metadata)
    }
}
