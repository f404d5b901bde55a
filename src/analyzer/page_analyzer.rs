use log::warn;
use serde_json::{Map, Value};

use crate::browser::driver::PageDriver;
use crate::error::SessionError;
use crate::model::element::Element;
use crate::sanitize::sanitizer::Sanitizer;

/// Raw extraction output split into the parts the pipeline consumes.
///
/// Everything here is still untrusted: `elements` goes through the
/// sanitizer, the interactive records through action inference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAnalysis {
    /// Root element records.
    pub elements: Vec<Value>,
    /// The page's own `actions` list, when it supplied one. `None` means
    /// actions are inferred from the accepted element records.
    pub interactive: Option<Vec<Value>>,
    /// Page-level fields, carried opaquely into the graph.
    pub metadata: Map<String, Value>,
}

impl PageAnalysis {
    /// Split an extraction value. Accepts the page-level record or the
    /// legacy bare element array; anything else is an empty page.
    pub fn from_extraction(raw: Value) -> Self {
        match raw {
            Value::Array(elements) => PageAnalysis {
                elements,
                interactive: None,
                metadata: Map::new(),
            },
            Value::Object(mut record) => {
                let elements = match record.remove("elements") {
                    Some(Value::Array(elements)) => elements,
                    Some(other) => {
                        warn!("ignoring non-list 'elements' in extraction ({})", kind(&other));
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                let interactive = match record.remove("actions") {
                    Some(Value::Array(actions)) => Some(actions),
                    Some(other) => {
                        warn!("ignoring non-list 'actions' in extraction ({})", kind(&other));
                        None
                    }
                    None => None,
                };
                PageAnalysis {
                    elements,
                    interactive,
                    metadata: record,
                }
            }
            Value::Null => PageAnalysis::default(),
            other => {
                warn!("unexpected extraction result ({}), treating page as empty", kind(&other));
                PageAnalysis::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.interactive.as_ref().is_none_or(Vec::is_empty)
    }

    /// Sanitize the element tree and pick the records to infer actions
    /// from: the page's `actions` list as given, or else every accepted
    /// element record under the id the sanitizer gave it.
    pub fn into_parts(self, sanitizer: &mut Sanitizer) -> (Vec<Element>, Vec<Value>, Map<String, Value>) {
        let (nodes, interactive) = match self.interactive {
            Some(actions) => (sanitizer.sanitize(&self.elements), actions),
            None => sanitizer.sanitize_with_records(&self.elements),
        };
        (nodes, interactive, self.metadata)
    }
}

/// Navigate to `url` and extract its raw analysis. An extraction timeout
/// yields an empty analysis rather than an error.
pub fn analyze_page<D: PageDriver + ?Sized>(driver: &mut D, url: &str) -> Result<PageAnalysis, SessionError> {
    driver.navigate(url)?;
    match driver.extract()? {
        Some(raw) => Ok(PageAnalysis::from_extraction(raw)),
        None => {
            warn!("no extraction result for {}, continuing with an empty page", url);
            Ok(PageAnalysis::default())
        }
    }
}

fn kind(value: &Value) -> &'static str {
    crate::sanitize::sanitizer::kind_of(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_infers_from_the_tree() {
        let analysis = PageAnalysis::from_extraction(json!([{ "id": "a", "children": [{ "id": "b" }] }]));
        assert_eq!(analysis.elements.len(), 1);
        assert_eq!(analysis.interactive, None);
        assert!(analysis.metadata.is_empty());
    }

    #[test]
    fn page_record_splits_actions_and_metadata() {
        let analysis = PageAnalysis::from_extraction(json!({
            "elements": [{ "id": "a" }],
            "actions": [{ "id": "a", "type": "button", "interactive": true }],
            "title": "Home"
        }));
        assert_eq!(analysis.interactive.as_ref().map(Vec::len), Some(1));
        assert_eq!(analysis.metadata.get("title"), Some(&json!("Home")));
        assert!(!analysis.metadata.contains_key("actions"));
    }

    #[test]
    fn tree_records_carry_sanitized_ids() {
        let analysis = PageAnalysis::from_extraction(json!([
            { "id": 17, "type": "BUTTON", "tag": "button", "children": [{ "type": "LINK", "tag": "a" }] },
            { "id": "17", "type": "BUTTON", "tag": "button" }
        ]));
        let (nodes, records, _) = analysis.into_parts(&mut Sanitizer::new());

        assert_eq!(nodes.len(), 1);
        let ids: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["17", nodes[0].children[0].id.as_str()]);
        assert!(records.iter().all(|r| r.get("children").is_none()));
    }
}
