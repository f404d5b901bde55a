//! Action graphs of rendered web pages.
//!
//! Raw element records from a browser extraction script are sanitized into
//! an element tree, candidate actions are inferred per element type, and a
//! sensitivity pass flags elements and redacts text-entry actions that look
//! like they handle private data.

pub mod analyzer;
pub mod browser;
pub mod cli;
pub mod error;
pub mod graph;
pub mod inference;
pub mod model;
pub mod perf;
pub mod report;
pub mod sanitize;
pub mod sensitive;

pub use error::{GraphError, SanitizeError, SessionError};
pub use graph::generator::{GraphGenerator, build_graph};
pub use model::action::{Action, ActionType};
pub use model::element::{BoundingBox, Element, ElementType};
pub use model::graph::ActionGraph;
pub use sensitive::classifier::SensitivityClassifier;

/// Build the classified action graph for `url` with a browser session that
/// lives only for this call.
pub fn generate_graph(url: &str) -> Result<ActionGraph, GraphError> {
    GraphGenerator::generate_once(
        &browser::session::BrowserConfig::default(),
        SensitivityClassifier::default(),
        url,
    )
}
