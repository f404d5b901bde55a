mod common;

use std::io::Write;
use std::path::Path;

use action_graph::analyzer::page_analyzer::PageAnalysis;
use action_graph::browser::session::BrowserConfig;
use action_graph::error::{GraphError, SessionError};
use action_graph::graph::generator::{GraphGenerator, build_graph, generate_batch, graph_from_file};
use action_graph::model::action::{Action, ActionType};
use action_graph::sensitive::classifier::{REDACTED_DESCRIPTION, SensitivityClassifier};
use common::{Fault, MockDriver, login_page};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Helper builders
// ============================================================================

fn generator_over(driver: MockDriver) -> GraphGenerator {
    GraphGenerator::with_driver(Box::new(driver), SensitivityClassifier::default())
}

fn unlaunchable() -> BrowserConfig {
    BrowserConfig {
        node_binary: "/nonexistent/bin/node-for-action-graph-tests".into(),
        ..BrowserConfig::default()
    }
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[test]
fn generate_without_session_is_rejected() {
    let mut generator = GraphGenerator::new(BrowserConfig::default(), SensitivityClassifier::default());
    assert!(!generator.is_open());
    let err = generator.generate_graph("https://example.com").unwrap_err();
    assert!(matches!(err, GraphError::NoSession));
}

#[test]
fn launch_failure_surfaces_as_launch_error() {
    let mut generator = GraphGenerator::new(unlaunchable(), SensitivityClassifier::default());
    let err = generator.open().unwrap_err();
    assert!(matches!(err, GraphError::Launch(SessionError::Spawn { .. })));
    assert!(!generator.is_open());
}

#[test]
fn scoped_does_not_run_body_without_session() {
    let mut ran = false;
    let result = GraphGenerator::scoped(&unlaunchable(), SensitivityClassifier::default(), |_| {
        ran = true;
        Ok(())
    });
    assert!(matches!(result, Err(GraphError::Launch(_))));
    assert!(!ran);
}

#[test]
fn close_releases_driver_once() {
    let driver = MockDriver::new(json!([]));
    let closes = driver.closes.clone();
    let mut generator = generator_over(driver);

    generator.close();
    generator.close();
    drop(generator);

    assert_eq!(closes.get(), 1);
}

#[test]
fn drop_releases_driver() {
    let driver = MockDriver::new(json!([]));
    let closes = driver.closes.clone();
    {
        let mut generator = generator_over(driver);
        let _ = generator.generate_graph("https://example.com");
    }
    assert_eq!(closes.get(), 1);
}

#[test]
fn session_is_reused_across_calls() {
    let driver = MockDriver::new(json!([]));
    let navigations = driver.navigations.clone();
    let mut generator = generator_over(driver);

    for url in ["https://a.example", "https://b.example", "https://c.example"] {
        let graph = generator.generate_graph(url).unwrap();
        assert_eq!(graph.url, url);
    }
    assert_eq!(navigations.get(), 3);
    assert!(generator.is_open());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn navigation_failure_keeps_session_open() {
    let driver = MockDriver::failing(Fault::NavigateRejected);
    let closes = driver.closes.clone();
    let mut generator = generator_over(driver);

    let err = generator.generate_graph("https://nowhere.invalid").unwrap_err();
    match err {
        GraphError::Generation { url, source } => {
            assert_eq!(url, "https://nowhere.invalid");
            assert!(matches!(source, SessionError::Protocol { .. }));
        }
        other => panic!("expected Generation, got {:?}", other),
    }
    assert!(generator.is_open());
    assert_eq!(closes.get(), 0);
}

#[test]
fn dead_driver_closes_session() {
    let driver = MockDriver::failing(Fault::DriverExits);
    let closes = driver.closes.clone();
    let mut generator = generator_over(driver);

    let err = generator.generate_graph("https://example.com").unwrap_err();
    assert!(matches!(
        err,
        GraphError::Generation { source: SessionError::Closed, .. }
    ));
    assert!(!generator.is_open());
    assert_eq!(closes.get(), 1);

    let again = generator.generate_graph("https://example.com").unwrap_err();
    assert!(matches!(again, GraphError::NoSession));
}

#[test]
fn extraction_timeout_yields_empty_graph() {
    let mut generator = generator_over(MockDriver::failing(Fault::ExtractTimesOut));
    let graph = generator.generate_graph("https://slow.example").unwrap();

    assert!(graph.nodes.is_empty());
    assert_eq!(graph.edges.len(), 4);
    assert!(graph.edges.iter().all(|a| a.is_global()));
}

// ============================================================================
// Graph content
// ============================================================================

#[test]
fn empty_page_has_only_global_edges() {
    let mut generator = generator_over(MockDriver::new(json!([])));
    let graph = generator.generate_graph("https://blank.example").unwrap();

    assert_eq!(graph.url, "https://blank.example");
    assert!(graph.nodes.is_empty());
    let types: Vec<ActionType> = graph.edges.iter().map(|a| a.action_type).collect();
    assert_eq!(
        types,
        vec![ActionType::Back, ActionType::Forward, ActionType::Screenshot, ActionType::Evaluate]
    );
}

#[test]
fn page_record_builds_classified_graph() {
    let mut generator = generator_over(MockDriver::new(login_page()));
    let graph = generator.generate_graph("https://example.com/login").unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.element_count(), 4);
    assert_eq!(graph.sensitive_node_count(), 2);

    // email, password, submit x2, signup x2, globals x4
    assert_eq!(graph.edges.len(), 10);
    assert_eq!(graph.edges[0].description, REDACTED_DESCRIPTION);
    assert_eq!(graph.edges[1].description, REDACTED_DESCRIPTION);
    assert_eq!(graph.edges[2].description, "Click Submit");
    assert!(!graph.edges[2].is_sensitive());

    let page = graph.page_metadata();
    assert_eq!(page.title(), Some("Sign in - Example"));
    assert_eq!(page.forms.len(), 1);
    assert!(!graph.metadata.contains_key("elements"));
    assert!(!graph.metadata.contains_key("actions"));
}

#[test]
fn dangling_edges_are_kept() {
    let mut generator = generator_over(MockDriver::new(login_page()));
    let graph = generator.generate_graph("https://example.com/login").unwrap();

    let dangling: Vec<Option<&str>> = graph
        .dangling_edges()
        .iter()
        .map(|a| a.element_id.as_deref())
        .collect();
    assert_eq!(dangling, vec![Some("signup"), Some("signup")]);
}

#[test]
fn legacy_element_array_is_flattened_for_inference() {
    let raw = json!([{
        "id": "form",
        "type": "FORM",
        "tag": "form",
        "children": [{
            "id": "pw",
            "type": "INPUT",
            "tag": "input",
            "input_type": "password",
            "is_interactive": true,
            "attributes": { "name": "password" }
        }]
    }]);
    let mut generator = generator_over(MockDriver::new(raw));
    let graph = generator.generate_graph("https://example.com").unwrap();

    let typed = &graph.edges[0];
    assert_eq!(typed.action_type, ActionType::Type);
    assert_eq!(typed.description, REDACTED_DESCRIPTION);
    assert!(typed.is_sensitive());
    assert_eq!(graph.resolve(typed).map(|e| e.id.as_str()), Some("pw"));
    assert!(graph.dangling_edges().is_empty());
}

#[test]
fn numeric_and_missing_ids_resolve_to_their_nodes() {
    let raw = json!([
        { "id": 17, "type": "BUTTON", "tag": "button", "text": "Buy", "is_interactive": true },
        { "type": "LINK", "tag": "a", "text": "Help", "is_interactive": true }
    ]);
    let graph = build_graph("https://shop.example", PageAnalysis::from_extraction(raw), &SensitivityClassifier::default());

    let scoped: Vec<&Action> = graph.edges.iter().filter(|a| !a.is_global()).collect();
    assert_eq!(scoped.len(), 4);
    let targets: Vec<Option<&str>> = scoped
        .iter()
        .map(|a| graph.resolve(a).and_then(|e| e.text.as_deref()))
        .collect();
    assert_eq!(targets, vec![Some("Buy"), Some("Buy"), Some("Help"), Some("Help")]);
    assert!(graph.dangling_edges().is_empty());
}

#[test]
fn duplicate_id_record_yields_no_edges() {
    let raw = json!([
        { "id": "x", "type": "BUTTON", "tag": "button", "text": "Delete account", "is_interactive": true },
        { "id": "x", "type": "BUTTON", "tag": "button", "text": "Save", "is_interactive": true }
    ]);
    let graph = build_graph("https://app.example", PageAnalysis::from_extraction(raw), &SensitivityClassifier::default());

    assert_eq!(graph.element_count(), 1);
    let descriptions: Vec<&str> = graph.edges.iter().map(|a| a.description.as_str()).collect();
    assert!(!descriptions.iter().any(|d| d.contains("Save")));
    for action in graph.edges.iter().filter(|a| !a.is_global()) {
        assert_eq!(graph.resolve(action).and_then(|e| e.text.as_deref()), Some("Delete account"));
        assert!(action.description.contains("Delete account"));
    }
}

#[test]
fn build_graph_is_pure_over_analysis() {
    let analysis = PageAnalysis::from_extraction(login_page());
    let classifier = SensitivityClassifier::default();
    let first = build_graph("https://example.com/login", analysis.clone(), &classifier);
    let second = build_graph("https://example.com/login", analysis, &classifier);
    assert_eq!(first, second);
}

// ============================================================================
// Offline input
// ============================================================================

#[test]
fn graph_from_saved_extraction() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", login_page()).unwrap();

    let graph = graph_from_file(file.path(), "https://example.com/login", &SensitivityClassifier::default()).unwrap();
    assert_eq!(graph.element_count(), 4);
    assert_eq!(graph.edges.len(), 10);
}

#[test]
fn missing_input_file_is_an_input_error() {
    let err = graph_from_file(
        Path::new("/nonexistent/extraction.json"),
        "about:blank",
        &SensitivityClassifier::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::Input { .. }));
}

#[test]
fn invalid_json_input_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let err = graph_from_file(file.path(), "about:blank", &SensitivityClassifier::default()).unwrap_err();
    assert!(matches!(err, GraphError::Parse { .. }));
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn batch_keeps_input_order_on_failure() {
    let urls: Vec<String> = (0..3).map(|i| format!("https://{}.example", i)).collect();
    let results = generate_batch(&unlaunchable(), &SensitivityClassifier::default(), &urls, 2);

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| matches!(r, Err(GraphError::Launch(_)))));
}

#[test]
fn batch_of_nothing_is_empty() {
    let results = generate_batch(&unlaunchable(), &SensitivityClassifier::default(), &[], 4);
    assert!(results.is_empty());
}

#[test]
fn batch_with_more_workers_than_urls() {
    let urls: Vec<String> = (0..2).map(|i| format!("https://{}.example", i)).collect();
    let results = generate_batch(&unlaunchable(), &SensitivityClassifier::default(), &urls, 8);

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| matches!(r, Err(GraphError::Launch(_)))));
}
