use std::collections::BTreeMap;

use action_graph::model::action::{Action, ActionType};
use action_graph::model::element::{Element, ElementType};
use action_graph::model::graph::ActionGraph;
use action_graph::sensitive::classifier::{REDACTED_DESCRIPTION, SensitivityClassifier};
use action_graph::sensitive::patterns::SensitivePatterns;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

// ============================================================================
// Helper builders
// ============================================================================

fn login_graph() -> ActionGraph {
    let mut password = Element::new("pw", ElementType::Input, "input");
    password
        .attributes
        .insert("name".into(), "user_password".into());

    let mut submit = Element::new("submit", ElementType::Button, "button");
    submit.text = Some("Submit".into());

    let mut form = Element::new("login", ElementType::Form, "form");
    form.children = vec![password, submit];

    let mut graph = ActionGraph::new("https://example.com/login");
    graph.nodes.push(form);
    graph.edges = vec![
        Action::new(ActionType::Type, "Type into password field", 0.8).for_element(Some("pw".into())),
        Action::new(ActionType::Click, "Click Submit", 0.9).for_element(Some("submit".into())),
        Action::new(ActionType::Hover, "Hover over Submit", 0.8).for_element(Some("submit".into())),
        Action::new(ActionType::Back, "Go back in browser history", 1.0),
    ];
    graph
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn sensitive_attribute_marks_node() {
    let classified = SensitivityClassifier::default().classify(&login_graph());

    assert!(classified.find_node("pw").is_some_and(|e| e.is_sensitive));
    assert!(classified.find_node("submit").is_some_and(|e| !e.is_sensitive));
    assert_eq!(classified.sensitive_node_count(), 1);
}

#[test]
fn parent_is_not_marked_by_sensitive_child() {
    let classified = SensitivityClassifier::default().classify(&login_graph());
    assert!(classified.find_node("login").is_some_and(|e| !e.is_sensitive));
}

#[test]
fn child_is_not_marked_by_sensitive_parent() {
    let mut wrapper = Element::new("wrap", ElementType::Other, "div");
    wrapper.text = Some("Credit card details".into());
    wrapper.children.push(Element::new("inner", ElementType::Other, "span"));
    let mut graph = ActionGraph::new("https://example.com");
    graph.nodes.push(wrapper);

    let classified = SensitivityClassifier::default().classify(&graph);
    assert!(classified.find_node("wrap").is_some_and(|e| e.is_sensitive));
    assert!(classified.find_node("inner").is_some_and(|e| !e.is_sensitive));
}

#[test]
fn extraction_flag_is_kept() {
    let mut flagged = Element::new("x", ElementType::Other, "div");
    flagged.is_sensitive = true;
    let mut graph = ActionGraph::new("https://example.com");
    graph.nodes.push(flagged);

    let classified = SensitivityClassifier::default().classify(&graph);
    assert!(classified.nodes[0].is_sensitive);
}

#[test]
fn attribute_name_alone_can_match() {
    let mut field = Element::new("f", ElementType::Input, "input");
    field.attributes.insert("data-ssn".into(), "".into());
    let mut graph = ActionGraph::new("https://example.com");
    graph.nodes.push(field);

    let classified = SensitivityClassifier::default().classify(&graph);
    assert!(classified.nodes[0].is_sensitive);
}

// ============================================================================
// Edges
// ============================================================================

#[test]
fn sensitive_type_action_is_redacted() {
    let classified = SensitivityClassifier::default().classify(&login_graph());
    let typed = &classified.edges[0];

    assert_eq!(typed.description, REDACTED_DESCRIPTION);
    assert_eq!(typed.description, "Enter sensitive information");
    assert!(typed.is_sensitive());
    assert_eq!(typed.element_id.as_deref(), Some("pw"));
    assert_eq!(typed.confidence, 0.8);
}

#[test]
fn non_sensitive_actions_are_unchanged() {
    let graph = login_graph();
    let classified = SensitivityClassifier::default().classify(&graph);
    assert_eq!(&classified.edges[1..], &graph.edges[1..]);
}

#[test]
fn only_text_entry_actions_are_redacted() {
    let mut graph = ActionGraph::new("https://example.com");
    graph.edges = vec![
        Action::new(ActionType::Click, "Click Forgot password", 0.9),
        Action::new(ActionType::Select, "Select option from card type", 0.8),
    ];

    let classified = SensitivityClassifier::default().classify(&graph);
    assert_eq!(classified.edges, graph.edges);
}

#[test]
fn redaction_keeps_existing_metadata() {
    let mut metadata = Map::new();
    metadata.insert("source".into(), json!("form"));
    let mut action = Action::new(ActionType::Type, "Type into Email", 0.8);
    action.metadata = Some(metadata);

    let redacted = SensitivityClassifier::default().classify_action(&action);
    let metadata = redacted.metadata.unwrap_or_default();
    assert_eq!(metadata.get("source"), Some(&json!("form")));
    assert_eq!(metadata.get("is_sensitive"), Some(&Value::Bool(true)));
}

// ============================================================================
// Purity
// ============================================================================

#[test]
fn classification_is_idempotent() {
    let classifier = SensitivityClassifier::default();
    let once = classifier.classify(&login_graph());
    let twice = classifier.classify(&once);
    assert_eq!(twice, once);
}

#[test]
fn input_graph_is_not_mutated() {
    let graph = login_graph();
    let before = graph.clone();
    let _ = SensitivityClassifier::default().classify(&graph);
    assert_eq!(graph, before);
}

#[test]
fn metadata_and_url_carry_over() {
    let mut graph = login_graph();
    graph.metadata.insert("meta".into(), json!({ "title": "Login" }));
    let classified = SensitivityClassifier::default().classify(&graph);
    assert_eq!(classified.url, graph.url);
    assert_eq!(classified.metadata, graph.metadata);
}

// ============================================================================
// Extra patterns
// ============================================================================

#[test]
fn extra_patterns_extend_detection() {
    let mut graph = ActionGraph::new("https://example.com");
    graph.edges.push(Action::new(ActionType::Type, "Type into IBAN", 0.8));

    let default = SensitivityClassifier::default().classify(&graph);
    assert!(!default.edges[0].is_sensitive());

    let mut extra = BTreeMap::new();
    extra.insert("banking".to_string(), vec!["iban".to_string()]);
    let classifier = SensitivityClassifier::new(SensitivePatterns::with_extra(&extra));
    let classified = classifier.classify(&graph);
    assert!(classified.edges[0].is_sensitive());
    assert_eq!(classifier.patterns().matching_category("iban"), Some("banking"));
}
