use crate::model::graph::ActionGraph;
use crate::model::page::PageMetadata;

// ============================================================================
// Console reporter — formatted terminal output for one action graph
// ============================================================================

/// Format an action graph for terminal output.
///
/// Produces output like:
/// ```text
/// === Action Graph: https://example.com ===
/// Title:  Example Domain
/// Status: 200
///
/// --- Summary ---
///   Headings         2
///   ...
///
/// --- Actions ---
///   click       0.90  Click More information
///   type        0.80  Enter sensitive information  [sensitive]
/// ```
pub fn format_graph_report(graph: &ActionGraph) -> String {
    let page = graph.page_metadata();
    let mut out = String::new();

    out.push_str(&format!("=== Action Graph: {} ===\n", graph.url));
    out.push_str(&format!("Title:  {}\n", page.title().unwrap_or("N/A")));
    if let Some(status) = &page.meta.status {
        out.push_str(&format!("Status: {}\n", status));
    }
    if let Some(canonical) = &page.meta.canonical {
        out.push_str(&format!("Canonical: {}\n", canonical));
    }

    out.push_str("\n--- Summary ---\n");
    let rows = [
        ("Headings", page.outline.len()),
        ("Forms", page.forms.len()),
        ("Media elements", page.media.len()),
        ("Links", page.links.len()),
        ("Layout sections", page.layout.len()),
        ("Elements", graph.element_count()),
        ("Sensitive elements", graph.sensitive_node_count()),
        ("Actions", graph.edges.len()),
    ];
    for (label, count) in rows {
        out.push_str(&format!("  {:<18} {}\n", label, count));
    }

    format_outline(&page, &mut out);
    format_forms(&page, &mut out);
    format_links(&page, &mut out);
    format_pagination(&page, &mut out);

    out.push_str("\n--- Actions ---\n");
    for action in &graph.edges {
        let marker = if action.is_sensitive() { "  [sensitive]" } else { "" };
        out.push_str(&format!(
            "  {:<11} {:.2}  {}{}\n",
            action.action_type.as_str(),
            action.confidence,
            action.description,
            marker
        ));
    }

    out
}

fn format_outline(page: &PageMetadata, out: &mut String) {
    if page.outline.is_empty() {
        return;
    }
    out.push_str("\n--- Outline ---\n");
    for entry in &page.outline {
        let indent = "  ".repeat(entry.level.max(1) as usize);
        out.push_str(&format!("{}h{} {}\n", indent, entry.level, entry.text.trim()));
    }
}

fn format_forms(page: &PageMetadata, out: &mut String) {
    if page.forms.is_empty() {
        return;
    }
    out.push_str("\n--- Forms ---\n");
    for form in &page.forms {
        out.push_str(&format!(
            "  Form {} ({} {})\n",
            form.id.as_deref().unwrap_or("N/A"),
            form.method.as_deref().unwrap_or("GET").to_uppercase(),
            form.action.as_deref().unwrap_or("N/A"),
        ));
        for field in &form.fields {
            let required = if field.required { " (required)" } else { "" };
            out.push_str(&format!(
                "    - {} {}{}\n",
                field.field_type,
                field.name.as_deref().or(field.id.as_deref()).unwrap_or("N/A"),
                required
            ));
        }
    }
}

fn format_links(page: &PageMetadata, out: &mut String) {
    if page.links.is_empty() {
        return;
    }
    out.push_str("\n--- Links ---\n");
    for link in &page.links {
        out.push_str(&format!("  {} -> {}\n", link.text.trim(), link.href));
    }
}

fn format_pagination(page: &PageMetadata, out: &mut String) {
    let pagination = &page.pagination;
    if pagination.next.is_none() && pagination.prev.is_none() && pagination.pages.is_empty() {
        return;
    }
    out.push_str("\n--- Pagination ---\n");
    if let Some(prev) = &pagination.prev {
        out.push_str(&format!("  Previous: {}\n", prev));
    }
    if let Some(next) = &pagination.next {
        out.push_str(&format!("  Next: {}\n", next));
    }
    out.push_str(&format!("  Pages: {}\n", pagination.pages.len()));
}
