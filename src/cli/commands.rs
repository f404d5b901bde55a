use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::browser::session::BrowserConfig;
use crate::graph::generator::{GraphGenerator, generate_batch, graph_from_file};
use crate::model::graph::ActionGraph;
use crate::perf::metrics::{format_summary_table, measure_all};
use crate::report::console::format_graph_report;
use crate::report::csv::{csv_filename, generate_csv};
use crate::report::jsonl::GraphWriter;
use crate::sensitive::classifier::SensitivityClassifier;

// ============================================================================
// graph subcommand
// ============================================================================

/// Generate graphs for `urls`. Returns whether every URL succeeded.
pub fn cmd_graph(
    urls: &[String],
    output: Option<&str>,
    jobs: usize,
    pretty: bool,
    browser: &BrowserConfig,
    classifier: SensitivityClassifier,
) -> Result<bool, Box<dyn std::error::Error>> {
    let writer = output.map(|path| GraphWriter::new(Path::new(path)));
    if let Some(w) = &writer {
        if !w.is_enabled() {
            return Err(format!("cannot write to {}", output.unwrap_or_default()).into());
        }
    }

    let results = if urls.len() == 1 {
        vec![GraphGenerator::generate_once(browser, classifier, &urls[0])]
    } else {
        generate_batch(browser, &classifier, urls, jobs)
    };

    let mut all_ok = true;
    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(graph) => match &writer {
                Some(w) => w.write(&graph),
                None => println!("{}", render_json(&graph, pretty)?),
            },
            Err(e) => {
                all_ok = false;
                eprintln!("{}: {}", url, e);
            }
        }
    }
    Ok(all_ok)
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(
    url: &str,
    browser: &BrowserConfig,
    classifier: SensitivityClassifier,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = GraphGenerator::generate_once(browser, classifier, url)?;
    print!("{}", format_graph_report(&graph));
    Ok(())
}

// ============================================================================
// offline subcommand
// ============================================================================

pub fn cmd_offline(
    input: &str,
    url: &str,
    pretty: bool,
    classifier: &SensitivityClassifier,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = graph_from_file(Path::new(input), url, classifier)?;
    println!("{}", render_json(&graph, pretty)?);
    Ok(())
}

// ============================================================================
// perf subcommand
// ============================================================================

pub fn cmd_perf(
    urls: &[String],
    runs: usize,
    output: &str,
    browser: &BrowserConfig,
    classifier: &SensitivityClassifier,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Testing {} URL(s) with {} run(s) each", urls.len(), runs);

    let summaries = measure_all(browser, classifier, urls, runs);
    if summaries.is_empty() {
        return Err("no successful runs".into());
    }

    println!("\nPerformance Summary:");
    print!("{}", format_summary_table(&summaries));

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let filename = csv_filename(output, secs);
    std::fs::write(&filename, generate_csv(&summaries))?;
    println!("\nDetailed results saved to {}", filename);
    Ok(())
}

pub fn render_json(graph: &ActionGraph, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(graph)
    } else {
        serde_json::to_string(graph)
    }
}
