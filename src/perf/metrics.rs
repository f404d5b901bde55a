use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Serialize;

use crate::analyzer::page_analyzer::PageAnalysis;
use crate::browser::driver::PageDriver;
use crate::browser::session::{BrowserConfig, BrowserSession};
use crate::error::GraphError;
use crate::inference::actions::infer_actions;
use crate::model::graph::ActionGraph;
use crate::sanitize::sanitizer::Sanitizer;
use crate::sensitive::classifier::SensitivityClassifier;

// ============================================================================
// Per-stage timing of the graph pipeline
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub startup: Duration,
    pub navigation: Duration,
    pub extraction: Duration,
    pub sanitization: Duration,
    pub action_generation: Duration,
    pub classification: Duration,
    pub total: Duration,
}

/// One measured pipeline run against one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub url: String,
    pub run: usize,
    pub timings: StageTimings,
    pub elements_count: usize,
    pub actions_count: usize,
}

/// Averages over the successful runs of one URL. Times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlSummary {
    pub url: String,
    pub runs: usize,
    pub avg_total_time: f64,
    pub avg_startup_time: f64,
    pub avg_navigation_time: f64,
    pub avg_js_extraction_time: f64,
    pub avg_sanitization_time: f64,
    pub avg_action_generation_time: f64,
    pub avg_classification_time: f64,
    pub avg_elements_count: usize,
    pub avg_actions_count: usize,
}

/// Run the pipeline stage by stage on an open driver, timing each stage.
/// `startup` is whatever the caller spent opening the driver.
pub fn timed_run<D: PageDriver + ?Sized>(
    driver: &mut D,
    url: &str,
    run: usize,
    startup: Duration,
    classifier: &SensitivityClassifier,
) -> Result<(ActionGraph, RunMetrics), GraphError> {
    let generation = |source| GraphError::Generation {
        url: url.to_string(),
        source,
    };
    let mut timings = StageTimings {
        startup,
        ..StageTimings::default()
    };

    let t0 = Instant::now();
    driver.navigate(url).map_err(generation)?;
    timings.navigation = t0.elapsed();

    let t1 = Instant::now();
    let analysis = driver
        .extract()
        .map_err(generation)?
        .map(PageAnalysis::from_extraction)
        .unwrap_or_default();
    timings.extraction = t1.elapsed();

    let t2 = Instant::now();
    let mut sanitizer = Sanitizer::new();
    let (nodes, interactive, metadata) = analysis.into_parts(&mut sanitizer);
    timings.sanitization = t2.elapsed();

    let t3 = Instant::now();
    let edges = infer_actions(&interactive);
    timings.action_generation = t3.elapsed();

    let t4 = Instant::now();
    let graph = classifier.classify(&ActionGraph {
        url: url.to_string(),
        nodes,
        edges,
        metadata,
    });
    timings.classification = t4.elapsed();

    timings.total = startup + t0.elapsed();

    let metrics = RunMetrics {
        url: url.to_string(),
        run,
        timings,
        elements_count: graph.element_count(),
        actions_count: graph.edges.len(),
    };
    Ok((graph, metrics))
}

/// Measure `runs` fresh-session runs of one URL. Failed runs are logged
/// and skipped.
pub fn measure_url(config: &BrowserConfig, classifier: &SensitivityClassifier, url: &str, runs: usize) -> Vec<RunMetrics> {
    let mut results = Vec::new();
    for run in 1..=runs {
        let started = Instant::now();
        let mut session = match BrowserSession::launch(config) {
            Ok(session) => session,
            Err(e) => {
                warn!("{} (run {}/{}): {}", url, run, runs, e);
                continue;
            }
        };
        let startup = started.elapsed();

        match timed_run(&mut session, url, run, startup, classifier) {
            Ok((_, metrics)) => {
                info!("run {}/{} completed for {}", run, runs, url);
                results.push(metrics);
            }
            Err(e) => warn!("{} (run {}/{}): {}", url, run, runs, e),
        }
        session.quit();
    }
    results
}

/// Measure every URL concurrently; one summary per URL with at least one
/// successful run, in input order.
pub fn measure_all(config: &BrowserConfig, classifier: &SensitivityClassifier, urls: &[String], runs: usize) -> Vec<UrlSummary> {
    thread::scope(|scope| {
        let handles: Vec<_> = urls
            .iter()
            .map(|url| scope.spawn(move || summarize(url, &measure_url(config, classifier, url, runs))))
            .collect();

        handles
            .into_iter()
            .filter_map(|h| h.join().ok().flatten())
            .collect()
    })
}

pub fn summarize(url: &str, runs: &[RunMetrics]) -> Option<UrlSummary> {
    if runs.is_empty() {
        return None;
    }
    let n = runs.len() as f64;
    let avg = |stage: fn(&StageTimings) -> Duration| {
        runs.iter().map(|r| stage(&r.timings).as_secs_f64()).sum::<f64>() / n
    };

    Some(UrlSummary {
        url: url.to_string(),
        runs: runs.len(),
        avg_total_time: avg(|t| t.total),
        avg_startup_time: avg(|t| t.startup),
        avg_navigation_time: avg(|t| t.navigation),
        avg_js_extraction_time: avg(|t| t.extraction),
        avg_sanitization_time: avg(|t| t.sanitization),
        avg_action_generation_time: avg(|t| t.action_generation),
        avg_classification_time: avg(|t| t.classification),
        avg_elements_count: runs.iter().map(|r| r.elements_count).sum::<usize>() / runs.len(),
        avg_actions_count: runs.iter().map(|r| r.actions_count).sum::<usize>() / runs.len(),
    })
}

/// Fixed-width summary table for the terminal.
pub fn format_summary_table(summaries: &[UrlSummary]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:40} {:>8} {:>8} {:>8}\n",
        "URL", "Total(s)", "Elements", "Actions"
    ));
    out.push_str(&format!("{}\n", "-".repeat(67)));
    for s in summaries {
        let url: String = s.url.chars().take(40).collect();
        out.push_str(&format!(
            "{:40} {:8.2} {:8} {:8}\n",
            url, s.avg_total_time, s.avg_elements_count, s.avg_actions_count
        ));
    }
    out
}
