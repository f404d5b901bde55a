use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::{info, warn};
use serde_json::Value;

use crate::analyzer::page_analyzer::{PageAnalysis, analyze_page};
use crate::browser::driver::PageDriver;
use crate::browser::session::{BrowserConfig, BrowserSession};
use crate::error::GraphError;
use crate::inference::actions::infer_actions;
use crate::model::graph::ActionGraph;
use crate::sanitize::sanitizer::Sanitizer;
use crate::sensitive::classifier::SensitivityClassifier;

// ============================================================================
// GraphGenerator — entry point: url in, classified ActionGraph out
// ============================================================================

/// Owns at most one browser session and turns URLs into classified graphs.
///
/// The session is opened explicitly (`open`, `with_driver`) or for the
/// span of a closure (`scoped`); it is released by `close`, on a fatal
/// driver error, and on drop. Not shared across threads: concurrent
/// callers each need their own generator.
pub struct GraphGenerator {
    config: BrowserConfig,
    classifier: SensitivityClassifier,
    driver: Option<Box<dyn PageDriver>>,
}

impl GraphGenerator {
    pub fn new(config: BrowserConfig, classifier: SensitivityClassifier) -> Self {
        Self {
            config,
            classifier,
            driver: None,
        }
    }

    /// Generator over an already-open driver.
    pub fn with_driver(driver: Box<dyn PageDriver>, classifier: SensitivityClassifier) -> Self {
        Self {
            config: BrowserConfig::default(),
            classifier,
            driver: Some(driver),
        }
    }

    /// Launch a browser session. No-op when one is already open.
    pub fn open(&mut self) -> Result<(), GraphError> {
        if self.driver.is_none() {
            let session = BrowserSession::launch(&self.config).map_err(GraphError::Launch)?;
            self.driver = Some(Box::new(session));
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    pub fn close(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.close();
        }
    }

    /// Open a session, run `f`, and close the session whatever `f` returns.
    pub fn scoped<T>(
        config: &BrowserConfig,
        classifier: SensitivityClassifier,
        f: impl FnOnce(&mut GraphGenerator) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let mut generator = GraphGenerator::new(config.clone(), classifier);
        generator.open()?;
        let result = f(&mut generator);
        generator.close();
        result
    }

    /// Session-per-call mode.
    pub fn generate_once(
        config: &BrowserConfig,
        classifier: SensitivityClassifier,
        url: &str,
    ) -> Result<ActionGraph, GraphError> {
        Self::scoped(config, classifier, |generator| generator.generate_graph(url))
    }

    /// Build the classified action graph for `url`.
    pub fn generate_graph(&mut self, url: &str) -> Result<ActionGraph, GraphError> {
        let driver = self.driver.as_mut().ok_or(GraphError::NoSession)?;

        let analysis = match analyze_page(driver, url) {
            Ok(analysis) => analysis,
            Err(source) => {
                if source.is_fatal() {
                    warn!("browser driver unusable after error, closing session: {}", source);
                    self.close();
                }
                return Err(GraphError::Generation {
                    url: url.to_string(),
                    source,
                });
            }
        };

        Ok(build_graph(url, analysis, &self.classifier))
    }
}

impl Drop for GraphGenerator {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pure assembly: sanitize nodes, infer edges, classify.
pub fn build_graph(url: &str, analysis: PageAnalysis, classifier: &SensitivityClassifier) -> ActionGraph {
    let mut sanitizer = Sanitizer::new();
    let (nodes, interactive, metadata) = analysis.into_parts(&mut sanitizer);
    let edges = infer_actions(&interactive);

    let graph = ActionGraph {
        url: url.to_string(),
        nodes,
        edges,
        metadata,
    };
    let classified = classifier.classify(&graph);

    let dangling = classified.dangling_edges().len();
    if dangling > 0 {
        warn!("{}: {} action(s) reference elements missing from the graph", url, dangling);
    }
    info!(
        "{}: {} elements ({} dropped), {} actions, {} sensitive elements",
        url,
        sanitizer.accepted(),
        sanitizer.dropped(),
        classified.edges.len(),
        classified.sensitive_node_count()
    );

    classified
}

/// Build a graph from a saved extraction record, without a browser.
pub fn graph_from_file(path: &Path, url: &str, classifier: &SensitivityClassifier) -> Result<ActionGraph, GraphError> {
    let content = std::fs::read_to_string(path).map_err(|e| GraphError::Input {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: Value = serde_json::from_str(&content).map_err(|e| GraphError::Parse {
        context: path.display().to_string(),
        source: e,
    })?;
    Ok(build_graph(url, PageAnalysis::from_extraction(raw), classifier))
}

/// Generate graphs for many URLs with up to `jobs` workers, each holding
/// its own browser session. Results come back in input order.
pub fn generate_batch(
    config: &BrowserConfig,
    classifier: &SensitivityClassifier,
    urls: &[String],
    jobs: usize,
) -> Vec<Result<ActionGraph, GraphError>> {
    let next = AtomicUsize::new(0);

    // Every index is claimed by exactly one worker, so each URL yields
    // exactly one result.
    let mut indexed: Vec<(usize, Result<ActionGraph, GraphError>)> = thread::scope(|scope| {
        let mut workers = Vec::new();
        for _ in 0..jobs.clamp(1, urls.len().max(1)) {
            workers.push(scope.spawn(|| {
                let mut generator = GraphGenerator::new(config.clone(), classifier.clone());
                let mut done = Vec::new();
                loop {
                    let idx = next.fetch_add(1, Ordering::SeqCst);
                    let Some(url) = urls.get(idx) else { break };
                    done.push((idx, generator.open().and_then(|_| generator.generate_graph(url))));
                }
                done
            }));
        }

        workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, result)| result).collect()
}
