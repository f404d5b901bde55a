use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::browser::session::BrowserConfig;
use crate::sensitive::classifier::SensitivityClassifier;
use crate::sensitive::patterns::SensitivePatterns;

pub const DEFAULT_CONFIG_PATH: &str = "action-graph.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "action-graph",
    version,
    about = "Build classified action graphs of web pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: action-graph.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    pub headed: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate action graphs as JSON
    Graph {
        /// URL to analyze (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Append one JSON graph per line to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Concurrent browser sessions for multiple URLs
        #[arg(long, default_value_t = 1)]
        jobs: usize,

        /// Pretty-print JSON written to stdout
        #[arg(long)]
        pretty: bool,
    },

    /// Generate one graph and print a readable report
    Inspect {
        #[arg(long)]
        url: String,
    },

    /// Build a graph from a saved extraction record, without a browser
    Offline {
        /// Extraction JSON (page record or bare element array)
        #[arg(long)]
        input: String,

        /// URL recorded in the graph
        #[arg(long, default_value = "about:blank")]
        url: String,

        #[arg(long)]
        pretty: bool,
    },

    /// Measure pipeline stage timings and write a CSV summary
    Perf {
        /// URL to measure (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Runs per URL (default from config, else 3)
        #[arg(long)]
        runs: Option<usize>,

        /// Base name of the CSV file (default from config, else perf_results)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `action-graph.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
    #[serde(default)]
    pub perf: PerfConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Extra trigger substrings per category, added to the built-in table.
    #[serde(default)]
    pub extra_patterns: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfConfig {
    #[serde(default = "default_runs")]
    pub runs: usize,

    #[serde(default = "default_perf_output")]
    pub output: String,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            output: default_perf_output(),
        }
    }
}

// Serde default helpers
fn default_runs() -> usize { 3 }
fn default_perf_output() -> String { "perf_results".to_string() }

impl AppConfig {
    pub fn classifier(&self) -> SensitivityClassifier {
        SensitivityClassifier::new(SensitivePatterns::with_extra(&self.sensitivity.extra_patterns))
    }

    /// Browser settings with CLI overrides applied.
    pub fn browser_for(&self, cli: &Cli) -> BrowserConfig {
        let mut browser = self.browser.clone();
        if cli.headed {
            browser.headless = false;
        }
        browser
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Log filter for a `-v` count; `RUST_LOG` still takes precedence.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
