use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use log::warn;

use crate::model::graph::ActionGraph;

/// Appends one compact JSON graph per line. Safe to share between batch
/// workers; write failures are logged and otherwise ignored.
pub struct GraphWriter {
    file: Option<Mutex<std::fs::File>>,
}

impl GraphWriter {
    pub fn new(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!("could not open output file '{}': {}", path.display(), e);
                Self { file: None }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn write(&self, graph: &ActionGraph) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return,
        };

        let json = match serde_json::to_string(graph) {
            Ok(j) => j,
            Err(e) => {
                warn!("failed to serialize graph for {}: {}", graph.url, e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!("graph writer lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!("failed to write graph for {}: {}", graph.url, e);
        }
    }
}
