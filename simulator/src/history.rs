//! Local history of completed simulations.

use rosistrat_types::{SimulationConfig, SimulationRun, SpinRecord, StrategyId};
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, warn};
use uuid::Uuid;

/// A completed run as kept in history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSimulation {
    pub id: String,
    pub strategy: StrategyId,
    pub starting_bankroll: f64,
    pub final_earnings: f64,
    pub final_portfolio: f64,
    pub total_spins: usize,
    /// Milliseconds since the unix epoch.
    pub timestamp: u64,
    pub settings: SimulationConfig,
    pub records: Vec<SpinRecord>,
}

impl SavedSimulation {
    pub fn from_run(run: &SimulationRun) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            strategy: run.strategy,
            starting_bankroll: run.config.starting_bankroll,
            final_earnings: run.final_earnings(),
            final_portfolio: run.final_portfolio(),
            total_spins: run.len(),
            timestamp,
            settings: run.config.clone(),
            records: run.records.clone(),
        }
    }

    /// The entry without its per-spin records.
    pub fn headline(&self) -> Self {
        Self {
            records: Vec::new(),
            ..self.clone()
        }
    }
}

/// Saved simulations, newest first, optionally mirrored to a JSON file.
pub struct History {
    path: Option<PathBuf>,
    limit: usize,
    entries: Vec<SavedSimulation>,
}

impl History {
    pub fn in_memory(limit: usize) -> Self {
        Self {
            path: None,
            limit,
            entries: Vec::new(),
        }
    }

    /// Opens the history file, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> io::Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        let mut history = Self {
            path: Some(path),
            limit,
            entries,
        };
        history.entries.truncate(limit);
        debug!(entries = history.entries.len(), "loaded history");
        Ok(history)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn push(&mut self, entry: SavedSimulation) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
        self.persist();
    }

    pub fn get(&self, id: &str) -> Option<&SavedSimulation> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn list(&self) -> Vec<SavedSimulation> {
        self.entries.iter().map(SavedSimulation::headline).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    // A failed write keeps the in-memory copy; the next write retries.
    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_vec(&self.entries)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            .and_then(|bytes| std::fs::write(path, bytes));
        if let Err(e) = result {
            warn!("Failed to write history to {}: {}", path.display(), e);
        }
    }
}
