//! Training History
//!
//! Append-only record of per-epoch metrics, built by the trainer and read
//! afterwards by the chart renderer. Serializable so a finished run can
//! be re-plotted without retraining.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Metrics for one completed epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Epoch number (1-indexed)
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Ordered per-epoch training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// When the run started
    pub generated_at: String,
    records: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            records: Vec::new(),
        }
    }

    /// Append the record for a finished epoch
    pub fn record(
        &mut self,
        epoch: usize,
        train_loss: f64,
        train_accuracy: f64,
        val_loss: f64,
        val_accuracy: f64,
    ) {
        self.records.push(EpochRecord {
            epoch,
            train_loss,
            train_accuracy,
            val_loss,
            val_accuracy,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    /// Best validation accuracy seen across the run
    pub fn best_val_accuracy(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.val_accuracy)
            .fold(None, |best, acc| match best {
                Some(b) if b >= acc => Some(b),
                _ => Some(acc),
            })
    }

    /// Write the history as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history to {:?}", path))
    }

    /// Read a history back from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history from {:?}", path))?;
        serde_json::from_str(&json).context("Failed to parse training history")
    }
}

impl Default for TrainingHistory {
    fn default() -> Self {
        Self::new()
    }
}
