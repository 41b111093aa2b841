//! Training module
//!
//! This module provides:
//! - The epoch/step training loop with Adam and categorical cross-entropy
//! - Per-epoch history of training and validation metrics

pub mod history;
pub mod trainer;

// Re-export main types for convenience
pub use history::{EpochRecord, TrainingHistory};
pub use trainer::{accuracy, categorical_cross_entropy, Trainer, TrainingConfig};

/// Default number of training epochs
pub const DEFAULT_EPOCHS: usize = 50;

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Default learning rate
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
