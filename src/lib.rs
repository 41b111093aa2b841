//! # Emotion CNN
//!
//! A Rust library for emotion recognition from grayscale facial images
//! using the Burn framework.
//!
//! The pipeline is deliberately small: a directory-based image loader with
//! on-the-fly augmentation, a fixed convolutional architecture, a custom
//! training loop with per-epoch validation, single-file model persistence,
//! a one-batch evaluation spot check, and SVG charts of the training run.
//!
//! ## Modules
//!
//! - `dataset`: directory discovery, image decoding, augmentation, batching
//! - `model`: CNN architecture built with Burn, plus save/load helpers
//! - `training`: training loop and per-epoch history
//! - `inference`: evaluation of a persisted model
//! - `utils`: logging and chart rendering
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use emotion_cnn::dataset::EmotionDataset;
//! use emotion_cnn::model::cnn::EmotionClassifierConfig;
//!
//! let dataset = EmotionDataset::new("data/train", emotion_cnn::NUM_CLASSES)?;
//! let config = EmotionClassifierConfig::new();
//! // ... training and evaluation
//! ```

pub mod backend;
pub mod dataset;
pub mod inference;
pub mod model;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use dataset::augmentation::{AugmentationConfig, Augmenter};
pub use dataset::batcher::{EmotionBatch, EmotionBatcher, EmotionItem};
pub use dataset::loader::{DatasetStats, EmotionDataset};
pub use dataset::stream::BatchStream;
pub use dataset::{DatasetError, EmotionImageDataset};
pub use inference::evaluator::{spot_check, EvaluationReport};
pub use model::cnn::{EmotionClassifier, EmotionClassifierConfig};
pub use model::persist::{load_model, model_file_name, save_model};
pub use training::history::{EpochRecord, TrainingHistory};
pub use training::trainer::{Trainer, TrainingConfig};

/// Number of emotion classes
pub const NUM_CLASSES: usize = 3;

/// Input image size (images are resized to IMAGE_SIZE x IMAGE_SIZE grayscale)
pub const IMAGE_SIZE: usize = 48;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
