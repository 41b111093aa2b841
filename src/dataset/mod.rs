//! Dataset module for emotion image data handling
//!
//! This module provides functionality for:
//! - Discovering labeled images in a class-per-directory tree
//! - Decoding, resizing and rescaling images to 48x48 grayscale
//! - On-the-fly geometric augmentation for training robustness
//! - An endless, restartable stream of shuffled training batches
//!
//! ## Directory Convention
//!
//! The loader expects one subdirectory per class under the dataset root;
//! class labels are assigned alphabetically by directory name. The class
//! count is validated against the model's output width when the dataset
//! is constructed, so a mislaid directory fails at startup rather than at
//! the first training step.

pub mod augmentation;
pub mod batcher;
pub mod loader;
pub mod stream;

use std::path::PathBuf;

use thiserror::Error;

// Re-export main types for convenience
pub use augmentation::{AugmentationConfig, Augmenter};
pub use batcher::{EmotionBatch, EmotionBatcher, EmotionImageDataset, EmotionItem};
pub use loader::{DatasetStats, EmotionDataset, ImageSample};
pub use stream::BatchStream;

/// Errors raised while constructing a dataset from disk
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Dataset root directory does not exist
    #[error("dataset directory does not exist: {0}")]
    MissingRoot(PathBuf),

    /// No image files were found under any class directory
    #[error("no images found under dataset directory: {0}")]
    Empty(PathBuf),

    /// The number of class directories does not match the classifier width
    #[error("found {found} class directories under {root}, expected {expected}")]
    ClassCountMismatch {
        root: PathBuf,
        found: usize,
        expected: usize,
    },

    /// IO error while scanning the directory tree
    #[error("failed to scan dataset directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Image file extensions accepted by the loader
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
