//! Emotion Dataset Loader
//!
//! Scans a class-per-directory tree of facial images and exposes the
//! samples with their labels. Images themselves are decoded lazily by
//! [`super::batcher::EmotionImageDataset`]; this type only walks the
//! filesystem and fixes the class ordering.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{DatasetError, IMAGE_EXTENSIONS};

/// A single image sample with its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index
    pub label: usize,
    /// Class name (the subdirectory the image was found in)
    pub class_name: String,
}

/// Emotion dataset backed by a directory tree
///
/// The directory is expected to be structured as:
/// ```text
/// root_dir/
/// ├── angry/
/// │   ├── image1.png
/// │   └── image2.png
/// ├── happy/
/// │   └── ...
/// └── sad/
///     └── ...
/// ```
#[derive(Debug, Clone)]
pub struct EmotionDataset {
    /// Root directory of the dataset
    pub root_dir: PathBuf,
    /// All samples in the dataset
    pub samples: Vec<ImageSample>,
    /// Class names in label order (alphabetical by directory name)
    pub class_names: Vec<String>,
}

impl EmotionDataset {
    /// Scan a dataset directory, assigning labels alphabetically.
    ///
    /// Fails at construction when the root is missing, contains no images,
    /// or the number of class directories differs from `expected_classes`
    /// (the classifier's output width).
    pub fn new<P: AsRef<Path>>(
        root_dir: P,
        expected_classes: usize,
    ) -> Result<Self, DatasetError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("Loading emotion dataset from: {:?}", root_dir);

        if !root_dir.exists() {
            return Err(DatasetError::MissingRoot(root_dir));
        }

        let mut class_names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&root_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    class_names.push(name.to_string());
                }
            }
        }
        class_names.sort();

        if class_names.len() != expected_classes {
            return Err(DatasetError::ClassCountMismatch {
                root: root_dir,
                found: class_names.len(),
                expected: expected_classes,
            });
        }

        let mut samples = Vec::new();
        for (label, class_name) in class_names.iter().enumerate() {
            let class_dir = root_dir.join(class_name);

            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();

                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(ImageSample {
                            path,
                            label,
                            class_name: class_name.clone(),
                        });
                    }
                }
            }

            debug!("Class '{}' assigned label {}", class_name, label);
        }

        if samples.is_empty() {
            return Err(DatasetError::Empty(root_dir));
        }

        info!(
            "Loaded {} samples across {} classes",
            samples.len(),
            class_names.len()
        );

        Ok(Self {
            root_dir,
            samples,
            class_names,
        })
    }

    /// Number of samples in the dataset
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Class name for a label index
    pub fn class_name(&self, label: usize) -> Option<&str> {
        self.class_names.get(label).map(|s| s.as_str())
    }

    /// Statistics about the dataset
    pub fn stats(&self) -> DatasetStats {
        let mut class_counts = vec![0usize; self.num_classes()];
        for sample in &self.samples {
            class_counts[sample.label] += 1;
        }

        DatasetStats {
            total_samples: self.samples.len(),
            num_classes: self.num_classes(),
            class_counts,
            class_names: self.class_names.clone(),
        }
    }
}

/// Statistics about the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub num_classes: usize,
    pub class_counts: Vec<usize>,
    pub class_names: Vec<String>,
}

impl DatasetStats {
    /// Print statistics to console
    pub fn print(&self) {
        println!("\nDataset Statistics:");
        println!("  Total samples: {}", self.total_samples);
        println!("  Number of classes: {}", self.num_classes);
        println!("\n  Samples per class:");

        for (idx, name) in self.class_names.iter().enumerate() {
            let count = self.class_counts[idx];
            let bar_len = (count as f32 / self.total_samples as f32 * 40.0) as usize;
            let bar: String = "█".repeat(bar_len);
            println!("    {:3}. {:16} {:5} {}", idx, name, count, bar);
        }
    }
}
