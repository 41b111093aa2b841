//! Burn Dataset Integration for Emotion Images
//!
//! Implements Burn's `Dataset` trait for lazy on-demand image decoding and
//! a `Batcher` that assembles tensors from decoded items. Images reach the
//! model as `[batch, 1, 48, 48]` float tensors rescaled to [0, 1]; labels
//! travel as one-hot rows of width [`crate::NUM_CLASSES`].

use std::path::PathBuf;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::imageops::FilterType;
use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::{IMAGE_SIZE, NUM_CLASSES};

/// A single decoded emotion image ready for batching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmotionItem {
    /// Grayscale pixel data, row-major, rescaled to [0, 1]
    pub pixels: Vec<f32>,
    /// Class label index
    pub label: usize,
    /// Image path (for debugging/logging)
    pub path: String,
}

impl EmotionItem {
    /// Decode an image from disk, resize to the target size and rescale.
    pub fn from_path(path: &PathBuf, label: usize, image_size: usize) -> anyhow::Result<Self> {
        let gray = ImageReader::open(path)?
            .decode()?
            .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
            .to_luma8();

        let pixels: Vec<f32> = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

        Ok(Self {
            pixels,
            label,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-loaded pixel data
    pub fn from_data(pixels: Vec<f32>, label: usize, path: String) -> Self {
        Self { pixels, label, path }
    }
}

/// Emotion image dataset implementing Burn's `Dataset` trait
///
/// Images are decoded lazily on each `get` so an epoch never holds more
/// than one batch of pixel data in memory.
#[derive(Debug, Clone)]
pub struct EmotionImageDataset {
    /// List of (image_path, label) pairs
    samples: Vec<(PathBuf, usize)>,
    /// Target image size
    image_size: usize,
}

impl EmotionImageDataset {
    /// Create a new dataset from a list of samples
    pub fn new(samples: Vec<(PathBuf, usize)>, image_size: usize) -> Self {
        Self {
            samples,
            image_size,
        }
    }

    /// Create from an [`super::loader::EmotionDataset`] directory scan
    pub fn from_loader(loader: &super::loader::EmotionDataset) -> Self {
        let samples: Vec<_> = loader
            .samples
            .iter()
            .map(|s| (s.path.clone(), s.label))
            .collect();

        Self::new(samples, IMAGE_SIZE)
    }
}

impl Dataset<EmotionItem> for EmotionImageDataset {
    fn get(&self, index: usize) -> Option<EmotionItem> {
        let (path, label) = self.samples.get(index)?;
        EmotionItem::from_path(path, *label, self.image_size).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of emotion images for training or evaluation
#[derive(Clone, Debug)]
pub struct EmotionBatch<B: Backend> {
    /// Batch of images with shape [batch_size, 1, height, width]
    pub images: Tensor<B, 4>,
    /// One-hot labels with shape [batch_size, num_classes]
    pub labels: Tensor<B, 2>,
}

impl<B: Backend> EmotionBatch<B> {
    /// Label indices recovered from the one-hot rows
    pub fn target_indices(&self) -> Tensor<B, 1, Int> {
        self.labels.clone().argmax(1).squeeze::<1>(1)
    }
}

/// Batcher assembling [`EmotionBatch`]es from decoded items
#[derive(Clone, Debug)]
pub struct EmotionBatcher {
    image_size: usize,
    num_classes: usize,
}

impl EmotionBatcher {
    /// Create a new batcher with the crate defaults
    pub fn new() -> Self {
        Self {
            image_size: IMAGE_SIZE,
            num_classes: NUM_CLASSES,
        }
    }
}

impl Default for EmotionBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Batcher<B, EmotionItem, EmotionBatch<B>> for EmotionBatcher {
    fn batch(&self, items: Vec<EmotionItem>, device: &B::Device) -> EmotionBatch<B> {
        let batch_size = items.len();
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.pixels.clone()).collect();

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, 1, height, width]),
            device,
        );

        // One-hot encode: a single 1.0 at the label index per row
        let mut labels_data = vec![0.0f32; batch_size * self.num_classes];
        for (row, item) in items.iter().enumerate() {
            labels_data[row * self.num_classes + item.label] = 1.0;
        }
        let labels = Tensor::<B, 2>::from_floats(
            TensorData::new(labels_data, [batch_size, self.num_classes]),
            device,
        );

        EmotionBatch { images, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;

    fn synthetic_items(count: usize) -> Vec<EmotionItem> {
        (0..count)
            .map(|i| {
                EmotionItem::from_data(
                    vec![(i as f32 / count as f32); IMAGE_SIZE * IMAGE_SIZE],
                    i % NUM_CLASSES,
                    format!("synthetic_{}.png", i),
                )
            })
            .collect()
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = EmotionBatcher::new();
        let batch: EmotionBatch<DefaultBackend> = batcher.batch(synthetic_items(8), &device);

        assert_eq!(batch.images.dims(), [8, 1, IMAGE_SIZE, IMAGE_SIZE]);
        assert_eq!(batch.labels.dims(), [8, NUM_CLASSES]);
    }

    #[test]
    fn test_label_rows_sum_to_one() {
        let device = Default::default();
        let batcher = EmotionBatcher::new();
        let batch: EmotionBatch<DefaultBackend> = batcher.batch(synthetic_items(6), &device);

        let sums: Vec<f32> = batch
            .labels
            .sum_dim(1)
            .into_data()
            .to_vec()
            .unwrap();

        assert_eq!(sums.len(), 6);
        for sum in sums {
            assert_eq!(sum, 1.0);
        }
    }

    #[test]
    fn test_target_indices_match_labels() {
        let device = Default::default();
        let batcher = EmotionBatcher::new();
        let items = synthetic_items(6);
        let expected: Vec<i64> = items.iter().map(|i| i.label as i64).collect();

        let batch: EmotionBatch<DefaultBackend> = batcher.batch(items, &device);
        let targets: Vec<i64> = batch.target_indices().into_data().to_vec().unwrap();

        assert_eq!(targets, expected);
    }

    #[test]
    fn test_item_from_data() {
        let item = EmotionItem::from_data(vec![0.5; IMAGE_SIZE * IMAGE_SIZE], 2, "x.png".into());
        assert_eq!(item.label, 2);
        assert_eq!(item.pixels.len(), IMAGE_SIZE * IMAGE_SIZE);
    }
}
