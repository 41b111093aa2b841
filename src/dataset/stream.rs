//! Endless Batch Stream
//!
//! Produces an infinite, restartable sequence of shuffled batches from an
//! on-disk dataset, mirroring a framework data generator: each pass over
//! the data is freshly shuffled, training batches are augmented on yield,
//! and the tail that does not fill a whole batch is dropped when the next
//! pass begins.

use anyhow::{bail, Result};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::augmentation::Augmenter;
use super::batcher::{EmotionBatch, EmotionBatcher, EmotionImageDataset, EmotionItem};

/// An infinite stream of shuffled [`EmotionBatch`]es
pub struct BatchStream<B: Backend> {
    dataset: EmotionImageDataset,
    batcher: EmotionBatcher,
    augmenter: Option<Augmenter>,
    device: B::Device,
    batch_size: usize,
    indices: Vec<usize>,
    cursor: usize,
    rng: ChaCha8Rng,
}

impl<B: Backend> BatchStream<B> {
    /// Create a stream over `dataset`.
    ///
    /// Pass an [`Augmenter`] for the training variant; `None` yields
    /// rescaled images untouched (the validation variant).
    pub fn new(
        dataset: EmotionImageDataset,
        batch_size: usize,
        augmenter: Option<Augmenter>,
        seed: u64,
        device: B::Device,
    ) -> Self {
        let mut stream = Self {
            indices: (0..dataset.len()).collect(),
            dataset,
            batcher: EmotionBatcher::new(),
            augmenter,
            device,
            batch_size,
            cursor: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        stream.reset();
        stream
    }

    /// Number of whole batches one pass over the data yields
    pub fn steps_per_epoch(&self) -> usize {
        self.dataset.len() / self.batch_size
    }

    /// Number of samples in the underlying dataset
    pub fn num_samples(&self) -> usize {
        self.dataset.len()
    }

    /// Reshuffle and restart the current pass
    pub fn reset(&mut self) {
        self.indices.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Pull the next batch, starting a freshly shuffled pass whenever
    /// fewer than `batch_size` samples remain in the current one.
    pub fn next_batch(&mut self) -> Result<EmotionBatch<B>> {
        if self.batch_size == 0 || self.dataset.len() < self.batch_size {
            bail!(
                "dataset with {} samples cannot fill a batch of {}",
                self.dataset.len(),
                self.batch_size
            );
        }

        if self.cursor + self.batch_size > self.indices.len() {
            self.reset();
        }

        let batch_indices = &self.indices[self.cursor..self.cursor + self.batch_size];
        self.cursor += self.batch_size;

        let mut items = Vec::with_capacity(self.batch_size);
        for &idx in batch_indices {
            let Some(mut item) = self.dataset.get(idx) else {
                bail!("failed to load image at dataset index {}", idx);
            };
            if let Some(augmenter) = &self.augmenter {
                item = EmotionItem::from_data(
                    augmenter.augment(&item.pixels, &mut self.rng),
                    item.label,
                    item.path,
                );
            }
            items.push(item);
        }

        Ok(self.batcher.batch(items, &self.device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;
    use crate::{IMAGE_SIZE, NUM_CLASSES};
    use image::GrayImage;
    use tempfile::TempDir;

    fn synthetic_dataset(tmp: &TempDir, per_class: usize) -> EmotionImageDataset {
        for (label, class) in ["angry", "happy", "sad"].iter().enumerate() {
            let dir = tmp.path().join(class);
            std::fs::create_dir_all(&dir).unwrap();
            for i in 0..per_class {
                let img = GrayImage::from_fn(48, 48, |x, y| {
                    image::Luma([((x * y + label as u32 + i as u32) % 256) as u8])
                });
                img.save(dir.join(format!("{}.png", i))).unwrap();
            }
        }

        let loader = crate::dataset::loader::EmotionDataset::new(tmp.path(), NUM_CLASSES).unwrap();
        EmotionImageDataset::from_loader(&loader)
    }

    #[test]
    fn test_steps_per_epoch_floors() {
        let tmp = TempDir::new().unwrap();
        let dataset = synthetic_dataset(&tmp, 5); // 15 samples
        let stream: BatchStream<DefaultBackend> =
            BatchStream::new(dataset, 4, None, 42, Default::default());

        assert_eq!(stream.steps_per_epoch(), 3);
        assert_eq!(stream.num_samples(), 15);
    }

    #[test]
    fn test_batches_have_fixed_shape() {
        let tmp = TempDir::new().unwrap();
        let dataset = synthetic_dataset(&tmp, 4); // 12 samples
        let mut stream: BatchStream<DefaultBackend> =
            BatchStream::new(dataset, 4, None, 42, Default::default());

        // Pull more batches than one pass holds: the stream must keep
        // yielding full batches indefinitely.
        for _ in 0..7 {
            let batch = stream.next_batch().unwrap();
            assert_eq!(batch.images.dims(), [4, 1, IMAGE_SIZE, IMAGE_SIZE]);
            assert_eq!(batch.labels.dims(), [4, NUM_CLASSES]);
        }
    }

    #[test]
    fn test_augmented_batches_have_fixed_shape() {
        let tmp = TempDir::new().unwrap();
        let dataset = synthetic_dataset(&tmp, 2); // 6 samples
        let augmenter = Augmenter::with_defaults(IMAGE_SIZE);
        let mut stream: BatchStream<DefaultBackend> =
            BatchStream::new(dataset, 3, Some(augmenter), 7, Default::default());

        let batch = stream.next_batch().unwrap();
        assert_eq!(batch.images.dims(), [3, 1, IMAGE_SIZE, IMAGE_SIZE]);
    }

    #[test]
    fn test_batch_larger_than_dataset_fails() {
        let tmp = TempDir::new().unwrap();
        let dataset = synthetic_dataset(&tmp, 1); // 3 samples
        let mut stream: BatchStream<DefaultBackend> =
            BatchStream::new(dataset, 8, None, 42, Default::default());

        assert!(stream.next_batch().is_err());
    }

    #[test]
    fn test_reset_restarts_pass() {
        let tmp = TempDir::new().unwrap();
        let dataset = synthetic_dataset(&tmp, 4); // 12 samples
        let mut stream: BatchStream<DefaultBackend> =
            BatchStream::new(dataset, 4, None, 42, Default::default());

        stream.next_batch().unwrap();
        stream.reset();
        // A full pass is available again after reset.
        for _ in 0..stream.steps_per_epoch() {
            stream.next_batch().unwrap();
        }
    }
}
