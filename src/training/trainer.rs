//! Training Loop
//!
//! A custom epoch/step loop over the batch streams using Burn's API
//! directly: forward pass, categorical cross-entropy against one-hot
//! labels, backward pass, Adam update. After each epoch the model is
//! evaluated on the validation stream without gradient tracking and one
//! history record is appended. There is no mid-run checkpointing; the
//! model is persisted once, after the final epoch.

use anyhow::{bail, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion, Tensor,
    },
};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::history::TrainingHistory;
use crate::dataset::stream::BatchStream;
use crate::model::cnn::EmotionClassifier;

/// Training hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,
    /// Batch size for training and validation
    pub batch_size: usize,
    /// Learning rate for the Adam optimizer
    pub learning_rate: f64,
    /// Random seed for shuffling and augmentation
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: super::DEFAULT_EPOCHS,
            batch_size: super::DEFAULT_BATCH_SIZE,
            learning_rate: super::DEFAULT_LEARNING_RATE,
            seed: 42,
        }
    }
}

/// Categorical cross-entropy of logits against one-hot target rows.
pub fn categorical_cross_entropy<B: Backend>(
    logits: Tensor<B, 2>,
    targets_one_hot: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_probs = burn::tensor::activation::log_softmax(logits, 1);
    let nll = (log_probs * targets_one_hot).sum_dim(1).neg();
    nll.mean()
}

/// Fraction of rows where the arg-max of the logits matches the arg-max
/// of the one-hot target.
pub fn accuracy<B: Backend>(logits: Tensor<B, 2>, targets_one_hot: Tensor<B, 2>) -> f64 {
    let total = targets_one_hot.dims()[0];
    if total == 0 {
        return 0.0;
    }

    let predictions = logits.argmax(1).squeeze::<1>(1);
    let targets = targets_one_hot.argmax(1).squeeze::<1>(1);
    let correct: i64 = predictions.equal(targets).int().sum().into_scalar().elem();

    correct as f64 / total as f64
}

/// Trainer for the emotion classifier
pub struct Trainer<B: AutodiffBackend> {
    model: EmotionClassifier<B>,
    config: TrainingConfig,
    history: TrainingHistory,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(model: EmotionClassifier<B>, config: TrainingConfig) -> Self {
        Self {
            model,
            config,
            history: TrainingHistory::new(),
        }
    }

    /// Run the full training schedule.
    ///
    /// Each epoch performs `train.steps_per_epoch()` gradient steps and
    /// `val.steps_per_epoch()` evaluation steps, then records one history
    /// entry.
    pub fn fit(
        &mut self,
        train: &mut BatchStream<B>,
        val: &mut BatchStream<B::InnerBackend>,
    ) -> Result<()> {
        let steps_per_epoch = train.steps_per_epoch();
        let val_steps = val.steps_per_epoch();

        if steps_per_epoch == 0 {
            bail!(
                "not enough training data ({} samples) for batch size {}",
                train.num_samples(),
                self.config.batch_size
            );
        }

        info!(
            "Training for {} epochs, {} steps/epoch, {} validation steps",
            self.config.epochs, steps_per_epoch, val_steps
        );

        let mut optimizer = AdamConfig::new().init();

        for epoch in 1..=self.config.epochs {
            println!(
                "{}",
                format!("Epoch {}/{}", epoch, self.config.epochs)
                    .yellow()
                    .bold()
            );

            let mut epoch_loss = 0.0f64;
            let mut epoch_accuracy = 0.0f64;

            for step in 0..steps_per_epoch {
                let batch = train.next_batch()?;

                let logits = self.model.forward(batch.images);
                let loss = categorical_cross_entropy(logits.clone(), batch.labels.clone());

                let loss_value: f64 = loss.clone().into_scalar().elem();
                epoch_loss += loss_value;
                epoch_accuracy += accuracy(logits, batch.labels);

                let grads = GradientsParams::from_grads(loss.backward(), &self.model);
                self.model =
                    optimizer.step(self.config.learning_rate, self.model.clone(), grads);

                if (step + 1) % 10 == 0 || step == steps_per_epoch - 1 {
                    info!(
                        "  step {:>4}/{}: loss = {:.4}",
                        step + 1,
                        steps_per_epoch,
                        loss_value
                    );
                }
            }

            let train_loss = epoch_loss / steps_per_epoch as f64;
            let train_accuracy = epoch_accuracy / steps_per_epoch as f64;

            let (val_loss, val_accuracy) = self.validate(val)?;

            self.history
                .record(epoch, train_loss, train_accuracy, val_loss, val_accuracy);

            println!(
                "  {} loss: {:.4} | acc: {:.2}% | val loss: {:.4} | val acc: {:.2}%",
                "→".cyan(),
                train_loss,
                train_accuracy * 100.0,
                val_loss,
                val_accuracy * 100.0
            );
        }

        if let Some(best) = self.history.best_val_accuracy() {
            info!("Training complete, best validation accuracy {:.2}%", best * 100.0);
        }

        Ok(())
    }

    /// Evaluate on the validation stream without updating parameters.
    fn validate(&self, val: &mut BatchStream<B::InnerBackend>) -> Result<(f64, f64)> {
        let steps = val.steps_per_epoch();
        if steps == 0 {
            return Ok((0.0, 0.0));
        }

        let model_valid = self.model.valid();
        let mut total_loss = 0.0f64;
        let mut total_accuracy = 0.0f64;

        for _ in 0..steps {
            let batch = val.next_batch()?;
            let logits = model_valid.forward(batch.images);

            let loss = categorical_cross_entropy(logits.clone(), batch.labels.clone());
            let loss_value: f64 = loss.into_scalar().elem();
            total_loss += loss_value;
            total_accuracy += accuracy(logits, batch.labels);
        }

        Ok((total_loss / steps as f64, total_accuracy / steps as f64))
    }

    /// Per-epoch metrics recorded so far
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// The model in its current training state
    pub fn model(&self) -> &EmotionClassifier<B> {
        &self.model
    }

    /// Consume the trainer, returning the trained model and history
    pub fn finish(self) -> (EmotionClassifier<B>, TrainingHistory) {
        (self.model, self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DefaultBackend, TrainingBackend};
    use crate::dataset::batcher::{EmotionBatcher, EmotionImageDataset};
    use crate::dataset::loader::EmotionDataset;
    use crate::dataset::stream::BatchStream;
    use crate::model::cnn::EmotionClassifierConfig;
    use crate::NUM_CLASSES;
    use burn::data::dataloader::batcher::Batcher;
    use image::GrayImage;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_images(root: &Path, per_class: usize) {
        for (label, class) in ["angry", "happy", "sad"].iter().enumerate() {
            let dir = root.join(class);
            std::fs::create_dir_all(&dir).unwrap();
            for i in 0..per_class {
                let img = GrayImage::from_fn(48, 48, |x, y| {
                    image::Luma([((x + 3 * y + 17 * label as u32 + i as u32) % 256) as u8])
                });
                img.save(dir.join(format!("{}.png", i))).unwrap();
            }
        }
    }

    #[test]
    fn test_cross_entropy_is_non_negative() {
        let device = Default::default();
        let logits = Tensor::<DefaultBackend, 2>::from_floats(
            [[2.0, -1.0, 0.5], [0.0, 0.0, 0.0]],
            &device,
        );
        let targets = Tensor::<DefaultBackend, 2>::from_floats(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &device,
        );

        let loss: f64 = categorical_cross_entropy(logits, targets)
            .into_scalar()
            .elem();
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_accuracy_counts_argmax_matches() {
        let device = Default::default();
        let logits = Tensor::<DefaultBackend, 2>::from_floats(
            [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0], [3.0, 0.0, 0.0]],
            &device,
        );
        let targets = Tensor::<DefaultBackend, 2>::from_floats(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            &device,
        );

        let acc = accuracy(logits, targets);
        assert!((acc - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_two_epoch_run_records_history() {
        // 3 classes x 32 train images and x 8 validation images with
        // batch 32 gives 3 training steps and 0 remainder handling.
        let train_tmp = TempDir::new().unwrap();
        let val_tmp = TempDir::new().unwrap();
        write_images(train_tmp.path(), 32);
        write_images(val_tmp.path(), 8);

        let device = Default::default();
        let train_loader = EmotionDataset::new(train_tmp.path(), NUM_CLASSES).unwrap();
        let val_loader = EmotionDataset::new(val_tmp.path(), NUM_CLASSES).unwrap();

        let mut train: BatchStream<TrainingBackend> = BatchStream::new(
            EmotionImageDataset::from_loader(&train_loader),
            32,
            None,
            42,
            device,
        );
        let mut val: BatchStream<DefaultBackend> = BatchStream::new(
            EmotionImageDataset::from_loader(&val_loader),
            32,
            None,
            43,
            Default::default(),
        );

        assert_eq!(train.steps_per_epoch(), 3);

        let config = TrainingConfig {
            epochs: 2,
            batch_size: 32,
            learning_rate: 0.001,
            seed: 42,
        };
        let model = crate::model::cnn::EmotionClassifier::<TrainingBackend>::new(
            &EmotionClassifierConfig::new(),
            &Default::default(),
        );

        let mut trainer = Trainer::new(model, config);
        trainer.fit(&mut train, &mut val).unwrap();

        let history = trainer.history();
        assert_eq!(history.len(), 2);
        for record in history.records() {
            assert!(record.train_loss.is_finite());
            assert!(record.train_loss >= 0.0);
            assert!(record.val_loss.is_finite());
            assert!(record.val_loss >= 0.0);
            assert!((0.0..=1.0).contains(&record.train_accuracy));
            assert!((0.0..=1.0).contains(&record.val_accuracy));
        }
    }

    #[test]
    fn test_fit_fails_without_a_full_batch() {
        let train_tmp = TempDir::new().unwrap();
        let val_tmp = TempDir::new().unwrap();
        write_images(train_tmp.path(), 2); // 6 samples < batch 32
        write_images(val_tmp.path(), 2);

        let train_loader = EmotionDataset::new(train_tmp.path(), NUM_CLASSES).unwrap();
        let val_loader = EmotionDataset::new(val_tmp.path(), NUM_CLASSES).unwrap();

        let mut train: BatchStream<TrainingBackend> = BatchStream::new(
            EmotionImageDataset::from_loader(&train_loader),
            32,
            None,
            42,
            Default::default(),
        );
        let mut val: BatchStream<DefaultBackend> = BatchStream::new(
            EmotionImageDataset::from_loader(&val_loader),
            32,
            None,
            43,
            Default::default(),
        );

        let model = crate::model::cnn::EmotionClassifier::<TrainingBackend>::new(
            &EmotionClassifierConfig::new(),
            &Default::default(),
        );
        let mut trainer = Trainer::new(model, TrainingConfig::default());

        assert!(trainer.fit(&mut train, &mut val).is_err());
    }

    #[test]
    fn test_batcher_compatible_with_loss() {
        // One-hot labels straight out of the batcher feed the loss.
        let device = Default::default();
        let batcher = EmotionBatcher::new();
        let items: Vec<_> = (0..4)
            .map(|i| {
                crate::dataset::batcher::EmotionItem::from_data(
                    vec![0.5; 48 * 48],
                    i % NUM_CLASSES,
                    format!("{}.png", i),
                )
            })
            .collect();
        let batch: crate::dataset::batcher::EmotionBatch<DefaultBackend> =
            batcher.batch(items, &device);

        let model = crate::model::cnn::EmotionClassifier::<DefaultBackend>::new(
            &EmotionClassifierConfig::new(),
            &device,
        );
        let logits = model.forward(batch.images);
        let loss: f64 = categorical_cross_entropy(logits, batch.labels)
            .into_scalar()
            .elem();

        assert!(loss.is_finite() && loss >= 0.0);
    }
}
