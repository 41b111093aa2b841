//! Model Persistence
//!
//! Serializes trained parameters to a single file with Burn's
//! `CompactRecorder` and reloads them for inference. An existing file at
//! the target path is overwritten silently. Optimizer state is never
//! written; inference only needs the parameters.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use burn::module::Module;
use burn::record::CompactRecorder;
use burn::tensor::backend::Backend;
use tracing::info;

use super::cnn::{EmotionClassifier, EmotionClassifierConfig};

/// Base file name of the persisted model for a given epoch count.
///
/// The recorder appends its own extension, producing e.g.
/// `emotion_detection_model_50epochs.mpk`.
pub fn model_file_name(epochs: usize) -> String {
    format!("emotion_detection_model_{}epochs", epochs)
}

/// Save a trained model to `path` (extension added by the recorder).
pub fn save_model<B: Backend>(model: EmotionClassifier<B>, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let recorder = CompactRecorder::new();
    model
        .save_file(path, &recorder)
        .map_err(|e| anyhow!("Failed to save model: {:?}", e))?;

    let written = path.with_extension("mpk");
    info!("Model saved to {:?}", written);
    Ok(written)
}

/// Load a persisted model for the given architecture configuration.
pub fn load_model<B: Backend>(
    config: &EmotionClassifierConfig,
    path: &Path,
    device: &B::Device,
) -> Result<EmotionClassifier<B>> {
    let recorder = CompactRecorder::new();
    let model = EmotionClassifier::<B>::new(config, device)
        .load_file(path, &recorder, device)
        .map_err(|e| anyhow!("Failed to load model from {:?}: {:?}", path, e))?;

    info!("Model loaded from {:?}", path);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    #[test]
    fn test_model_file_name() {
        assert_eq!(model_file_name(50), "emotion_detection_model_50epochs");
    }

    #[test]
    fn test_save_load_round_trip_is_deterministic() {
        let device = Default::default();
        let config = EmotionClassifierConfig::new();
        let model = EmotionClassifier::<DefaultBackend>::new(&config, &device);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(model_file_name(50));

        let written = save_model(model.clone(), &path).unwrap();
        assert!(written.exists());

        let reloaded = load_model::<DefaultBackend>(&config, &path, &device).unwrap();

        let input = Tensor::<DefaultBackend, 4>::random(
            [4, 1, 48, 48],
            burn::tensor::Distribution::Default,
            &device,
        );

        let original: Vec<f32> = model
            .forward_softmax(input.clone())
            .into_data()
            .to_vec()
            .unwrap();

        // Two runs on the reloaded model over the same fixed batch must
        // agree with each other and with the original parameters.
        let first: Vec<f32> = reloaded
            .forward_softmax(input.clone())
            .into_data()
            .to_vec()
            .unwrap();
        let second: Vec<f32> = reloaded
            .forward_softmax(input)
            .into_data()
            .to_vec()
            .unwrap();

        assert_eq!(first, second);
        for (a, b) in original.iter().zip(first.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_missing_file_fails() {
        let device = Default::default();
        let config = EmotionClassifierConfig::new();
        let tmp = TempDir::new().unwrap();

        let result =
            load_model::<DefaultBackend>(&config, &tmp.path().join("missing"), &device);
        assert!(result.is_err());
    }
}
