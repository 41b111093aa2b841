//! Evaluation Spot Check
//!
//! Pulls exactly one batch from the validation stream, runs a forward
//! pass through a (re)loaded model and reports the fraction of examples
//! whose predicted class matches the label. A single-batch check, not a
//! full-dataset evaluation.

use anyhow::Result;
use burn::prelude::*;

use crate::dataset::stream::BatchStream;
use crate::model::cnn::EmotionClassifier;

/// Outcome of a single-batch evaluation
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Fraction of correct predictions, in [0, 1]
    pub accuracy: f64,
    /// Number of correct predictions
    pub correct: usize,
    /// Batch size evaluated
    pub total: usize,
    /// Predicted class per example
    pub predictions: Vec<usize>,
    /// True class per example
    pub targets: Vec<usize>,
}

/// Evaluate the model on one batch from `stream`.
pub fn spot_check<B: Backend>(
    model: &EmotionClassifier<B>,
    stream: &mut BatchStream<B>,
) -> Result<EvaluationReport> {
    let batch = stream.next_batch()?;

    let targets = batch.target_indices();
    let probs = model.forward_softmax(batch.images);
    let predicted = probs.argmax(1).squeeze::<1>(1);

    let pred_vec: Vec<i64> = predicted.into_data().convert::<i64>().to_vec().unwrap();
    let target_vec: Vec<i64> = targets.into_data().convert::<i64>().to_vec().unwrap();

    let total = target_vec.len();
    let correct = pred_vec
        .iter()
        .zip(target_vec.iter())
        .filter(|(p, t)| p == t)
        .count();

    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };

    Ok(EvaluationReport {
        accuracy,
        correct,
        total,
        predictions: pred_vec.iter().map(|&p| p as usize).collect(),
        targets: target_vec.iter().map(|&t| t as usize).collect(),
    })
}
