//! Emotion CNN CLI
//!
//! Entry point for training, evaluating and reporting on the emotion
//! classifier. The `train` subcommand runs the whole pipeline: fit the
//! model, persist it, render the history charts, then reload the saved
//! file and spot-check one validation batch.

use std::path::Path;

use anyhow::Result;
use burn::module::AutodiffModule;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use emotion_cnn::backend::{backend_name, default_device, DefaultBackend, TrainingBackend};
use emotion_cnn::dataset::batcher::EmotionImageDataset;
use emotion_cnn::dataset::loader::EmotionDataset;
use emotion_cnn::dataset::stream::BatchStream;
use emotion_cnn::model::cnn::{EmotionClassifier, EmotionClassifierConfig};
use emotion_cnn::model::persist::{load_model, model_file_name, save_model};
use emotion_cnn::training::trainer::{Trainer, TrainingConfig};
use emotion_cnn::training::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};
use emotion_cnn::utils::charts::render_history_charts;
use emotion_cnn::utils::logging::{init_logging, LogConfig};
use emotion_cnn::{spot_check, Augmenter, TrainingHistory, IMAGE_SIZE, NUM_CLASSES};

/// Emotion recognition from grayscale facial images
#[derive(Parser, Debug)]
#[command(name = "emotion_cnn")]
#[command(version)]
#[command(about = "Emotion classification with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the classifier and spot-check the saved model
    Train {
        /// Dataset root containing train/ and test/ class trees
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Number of training epochs
        #[arg(short, long, default_value_t = DEFAULT_EPOCHS)]
        epochs: usize,

        /// Batch size for training and validation
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Learning rate
        #[arg(short, long, default_value_t = DEFAULT_LEARNING_RATE)]
        learning_rate: f64,

        /// Output directory for the model, history and charts
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// Random seed for shuffling and augmentation
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Evaluate a persisted model on one held-out batch
    Evaluate {
        /// Dataset root containing a test/ class tree
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Path to the persisted model (without extension)
        #[arg(short, long)]
        model: String,

        /// Batch size for the spot check
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Random seed for batch selection
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Render loss/accuracy charts from a saved training history
    Report {
        /// Path to the training history JSON
        #[arg(long, default_value = "output/training_history.json")]
        history: String,

        /// Directory to write the SVG charts into
        #[arg(short, long, default_value = "output")]
        output_dir: String,
    },

    /// Show statistics for a dataset directory
    Stats {
        /// Path to a class-per-directory dataset tree
        #[arg(short, long, default_value = "data/train")]
        data_dir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Train {
            data_dir,
            epochs,
            batch_size,
            learning_rate,
            output_dir,
            seed,
        } => cmd_train(
            &data_dir,
            epochs,
            batch_size,
            learning_rate,
            &output_dir,
            seed,
        ),

        Commands::Evaluate {
            data_dir,
            model,
            batch_size,
            seed,
        } => cmd_evaluate(&data_dir, &model, batch_size, seed),

        Commands::Report {
            history,
            output_dir,
        } => cmd_report(&history, &output_dir),

        Commands::Stats { data_dir } => cmd_stats(&data_dir),
    }
}

fn cmd_train(
    data_dir: &str,
    epochs: usize,
    batch_size: usize,
    learning_rate: f64,
    output_dir: &str,
    seed: u64,
) -> Result<()> {
    println!("{}", "Initializing Training...".green().bold());

    let device = default_device();
    let train_loader = EmotionDataset::new(Path::new(data_dir).join("train"), NUM_CLASSES)?;
    let val_loader = EmotionDataset::new(Path::new(data_dir).join("test"), NUM_CLASSES)?;
    train_loader.stats().print();

    let model_config = EmotionClassifierConfig::new();
    let model = EmotionClassifier::<TrainingBackend>::new(&model_config, &device);

    // Architecture summary, printed once before training starts
    println!();
    println!("{}", model.summary());

    println!("{}", "Training Configuration:".cyan().bold());
    println!("  Training samples:   {}", train_loader.len());
    println!("  Validation samples: {}", val_loader.len());
    println!("  Epochs:             {}", epochs);
    println!("  Batch size:         {}", batch_size);
    println!("  Learning rate:      {}", learning_rate);
    println!("  Backend:            {}", backend_name());
    println!();

    let augmenter = Augmenter::with_defaults(IMAGE_SIZE);
    let mut train_stream: BatchStream<TrainingBackend> = BatchStream::new(
        EmotionImageDataset::from_loader(&train_loader),
        batch_size,
        Some(augmenter),
        seed,
        device.clone(),
    );
    let mut val_stream: BatchStream<DefaultBackend> = BatchStream::new(
        EmotionImageDataset::from_loader(&val_loader),
        batch_size,
        None,
        seed.wrapping_add(1),
        device.clone(),
    );

    let config = TrainingConfig {
        epochs,
        batch_size,
        learning_rate,
        seed,
    };
    let mut trainer = Trainer::new(model, config);
    trainer.fit(&mut train_stream, &mut val_stream)?;
    let (model, history) = trainer.finish();

    let output_dir = Path::new(output_dir);
    history.save(&output_dir.join("training_history.json"))?;
    let (loss_chart, acc_chart) = render_history_charts(&history, output_dir)?;
    info!("Charts written to {:?} and {:?}", loss_chart, acc_chart);

    let model_path = output_dir.join(model_file_name(epochs));
    let written = save_model(model.valid(), &model_path)?;
    println!("  Saved model to: {:?}", written);
    println!();

    // Reload the persisted file and spot-check one validation batch,
    // exercising the same path a downstream consumer would.
    let eval_model = load_model::<DefaultBackend>(&model_config, &model_path, &device)?;
    let mut eval_stream: BatchStream<DefaultBackend> = BatchStream::new(
        EmotionImageDataset::from_loader(&val_loader),
        batch_size,
        None,
        seed.wrapping_add(2),
        device,
    );
    let report = spot_check(&eval_model, &mut eval_stream)?;

    println!("{}", "Training Complete!".green().bold());
    println!("Accuracy = {:.4}", report.accuracy);

    Ok(())
}

fn cmd_evaluate(data_dir: &str, model: &str, batch_size: usize, seed: u64) -> Result<()> {
    println!("{}", "Evaluation Configuration:".cyan().bold());
    println!("  Model:   {}", model);
    println!("  Backend: {}", backend_name());
    println!();

    let device = default_device();
    let val_loader = EmotionDataset::new(Path::new(data_dir).join("test"), NUM_CLASSES)?;

    let model_config = EmotionClassifierConfig::new();
    let eval_model = load_model::<DefaultBackend>(&model_config, Path::new(model), &device)?;

    let mut stream: BatchStream<DefaultBackend> = BatchStream::new(
        EmotionImageDataset::from_loader(&val_loader),
        batch_size,
        None,
        seed,
        device,
    );
    let report = spot_check(&eval_model, &mut stream)?;

    println!(
        "  {} of {} predictions correct on one batch",
        report.correct, report.total
    );
    println!("Accuracy = {:.4}", report.accuracy);

    Ok(())
}

fn cmd_report(history: &str, output_dir: &str) -> Result<()> {
    let history = TrainingHistory::load(Path::new(history))?;
    let (loss_chart, acc_chart) = render_history_charts(&history, Path::new(output_dir))?;

    println!("{}", "Charts written:".green().bold());
    println!("  {:?}", loss_chart);
    println!("  {:?}", acc_chart);

    Ok(())
}

fn cmd_stats(data_dir: &str) -> Result<()> {
    let dataset = EmotionDataset::new(data_dir, NUM_CLASSES)?;
    dataset.stats().print();
    Ok(())
}
