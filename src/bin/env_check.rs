//! Environment diagnostic
//!
//! Prints the engine version, the crate version, the compiler that built
//! the binary and whether a GPU backend is compiled in, one per line.

use emotion_cnn::backend::{gpu_available, BURN_VERSION};

fn main() {
    println!("Burn Version: {}", BURN_VERSION);
    println!("emotion_cnn Version: {}", emotion_cnn::VERSION);
    println!("{}", env!("EMOTION_CNN_RUSTC_VERSION"));
    println!(
        "GPU is {}",
        if gpu_available() {
            "available"
        } else {
            "NOT AVAILABLE"
        }
    );
}
