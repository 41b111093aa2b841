//! CNN Model Architecture for Emotion Classification
//!
//! A fixed sequential stack of convolution, pooling, dropout and dense
//! layers over 48x48 single-channel input. Convolutions use valid (no)
//! padding, so every conv layer shrinks the spatial dimensions; the
//! flatten width fed into the first dense layer depends on that exact
//! arithmetic and must not be changed independently of the layer chain.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

/// Configuration for the emotion classifier CNN
#[derive(Config, Debug)]
pub struct EmotionClassifierConfig {
    /// Number of output classes
    #[config(default = "3")]
    pub num_classes: usize,

    /// Input image size (assumes square grayscale images)
    #[config(default = "48")]
    pub input_size: usize,

    /// Dropout rate after each pooling stage
    #[config(default = "0.1")]
    pub conv_dropout: f64,

    /// Dropout rate before the final dense layer
    #[config(default = "0.2")]
    pub dense_dropout: f64,
}

/// Filter counts of the four convolution layers, in order
const CONV_FILTERS: [usize; 4] = [32, 64, 128, 256];

/// Hidden width of the first dense layer
const DENSE_UNITS: usize = 512;

/// Emotion classifier CNN
///
/// Architecture:
/// Conv(32) → Conv(64) → MaxPool → Dropout →
/// Conv(128) → MaxPool → Dropout →
/// Conv(256) → MaxPool → Dropout →
/// Flatten → Dense(512) → Dropout → Dense(num_classes)
///
/// All convolutions are 3x3 with valid padding and ReLU; pooling is 2x2
/// with stride 2.
#[derive(Module, Debug)]
pub struct EmotionClassifier<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool1: MaxPool2d,
    drop1: Dropout,
    conv3: Conv2d<B>,
    pool2: MaxPool2d,
    drop2: Dropout,
    conv4: Conv2d<B>,
    pool3: MaxPool2d,
    drop3: Dropout,
    fc1: Linear<B>,
    drop4: Dropout,
    fc2: Linear<B>,
    activation: Relu,
    num_classes: usize,
    input_size: usize,
}

impl<B: Backend> EmotionClassifier<B> {
    /// Create a new classifier from configuration
    pub fn new(config: &EmotionClassifierConfig, device: &B::Device) -> Self {
        let conv = |in_ch: usize, out_ch: usize| {
            Conv2dConfig::new([in_ch, out_ch], [3, 3])
                .with_padding(PaddingConfig2d::Valid)
                .init(device)
        };
        let pool = || MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        let flattened = flattened_width(config.input_size);

        Self {
            conv1: conv(1, CONV_FILTERS[0]),
            conv2: conv(CONV_FILTERS[0], CONV_FILTERS[1]),
            pool1: pool(),
            drop1: DropoutConfig::new(config.conv_dropout).init(),
            conv3: conv(CONV_FILTERS[1], CONV_FILTERS[2]),
            pool2: pool(),
            drop2: DropoutConfig::new(config.conv_dropout).init(),
            conv4: conv(CONV_FILTERS[2], CONV_FILTERS[3]),
            pool3: pool(),
            drop3: DropoutConfig::new(config.conv_dropout).init(),
            fc1: LinearConfig::new(flattened, DENSE_UNITS).init(device),
            drop4: DropoutConfig::new(config.dense_dropout).init(),
            fc2: LinearConfig::new(DENSE_UNITS, config.num_classes).init(device),
            activation: Relu::new(),
            num_classes: config.num_classes,
            input_size: config.input_size,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 1, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(x));
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool1.forward(x);
        let x = self.drop1.forward(x);

        let x = self.activation.forward(self.conv3.forward(x));
        let x = self.pool2.forward(x);
        let x = self.drop2.forward(x);

        let x = self.activation.forward(self.conv4.forward(x));
        let x = self.pool3.forward(x);
        let x = self.drop3.forward(x);

        // Flatten: [B, C, H, W] -> [B, C * H * W]
        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.drop4.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with softmax, yielding per-class probabilities
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Console summary of the architecture, one row per layer
    pub fn summary(&self) -> String {
        let mut rows: Vec<(String, String, usize)> = Vec::new();
        let mut size = self.input_size;

        let conv_params: [usize; 4] = [
            self.conv1.num_params(),
            self.conv2.num_params(),
            self.conv3.num_params(),
            self.conv4.num_params(),
        ];

        // conv1, conv2 back to back, then pooled conv blocks
        size -= 2;
        rows.push(layer_row("conv2d (32, 3x3, relu)", CONV_FILTERS[0], size, conv_params[0]));
        size -= 2;
        rows.push(layer_row("conv2d (64, 3x3, relu)", CONV_FILTERS[1], size, conv_params[1]));
        size /= 2;
        rows.push(layer_row("max_pooling2d (2x2)", CONV_FILTERS[1], size, 0));
        rows.push(layer_row("dropout (0.1)", CONV_FILTERS[1], size, 0));
        size -= 2;
        rows.push(layer_row("conv2d (128, 3x3, relu)", CONV_FILTERS[2], size, conv_params[2]));
        size /= 2;
        rows.push(layer_row("max_pooling2d (2x2)", CONV_FILTERS[2], size, 0));
        rows.push(layer_row("dropout (0.1)", CONV_FILTERS[2], size, 0));
        size -= 2;
        rows.push(layer_row("conv2d (256, 3x3, relu)", CONV_FILTERS[3], size, conv_params[3]));
        size /= 2;
        rows.push(layer_row("max_pooling2d (2x2)", CONV_FILTERS[3], size, 0));
        rows.push(layer_row("dropout (0.1)", CONV_FILTERS[3], size, 0));

        let flattened = CONV_FILTERS[3] * size * size;
        rows.push(("flatten".to_string(), format!("[{}]", flattened), 0));
        rows.push((
            "dense (512, relu)".to_string(),
            format!("[{}]", DENSE_UNITS),
            self.fc1.num_params(),
        ));
        rows.push(("dropout (0.2)".to_string(), format!("[{}]", DENSE_UNITS), 0));
        rows.push((
            format!("dense ({}, softmax)", self.num_classes),
            format!("[{}]", self.num_classes),
            self.fc2.num_params(),
        ));

        let total: usize = rows.iter().map(|(_, _, p)| p).sum();

        let mut out = String::new();
        out.push_str(&format!(
            "{:<26} {:<16} {:>12}\n",
            "Layer", "Output Shape", "Params"
        ));
        out.push_str(&format!("{}\n", "-".repeat(56)));
        for (name, shape, params) in &rows {
            out.push_str(&format!("{:<26} {:<16} {:>12}\n", name, shape, params));
        }
        out.push_str(&format!("{}\n", "-".repeat(56)));
        out.push_str(&format!("Total params: {}\n", total));
        out
    }
}

fn layer_row(name: &str, channels: usize, size: usize, params: usize) -> (String, String, usize) {
    (
        name.to_string(),
        format!("[{}, {}, {}]", channels, size, size),
        params,
    )
}

/// Width of the flattened feature map entering the first dense layer.
///
/// Tracks the valid-padding dimension arithmetic of the layer chain:
/// for a 48x48 input, 48 → 46 → 44 → 22 → 20 → 10 → 8 → 4, giving
/// 4 * 4 * 256 = 4096.
pub fn flattened_width(input_size: usize) -> usize {
    let mut size = input_size;
    size -= 2; // conv1
    size -= 2; // conv2
    size /= 2; // pool1
    size -= 2; // conv3
    size /= 2; // pool2
    size -= 2; // conv4
    size /= 2; // pool3
    size * size * CONV_FILTERS[3]
}
