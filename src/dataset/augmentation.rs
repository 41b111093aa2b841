//! Data Augmentation for Emotion Images
//!
//! Randomized geometric transforms applied to training images on each
//! yield: rotation, shear, zoom and horizontal flip, combined into a
//! single affine resample. Pixels sampled outside the source image are
//! filled by edge replication. Validation batches bypass this module
//! entirely.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Configuration for geometric augmentation
#[derive(Clone, Debug)]
pub struct AugmentationConfig {
    /// Maximum rotation angle in degrees (applies ±rotation_degrees)
    pub rotation_degrees: f32,
    /// Shear intensity (applies ±shear)
    pub shear: f32,
    /// Zoom range (scale sampled from 1.0 ± zoom)
    pub zoom: f32,
    /// Probability of applying horizontal flip (0.0 - 1.0)
    pub horizontal_flip_prob: f32,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            rotation_degrees: 30.0,
            shear: 0.3,
            zoom: 0.3,
            horizontal_flip_prob: 0.5,
        }
    }
}

impl AugmentationConfig {
    /// Disable all augmentations
    pub fn none() -> Self {
        Self {
            rotation_degrees: 0.0,
            shear: 0.0,
            zoom: 0.0,
            horizontal_flip_prob: 0.0,
        }
    }
}

/// Applies random geometric transforms to square grayscale pixel grids
#[derive(Clone, Debug)]
pub struct Augmenter {
    config: AugmentationConfig,
    image_size: usize,
}

impl Augmenter {
    /// Create a new augmenter for images of the given side length
    pub fn new(config: AugmentationConfig, image_size: usize) -> Self {
        Self { config, image_size }
    }

    /// Create an augmenter with the default training transforms
    pub fn with_defaults(image_size: usize) -> Self {
        Self::new(AugmentationConfig::default(), image_size)
    }

    /// Apply a randomly sampled transform to one image.
    ///
    /// `pixels` is a row-major `image_size * image_size` grayscale grid in
    /// [0, 1]; the result has the same layout and range.
    pub fn augment(&self, pixels: &[f32], rng: &mut ChaCha8Rng) -> Vec<f32> {
        debug_assert_eq!(pixels.len(), self.image_size * self.image_size);

        let mut result = pixels.to_vec();

        if self.config.horizontal_flip_prob > 0.0
            && rng.gen::<f32>() < self.config.horizontal_flip_prob
        {
            flip_horizontal(&mut result, self.image_size);
        }

        let angle = sample_range(rng, self.config.rotation_degrees).to_radians();
        let shear = sample_range(rng, self.config.shear);
        let zoom = 1.0 + sample_range(rng, self.config.zoom);

        if angle == 0.0 && shear == 0.0 && zoom == 1.0 {
            return result;
        }

        self.affine_resample(&result, angle, shear, zoom)
    }

    /// Resample through the inverse of rotate ∘ shear ∘ zoom around the
    /// image center, with bilinear interpolation and edge replication.
    fn affine_resample(&self, pixels: &[f32], angle: f32, shear: f32, zoom: f32) -> Vec<f32> {
        let size = self.image_size;
        let center = (size as f32 - 1.0) / 2.0;

        let (sin_a, cos_a) = angle.sin_cos();

        // Forward matrix M = R(angle) · Sh(shear) · Z(zoom)
        let m00 = cos_a * zoom;
        let m01 = (cos_a * shear - sin_a) * zoom;
        let m10 = sin_a * zoom;
        let m11 = (sin_a * shear + cos_a) * zoom;

        let det = m00 * m11 - m01 * m10;
        let inv00 = m11 / det;
        let inv01 = -m01 / det;
        let inv10 = -m10 / det;
        let inv11 = m00 / det;

        let mut output = vec![0.0f32; size * size];

        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center;
                let dy = y as f32 - center;

                let src_x = center + inv00 * dx + inv01 * dy;
                let src_y = center + inv10 * dx + inv11 * dy;

                output[y * size + x] = bilinear_sample(pixels, size, src_x, src_y);
            }
        }

        output
    }
}

fn sample_range(rng: &mut ChaCha8Rng, limit: f32) -> f32 {
    if limit == 0.0 {
        0.0
    } else {
        rng.gen_range(-limit..=limit)
    }
}

fn flip_horizontal(pixels: &mut [f32], size: usize) {
    for row in pixels.chunks_mut(size) {
        row.reverse();
    }
}

/// Sample a pixel with bilinear interpolation; out-of-bounds coordinates
/// are clamped to the nearest edge pixel.
fn bilinear_sample(pixels: &[f32], size: usize, x: f32, y: f32) -> f32 {
    let max = (size - 1) as f32;
    let x = x.clamp(0.0, max);
    let y = y.clamp(0.0, max);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(size - 1);
    let y1 = (y0 + 1).min(size - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let v00 = pixels[y0 * size + x0];
    let v10 = pixels[y0 * size + x1];
    let v01 = pixels[y1 * size + x0];
    let v11 = pixels[y1 * size + x1];

    v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const SIZE: usize = 48;

    fn gradient_image() -> Vec<f32> {
        (0..SIZE * SIZE)
            .map(|i| (i % SIZE) as f32 / SIZE as f32)
            .collect()
    }

    #[test]
    fn test_identity_config_returns_input() {
        let augmenter = Augmenter::new(AugmentationConfig::none(), SIZE);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let pixels = gradient_image();
        let out = augmenter.augment(&pixels, &mut rng);

        assert_eq!(out, pixels);
    }

    #[test]
    fn test_output_stays_in_range() {
        let augmenter = Augmenter::with_defaults(SIZE);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let pixels = gradient_image();
        for _ in 0..10 {
            let out = augmenter.augment(&pixels, &mut rng);
            assert_eq!(out.len(), SIZE * SIZE);
            assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_flip_reverses_rows() {
        let config = AugmentationConfig {
            rotation_degrees: 0.0,
            shear: 0.0,
            zoom: 0.0,
            horizontal_flip_prob: 1.0,
        };
        let augmenter = Augmenter::new(config, SIZE);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let pixels = gradient_image();
        let out = augmenter.augment(&pixels, &mut rng);

        for y in 0..SIZE {
            for x in 0..SIZE {
                assert_eq!(out[y * SIZE + x], pixels[y * SIZE + (SIZE - 1 - x)]);
            }
        }
    }

    #[test]
    fn test_edge_replication_fills_corners() {
        // Rotation pushes corners outside the source grid; samples there
        // must clamp to edge values, never escape [0, 1].
        let config = AugmentationConfig {
            rotation_degrees: 30.0,
            shear: 0.3,
            zoom: 0.3,
            horizontal_flip_prob: 0.0,
        };
        let augmenter = Augmenter::new(config, SIZE);
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let pixels = vec![1.0f32; SIZE * SIZE];
        let out = augmenter.augment(&pixels, &mut rng);

        // Constant image stays constant under any affine with edge fill.
        assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}
