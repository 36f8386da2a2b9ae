use crate::network::CONV_CHANNELS;
use crate::{Error, Result};
use candle_core::{Device, Tensor};
use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Smallest side that survives every pooling stage of the network
pub const MIN_INPUT_SIZE: u32 = 1 << CONV_CHANNELS.len();

/// Deterministic resize + per-channel normalization.
///
/// Serialized as `{"resize": [height, width], "mean": [..], "std": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessTransform {
    pub resize: [u32; 2],
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for PreprocessTransform {
    fn default() -> Self {
        Self {
            resize: [224, 224],
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl PreprocessTransform {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let transform: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::load("transform", path, e))?;
        transform.validate()?;
        Ok(transform)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resize.iter().any(|&side| side < MIN_INPUT_SIZE) {
            return Err(Error::InvalidArtifact(format!(
                "transform resize must be at least {}x{}, got {:?}",
                MIN_INPUT_SIZE, MIN_INPUT_SIZE, self.resize
            )));
        }
        if self.std.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::InvalidArtifact(format!(
                "transform std must be finite and non-zero, got {:?}",
                self.std
            )));
        }
        Ok(())
    }

    pub fn height(&self) -> u32 {
        self.resize[0]
    }

    pub fn width(&self) -> u32 {
        self.resize[1]
    }

    /// Resized, normalized pixels in channel-major (CHW) order.
    pub fn to_chw(&self, image: &RgbImage) -> Vec<f32> {
        let (h, w) = (self.height(), self.width());
        let resized = if image.dimensions() == (w, h) {
            image.clone()
        } else {
            image::imageops::resize(image, w, h, FilterType::Triangle)
        };

        let plane = (h * w) as usize;
        let mut data = vec![0.0f32; 3 * plane];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                let value = f32::from(pixel.0[c]) / 255.0;
                data[c * plane + i] = (value - self.mean[c]) / self.std[c];
            }
        }
        data
    }

    /// Single-sample batch of shape `(1, 3, height, width)` on `device`.
    pub fn apply(&self, image: &RgbImage, device: &Device) -> Result<Tensor> {
        let shape = (1, 3, self.height() as usize, self.width() as usize);
        Ok(Tensor::from_vec(self.to_chw(image), shape, device)?)
    }
}
