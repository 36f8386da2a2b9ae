//! Fixed-architecture plant-disease CNN.
//!
//! Tensor names follow the PyTorch `state_dict` layout of the training code,
//! so exported weights load without renaming:
//!
//! - `conv_block{1..5}.0.{weight,bias}` - 3x3 convolution, same padding
//! - `conv_block{1..5}.1.{weight,bias,running_mean,running_var}` - batch norm
//! - `fc_block.1.{weight,bias}` - 512 -> 256
//! - `fc_block.4.{weight,bias}` - 256 -> classes

use candle_core::{Result, Tensor};
use candle_nn::{BatchNorm, Conv2d, Conv2dConfig, Dropout, Linear, Module, VarBuilder};

pub const IN_CHANNELS: usize = 3;
pub const CONV_CHANNELS: [usize; 5] = [64, 128, 256, 512, 512];
pub const HIDDEN_UNITS: usize = 256;
pub const DROPOUT_RATE: f32 = 0.5;
const BATCH_NORM_EPS: f64 = 1e-5;

/// conv -> batchnorm -> relu -> 2x2 max pool
struct ConvBlock {
    conv: Conv2d,
    bn: BatchNorm,
}

impl ConvBlock {
    fn new(in_channels: usize, out_channels: usize, vb: VarBuilder) -> Result<Self> {
        let config = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let conv = candle_nn::conv2d(in_channels, out_channels, 3, config, vb.pp("0"))?;
        let bn = candle_nn::batch_norm(out_channels, BATCH_NORM_EPS, vb.pp("1"))?;
        Ok(Self { conv, bn })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        xs.apply(&self.conv)?
            .apply_t(&self.bn, false)?
            .relu()?
            .max_pool2d(2)
    }
}

pub struct PlantDiseaseNet {
    blocks: Vec<ConvBlock>,
    fc1: Linear,
    dropout: Dropout,
    fc2: Linear,
    num_classes: usize,
}

impl PlantDiseaseNet {
    /// Build the network, pulling every tensor from `vb`.
    ///
    /// Fails if any tensor is missing or has the wrong shape, including an
    /// output layer whose width differs from `num_classes`.
    pub fn new(num_classes: usize, vb: VarBuilder) -> Result<Self> {
        let mut blocks = Vec::with_capacity(CONV_CHANNELS.len());
        let mut in_channels = IN_CHANNELS;
        for (i, &out_channels) in CONV_CHANNELS.iter().enumerate() {
            let block = ConvBlock::new(in_channels, out_channels, vb.pp(format!("conv_block{}", i + 1)))?;
            blocks.push(block);
            in_channels = out_channels;
        }

        let head = vb.pp("fc_block");
        let fc1 = candle_nn::linear(in_channels, HIDDEN_UNITS, head.pp("1"))?;
        let fc2 = candle_nn::linear(HIDDEN_UNITS, num_classes, head.pp("4"))?;

        Ok(Self {
            blocks,
            fc1,
            dropout: Dropout::new(DROPOUT_RATE),
            fc2,
            num_classes,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// `(batch, 3, h, w)` -> `(batch, num_classes)` logits, inference mode.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.clone();
        for block in &self.blocks {
            xs = block.forward(&xs)?;
        }

        // global average pool over the spatial dims
        let xs = xs.mean((2, 3))?;
        let xs = self.fc1.forward(&xs)?.relu()?;
        let xs = self.dropout.forward(&xs, false)?;
        self.fc2.forward(&xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_forward_shape() {
        let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let net = PlantDiseaseNet::new(7, vb).unwrap();

        let input = Tensor::zeros((2, 3, 32, 32), DType::F32, &Device::Cpu).unwrap();
        let logits = net.forward(&input).unwrap();
        assert_eq!(logits.dims(), &[2, 7]);
        assert_eq!(net.num_classes(), 7);
    }
}
