//! On-disk artifact sets for tests.
//!
//! Weights are all zero except the batch-norm running variance, so every
//! input produces zero logits and a uniform class distribution.

use crate::network::{CONV_CHANNELS, HIDDEN_UNITS, IN_CHANNELS};
use crate::{ArtifactPaths, Error, PreprocessTransform, Result};
use candle_core::{DType, Device, Tensor};
use std::collections::HashMap;
use std::path::Path;

fn zeros(shape: &[usize]) -> candle_core::Result<Tensor> {
    Tensor::zeros(shape, DType::F32, &Device::Cpu)
}

/// State dict for a network with `num_classes` outputs
pub fn uniform_weights(num_classes: usize) -> candle_core::Result<HashMap<String, Tensor>> {
    let mut tensors = HashMap::new();
    let mut in_channels = IN_CHANNELS;
    for (i, &out) in CONV_CHANNELS.iter().enumerate() {
        let block = format!("conv_block{}", i + 1);
        tensors.insert(format!("{block}.0.weight"), zeros(&[out, in_channels, 3, 3])?);
        tensors.insert(format!("{block}.0.bias"), zeros(&[out])?);
        tensors.insert(format!("{block}.1.weight"), zeros(&[out])?);
        tensors.insert(format!("{block}.1.bias"), zeros(&[out])?);
        tensors.insert(format!("{block}.1.running_mean"), zeros(&[out])?);
        tensors.insert(
            format!("{block}.1.running_var"),
            Tensor::ones(out, DType::F32, &Device::Cpu)?,
        );
        in_channels = out;
    }
    tensors.insert("fc_block.1.weight".into(), zeros(&[HIDDEN_UNITS, in_channels])?);
    tensors.insert("fc_block.1.bias".into(), zeros(&[HIDDEN_UNITS])?);
    tensors.insert("fc_block.4.weight".into(), zeros(&[num_classes, HIDDEN_UNITS])?);
    tensors.insert("fc_block.4.bias".into(), zeros(&[num_classes])?);
    Ok(tensors)
}

/// Write weights, class names, transform and encoder into `dir`.
///
/// `image_size` keeps the forward pass cheap; 32 is the smallest size that
/// survives the five pooling stages.
pub fn write_artifacts(dir: &Path, classes: &[&str], image_size: u32) -> Result<ArtifactPaths> {
    let paths = ArtifactPaths {
        model: dir.join("model.safetensors"),
        class_names: dir.join("class_names.json"),
        transform: dir.join("inference_transform.json"),
        label_encoder: dir.join("label_encoder.json"),
    };

    let weights = uniform_weights(classes.len())?;
    candle_core::safetensors::save(&weights, &paths.model)?;

    let to_json = |value: serde_json::Value| {
        serde_json::to_vec_pretty(&value).map_err(|e| Error::InvalidArtifact(e.to_string()))
    };
    std::fs::write(&paths.class_names, to_json(serde_json::json!(classes))?)?;
    std::fs::write(
        &paths.label_encoder,
        to_json(serde_json::json!({ "classes": classes }))?,
    )?;

    let transform = PreprocessTransform {
        resize: [image_size, image_size],
        ..Default::default()
    };
    std::fs::write(
        &paths.transform,
        serde_json::to_vec(&transform).map_err(|e| Error::InvalidArtifact(e.to_string()))?,
    )?;

    Ok(paths)
}
