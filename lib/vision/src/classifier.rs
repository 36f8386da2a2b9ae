use crate::{ArtifactCache, ArtifactPaths, Error, ImageInput, LabelEncoder, ModelArtifactSet, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of ranked classes reported alongside the top prediction
pub const TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,
    /// Percent, 0-100
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub prediction: String,
    pub confidence: f32,
    pub top_predictions: Vec<Prediction>,
}

/// Class indices ordered by descending probability, ties by ascending index.
pub fn ranked_indices(probabilities: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // stable sort keeps equal probabilities in index order
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order
}

/// Turn a class distribution into a [`ClassificationResult`].
///
/// The top prediction is always the first entry of `top_predictions`.
pub fn rank(probabilities: &[f32], encoder: &LabelEncoder, k: usize) -> Result<ClassificationResult> {
    if probabilities.len() != encoder.len() {
        return Err(Error::InvalidArtifact(format!(
            "distribution has {} classes but the label encoder has {}",
            probabilities.len(),
            encoder.len()
        )));
    }

    let top_predictions = ranked_indices(probabilities)
        .into_iter()
        .take(k.max(1))
        .map(|index| -> Result<Prediction> {
            let disease = encoder
                .inverse_transform(index)
                .ok_or_else(|| Error::InvalidArtifact(format!("no class name for index {}", index)))?;
            Ok(Prediction {
                disease: disease.to_string(),
                confidence: probabilities[index] * 100.0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let top = top_predictions
        .first()
        .cloned()
        .ok_or_else(|| Error::InvalidArtifact("empty class distribution".into()))?;

    Ok(ClassificationResult {
        prediction: top.disease,
        confidence: top.confidence,
        top_predictions,
    })
}

/// Classify one image with an already resolved artifact set.
pub fn predict(image: ImageInput, artifacts: &ModelArtifactSet) -> Result<ClassificationResult> {
    let rgb = image.into_rgb()?;
    let batch = artifacts.transform.apply(&rgb, artifacts.model.device())?;
    let probabilities = artifacts.model.probabilities(&batch)?;
    rank(&probabilities, &artifacts.label_encoder, TOP_K)
}

/// Classification entry point bound to a cache and default artifact paths
#[derive(Clone)]
pub struct Classifier {
    cache: Arc<ArtifactCache>,
    paths: ArtifactPaths,
}

impl Classifier {
    pub fn new(cache: Arc<ArtifactCache>, paths: ArtifactPaths) -> Self {
        Self { cache, paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    pub fn artifacts(&self) -> Result<ModelArtifactSet> {
        self.cache.load_artifacts(&self.paths)
    }

    pub fn predict(&self, image: impl Into<ImageInput>) -> Result<ClassificationResult> {
        self.predict_with(image, &self.paths)
    }

    /// Same as [`predict`](Self::predict) with per-call artifact paths
    pub fn predict_with(&self, image: impl Into<ImageInput>, paths: &ArtifactPaths) -> Result<ClassificationResult> {
        let artifacts = self.cache.load_artifacts(paths)?;
        predict(image.into(), &artifacts)
    }
}
