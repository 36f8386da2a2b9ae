//! # AgroFlow Vision
//!
//! Plant-disease classification from leaf images.
//!
//! - [`ArtifactCache`] - memoized weights, class names, transform and label encoder
//! - [`PreprocessTransform`] - resize + normalize into a `(1, 3, H, W)` batch
//! - [`network::PlantDiseaseNet`] - five conv blocks, global average pool, two-layer head
//! - [`Classifier`] - image in, [`ClassificationResult`] out
//!
//! ## Example
//!
//! ```rust,no_run
//! use agroflow_vision::{ArtifactCache, ArtifactPaths, Classifier, ImageInput};
//! use std::sync::Arc;
//!
//! let classifier = Classifier::new(Arc::new(ArtifactCache::new()), ArtifactPaths::default());
//! let result = classifier.predict(ImageInput::Path("leaf.jpg".into())).unwrap();
//! println!("{} ({:.1}%)", result.prediction, result.confidence);
//! ```

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod input;
pub mod label_encoder;
pub mod network;
pub mod transform;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use artifacts::{select_device, ArtifactCache, ArtifactPaths, LoadedModel, ModelArtifactSet};
pub use classifier::{predict, rank, ClassificationResult, Classifier, Prediction, TOP_K};
pub use error::{Error, Result};
pub use input::{ensure_image_media_type, ImageInput};
pub use label_encoder::LabelEncoder;
pub use transform::PreprocessTransform;
