use crate::network::PlantDiseaseNet;
use crate::{Error, LabelEncoder, PreprocessTransform, Result};
use ahash::AHashMap;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use parking_lot::RwLock;
use std::fs::File;
use std::hash::Hash;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MODEL_PATH: &str = "plant_disease/model.safetensors";
pub const DEFAULT_CLASS_NAMES_PATH: &str = "plant_disease/class_names.json";
pub const DEFAULT_TRANSFORM_PATH: &str = "plant_disease/inference_transform.json";
pub const DEFAULT_ENCODER_PATH: &str = "plant_disease/label_encoder.json";

/// Locations of the four on-disk artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub class_names: PathBuf,
    pub transform: PathBuf,
    pub label_encoder: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL_PATH.into(),
            class_names: DEFAULT_CLASS_NAMES_PATH.into(),
            transform: DEFAULT_TRANSFORM_PATH.into(),
            label_encoder: DEFAULT_ENCODER_PATH.into(),
        }
    }
}

/// Network weights plus the class list they were built for
pub struct LoadedModel {
    net: PlantDiseaseNet,
    device: Device,
    class_names: Arc<Vec<String>>,
}

impl LoadedModel {
    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn num_classes(&self) -> usize {
        self.net.num_classes()
    }

    /// Raw logits for a `(batch, 3, h, w)` input
    pub fn forward(&self, batch: &Tensor) -> Result<Tensor> {
        Ok(self.net.forward(batch)?)
    }

    /// Softmax distribution for the first sample of `batch`
    pub fn probabilities(&self, batch: &Tensor) -> Result<Vec<f32>> {
        let logits = self.forward(batch)?;
        let probs = candle_nn::ops::softmax(&logits, candle_core::D::Minus1)?;
        Ok(probs.get(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }
}

/// Everything one classification needs, shared read-only
#[derive(Clone)]
pub struct ModelArtifactSet {
    pub model: Arc<LoadedModel>,
    pub transform: Arc<PreprocessTransform>,
    pub label_encoder: Arc<LabelEncoder>,
}

impl ModelArtifactSet {
    pub fn new(
        model: Arc<LoadedModel>,
        transform: Arc<PreprocessTransform>,
        label_encoder: Arc<LabelEncoder>,
    ) -> Result<Self> {
        if label_encoder.len() != model.num_classes() {
            return Err(Error::InvalidArtifact(format!(
                "label encoder has {} classes but the model outputs {}",
                label_encoder.len(),
                model.num_classes()
            )));
        }
        Ok(Self {
            model,
            transform,
            label_encoder,
        })
    }
}

type ModelKey = (PathBuf, PathBuf);

/// Memoizes loaded artifacts by exact path.
///
/// One cache is meant to live as long as the application; tests create a
/// fresh one each. Concurrent first loads of the same key may both read the
/// files, but only the first inserted instance is ever handed out.
#[derive(Default)]
pub struct ArtifactCache {
    models: RwLock<AHashMap<ModelKey, Arc<LoadedModel>>>,
    class_names: RwLock<AHashMap<PathBuf, Arc<Vec<String>>>>,
    transforms: RwLock<AHashMap<PathBuf, Arc<PreprocessTransform>>>,
    encoders: RwLock<AHashMap<PathBuf, Arc<LabelEncoder>>>,
    disk_loads: AtomicUsize,
}

fn memoize<K, V>(
    map: &RwLock<AHashMap<K, Arc<V>>>,
    key: &K,
    load: impl FnOnce() -> Result<V>,
) -> Result<Arc<V>>
where
    K: Eq + Hash + Clone,
{
    if let Some(hit) = map.read().get(key) {
        return Ok(hit.clone());
    }

    let loaded = Arc::new(load()?);
    let mut guard = map.write();
    Ok(guard.entry(key.clone()).or_insert(loaded).clone())
}

fn require_file(what: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::NotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Accelerated device when one is present, CPU otherwise
pub fn select_device() -> Device {
    match Device::cuda_if_available(0) {
        Ok(device) => device,
        Err(e) => {
            warn!("CUDA device unavailable, falling back to CPU: {}", e);
            Device::Cpu
        }
    }
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifact files actually read from disk so far
    pub fn disk_loads(&self) -> usize {
        self.disk_loads.load(Ordering::Relaxed)
    }

    /// Load (or fetch) the network for this exact path pair
    pub fn load_model(&self, model_path: &Path, class_names_path: &Path) -> Result<(Arc<LoadedModel>, Device)> {
        let key = (model_path.to_path_buf(), class_names_path.to_path_buf());
        if let Some(hit) = self.models.read().get(&key) {
            debug!(model = %model_path.display(), "Model cache hit");
            return Ok((hit.clone(), hit.device.clone()));
        }

        require_file("Model", model_path)?;
        require_file("Class names", class_names_path)?;

        let class_names = self.load_class_names(class_names_path)?;
        let model = memoize(&self.models, &key, || {
            self.read_model(model_path, class_names)
        })?;
        let device = model.device.clone();
        Ok((model, device))
    }

    fn load_class_names(&self, path: &Path) -> Result<Arc<Vec<String>>> {
        memoize(&self.class_names, &path.to_path_buf(), || {
            self.disk_loads.fetch_add(1, Ordering::Relaxed);
            let file = File::open(path)?;
            let names: Vec<String> = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| Error::load("class names", path, e))?;
            if names.is_empty() {
                return Err(Error::InvalidArtifact(format!(
                    "class names file {} is empty",
                    path.display()
                )));
            }
            Ok(names)
        })
    }

    fn read_model(&self, path: &Path, class_names: Arc<Vec<String>>) -> Result<LoadedModel> {
        self.disk_loads.fetch_add(1, Ordering::Relaxed);
        let device = select_device();

        let tensors = candle_core::safetensors::load(path, &device)
            .map_err(|e| Error::load("model", path, e))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let net = PlantDiseaseNet::new(class_names.len(), vb)
            .map_err(|e| Error::load("model", path, e))?;

        info!(
            model = %path.display(),
            classes = class_names.len(),
            device = ?device,
            "Loaded plant disease model"
        );
        Ok(LoadedModel {
            net,
            device,
            class_names,
        })
    }

    /// Load (or fetch) the preprocessing transform and label encoder
    pub fn load_transforms(
        &self,
        transform_path: &Path,
        label_encoder_path: &Path,
    ) -> Result<(Arc<PreprocessTransform>, Arc<LabelEncoder>)> {
        require_file("Transform", transform_path)?;
        require_file("Label encoder", label_encoder_path)?;

        let transform = memoize(&self.transforms, &transform_path.to_path_buf(), || {
            self.disk_loads.fetch_add(1, Ordering::Relaxed);
            PreprocessTransform::from_file(transform_path)
        })?;
        let encoder = memoize(&self.encoders, &label_encoder_path.to_path_buf(), || {
            self.disk_loads.fetch_add(1, Ordering::Relaxed);
            LabelEncoder::from_file(label_encoder_path)
        })?;
        Ok((transform, encoder))
    }

    /// Resolve the full artifact set for `paths`
    pub fn load_artifacts(&self, paths: &ArtifactPaths) -> Result<ModelArtifactSet> {
        let (model, _) = self.load_model(&paths.model, &paths.class_names)?;
        let (transform, label_encoder) = self.load_transforms(&paths.transform, &paths.label_encoder)?;
        ModelArtifactSet::new(model, transform, label_encoder)
    }
}
