use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

/// Bijection between class indices and class names.
///
/// Index `i` maps to `classes[i]`; names are unique.
#[derive(Debug, Clone, Serialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::InvalidArtifact("label encoder has no classes".into()));
        }

        let mut index = AHashMap::with_capacity(classes.len());
        for (i, name) in classes.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(Error::InvalidArtifact(format!(
                    "label encoder lists class '{}' more than once",
                    name
                )));
            }
        }

        Ok(Self { classes, index })
    }

    /// Read a `{"classes": [...]}` JSON document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let parsed: EncoderFile = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::load("label encoder", path, e))?;
        Self::new(parsed.classes)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}
