use crate::embedding::EMBEDDING_DIM;
use crate::{Error, Result};
use agroflow_core::{CollectionConfig, Distance, Payload, Point, PointId, Vector, VectorStore};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_COLLECTION: &str = "technical_reports";

/// One row of the embeddings table
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// Why a single row was skipped
#[derive(Error, Debug)]
pub enum RowError {
    #[error("row is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row is not an object")]
    NotAnObject,

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("id must be a string or unsigned integer, got {0}")]
    BadId(Value),

    #[error("vector must be an array of numbers")]
    BadVector,

    #[error("vector has {actual} components, collection expects {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("payload must be an object")]
    BadPayload,
}

impl EmbeddingRecord {
    /// Parse `{"id": .., "vector": [..], "payload": {..}}`
    pub fn from_row(row: Value, vector_dim: usize) -> std::result::Result<Self, RowError> {
        let Value::Object(mut row) = row else {
            return Err(RowError::NotAnObject);
        };

        let id = match row.remove("id").ok_or(RowError::MissingColumn("id"))? {
            Value::String(s) if !s.is_empty() => PointId::parse(&s),
            Value::Number(n) if n.is_u64() => PointId::Integer(n.as_u64().unwrap_or_default()),
            other => return Err(RowError::BadId(other)),
        };

        let vector = match row.remove("vector").ok_or(RowError::MissingColumn("vector"))? {
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_f64().map(|x| x as f32))
                .collect::<Option<Vec<f32>>>()
                .ok_or(RowError::BadVector)?,
            _ => return Err(RowError::BadVector),
        };
        if vector.len() != vector_dim {
            return Err(RowError::Dimension {
                expected: vector_dim,
                actual: vector.len(),
            });
        }

        let payload = match row.remove("payload").ok_or(RowError::MissingColumn("payload"))? {
            Value::Object(map) => map,
            _ => return Err(RowError::BadPayload),
        };

        Ok(Self { id, vector, payload })
    }

    pub fn into_point(self) -> Point {
        Point::new(self.id, Vector::new(self.vector), self.payload)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub collection: String,
    /// Whether this run created the collection
    pub created: bool,
    /// Records written to the collection
    pub upserted: usize,
    /// Rows skipped as malformed
    pub skipped: usize,
}

/// Populates named collections from an embeddings table on disk.
///
/// The table is JSON Lines: one `{"id", "vector", "payload"}` object per
/// line. Each line is parsed on its own, so a broken line only loses that
/// row.
pub struct Bootstrapper {
    store: Arc<VectorStore>,
    vector_dim: usize,
    distance: Distance,
}

impl Bootstrapper {
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self {
            store,
            vector_dim: EMBEDDING_DIM,
            distance: Distance::Cosine,
        }
    }

    pub fn with_dimension(mut self, vector_dim: usize) -> Self {
        self.vector_dim = vector_dim;
        self
    }

    pub fn bootstrap(&self, collection_name: &str, source: &Path) -> Result<BootstrapReport> {
        let mut report = BootstrapReport {
            collection: collection_name.to_string(),
            ..Default::default()
        };

        if !source.exists() {
            info!("Document embeddings file not found at {}", source.display());
            return Ok(report);
        }

        // Read before touching the store so an unreadable source leaves no collection.
        let rows = read_rows(source)?;

        let config = CollectionConfig::new(collection_name, self.vector_dim, self.distance);
        let (collection, ensured) = self.store.ensure_collection(config)?;
        report.created = ensured.created();
        let vector_dim = collection.vector_dim();

        let mut points = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            match row.and_then(|value| EmbeddingRecord::from_row(value, vector_dim)) {
                Ok(record) => points.push(record.into_point()),
                Err(e) => {
                    report.skipped += 1;
                    warn!(
                        source = %source.display(),
                        row = line,
                        "Skipping embedding row: {}",
                        e
                    );
                }
            }
        }

        if !points.is_empty() {
            report.upserted = collection.batch_upsert(points)?;
        }

        info!(
            collection = collection_name,
            upserted = report.upserted,
            skipped = report.skipped,
            total = collection.count(),
            "Loaded document embeddings"
        );
        Ok(report)
    }

    /// [`bootstrap`](Self::bootstrap) for server startup: a failure is
    /// logged and yields an empty report so the server still comes up.
    pub fn load_at_startup(&self, collection_name: &str, source: &Path) -> BootstrapReport {
        self.bootstrap(collection_name, source).unwrap_or_else(|e| {
            error!("Error loading document embeddings: {}", e);
            BootstrapReport {
                collection: collection_name.to_string(),
                ..Default::default()
            }
        })
    }
}

type Row = (usize, std::result::Result<Value, RowError>);

/// Rows tagged with their 1-based position in the source
fn read_rows(source: &Path) -> Result<Vec<Row>> {
    let io_err = |e| Error::Source {
        path: source.to_path_buf(),
        source: e,
    };
    let reader = BufReader::new(File::open(source).map_err(io_err)?);

    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push((i + 1, serde_json::from_str(&line).map_err(RowError::from)));
    }
    Ok(rows)
}
