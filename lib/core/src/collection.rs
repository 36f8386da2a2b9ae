use crate::{Bm25Index, Error, Point, PointId, Result, Vector};
use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Configuration for a collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    pub name: String,
    pub vector_dim: usize,
    pub distance: Distance,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, vector_dim: usize, distance: Distance) -> Self {
        Self {
            name: name.into(),
            vector_dim,
            distance,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vector_dim: 1024,
            distance: Distance::Cosine,
        }
    }
}

/// Vector similarity metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
}

/// Payload field indexed for keyword search
pub const TEXT_FIELD: &str = "text";

#[derive(Debug, Default)]
struct Points {
    by_id: AHashMap<PointId, Point>,
    keywords: Bm25Index,
}

impl Points {
    fn insert(&mut self, point: Point) {
        self.keywords.insert_doc(&point.id, point.payload_str(TEXT_FIELD));
        self.by_id.insert(point.id.clone(), point);
    }
}

/// A named set of points sharing one dimensionality and metric.
///
/// Every point's `text` payload is also kept in a BM25 index.
#[derive(Debug)]
pub struct Collection {
    config: CollectionConfig,
    points: RwLock<Points>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            points: RwLock::new(Points::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn distance(&self) -> Distance {
        self.config.distance
    }

    pub fn count(&self) -> usize {
        self.points.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().by_id.is_empty()
    }

    fn check_dim(&self, vector: &Vector) -> Result<()> {
        if vector.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: vector.dim(),
            });
        }
        Ok(())
    }

    /// Insert or overwrite a point by id
    pub fn upsert(&self, point: Point) -> Result<()> {
        self.check_dim(&point.vector)?;
        self.points.write().insert(point);
        Ok(())
    }

    /// Upsert a batch under a single write lock.
    ///
    /// The whole batch is validated first, so a dimension error leaves the
    /// collection untouched.
    pub fn batch_upsert(&self, batch: Vec<Point>) -> Result<usize> {
        for point in &batch {
            self.check_dim(&point.vector)?;
        }

        let count = batch.len();
        let mut points = self.points.write();
        for point in batch {
            points.insert(point);
        }
        Ok(count)
    }

    pub fn get(&self, id: &PointId) -> Option<Point> {
        self.points.read().by_id.get(id).cloned()
    }

    fn score(&self, point: &Point, query: &Vector) -> f32 {
        match self.config.distance {
            Distance::Cosine => point.vector.cosine_similarity(query),
        }
    }

    /// Exact nearest-neighbor search.
    ///
    /// Results are ordered by descending score; equal scores are ordered by
    /// ascending point id so identical inputs always rank identically.
    pub fn search(&self, query: &Vector, limit: usize) -> Result<Vec<(Point, f32)>> {
        self.check_dim(query)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let points = self.points.read();
        let mut scored: Vec<(&Point, f32)> = points
            .by_id
            .values()
            .map(|point| (point, self.score(point, query)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(point, score)| (point.clone(), score))
            .collect())
    }

    /// BM25 keyword search over the `text` payload field.
    ///
    /// Only points sharing a term with `query` are returned, best first,
    /// equal scores by ascending id.
    pub fn keyword_search(&self, query: &str, limit: usize) -> Vec<(Point, f32)> {
        let points = self.points.read();
        points
            .keywords
            .search(query, limit)
            .into_iter()
            .filter_map(|(id, score)| points.by_id.get(&id).map(|p| (p.clone(), score)))
            .collect()
    }
}
