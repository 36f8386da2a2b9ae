use crate::{EmbeddingProvider, Error, Result};
use agroflow_core::{Point, Vector, VectorStore, TEXT_FIELD};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub file_name: String,
    pub date: String,
    pub score: f32,
}

impl SearchHit {
    /// Missing payload fields become `""`
    fn from_scored((point, score): (Point, f32)) -> Self {
        Self {
            text: point.payload_str(TEXT_FIELD).to_string(),
            file_name: point.payload_str("file_name").to_string(),
            date: point.payload_str("date").to_string(),
            score,
        }
    }
}

/// Query-time half of the RAG pipeline: embedded nearest-neighbor search,
/// plus BM25 keyword lookup over the same collection
pub struct SearchService {
    store: Arc<VectorStore>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl SearchService {
    pub fn new(store: Arc<VectorStore>, provider: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Up to `limit` BM25 keyword hits from `collection_name`, best first.
    ///
    /// Needs no embedding provider; scores are BM25, not cosine.
    pub fn keyword_search(&self, query: &str, collection_name: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let collection = self.store.collection(collection_name)?;
        let results = collection.keyword_search(query, limit);
        debug!(collection = collection_name, hits = results.len(), "Keyword search complete");
        Ok(results.into_iter().map(SearchHit::from_scored).collect())
    }

    /// Up to `limit` hits from `collection_name`, best first.
    ///
    /// An empty collection answers without contacting the provider.
    pub async fn search(&self, query: &str, collection_name: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| Error::ServiceUnavailable("embedding provider is not configured".into()))?;
        let collection = self.store.collection(collection_name)?;

        if limit == 0 || collection.is_empty() {
            return Ok(Vec::new());
        }

        let expected = collection.vector_dim();
        if provider.dimension() != expected {
            return Err(Error::DimensionMismatch {
                collection: collection_name.to_string(),
                expected,
                actual: provider.dimension(),
            });
        }

        let embedding = provider.embed_one(query).await?;
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch {
                collection: collection_name.to_string(),
                expected,
                actual: embedding.len(),
            });
        }

        let results = collection.search(&Vector::new(embedding), limit)?;
        debug!(collection = collection_name, hits = results.len(), "Search complete");

        Ok(results.into_iter().map(SearchHit::from_scored).collect())
    }
}
