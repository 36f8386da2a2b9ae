//! # AgroFlow
//!
//! Backend for an agricultural assistant: plant-disease detection from leaf
//! photos, and semantic search over agronomy documents feeding an advisory
//! flow.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! MISTRAL_API_KEY=... agroflow --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use agroflow::prelude::*;
//! use std::sync::Arc;
//!
//! // Classify a leaf photo
//! let classifier = Classifier::new(Arc::new(ArtifactCache::new()), ArtifactPaths::default());
//! let result = classifier.predict(ImageInput::Path("leaf.jpg".into())).unwrap();
//! println!("{} ({:.1}%)", result.prediction, result.confidence);
//!
//! // Load document embeddings
//! let store = Arc::new(VectorStore::new());
//! let report = Bootstrapper::new(store.clone())
//!     .bootstrap(DEFAULT_COLLECTION, "RAG/document_embeddings.jsonl".as_ref())
//!     .unwrap();
//! println!("{} records", report.upserted);
//! ```
//!
//! ## Crate Structure
//!
//! - `agroflow-core` - vectors, points, collections, the in-memory store
//! - `agroflow-vision` - artifact cache, preprocessing, CNN, classifier
//! - `agroflow-rag` - embeddings bootstrap, embedding provider, search
//! - `agroflow-api` - REST endpoints

// Re-export core types
pub use agroflow_core::{
    Collection, CollectionConfig, Distance, Ensured, ErrorKind, Payload, Point, PointId, Vector,
    VectorStore,
};

// Re-export inference
pub use agroflow_vision::{
    ArtifactCache, ArtifactPaths, ClassificationResult, Classifier, ImageInput, LabelEncoder,
    ModelArtifactSet, Prediction, PreprocessTransform,
};

// Re-export retrieval
pub use agroflow_rag::{
    BootstrapReport, Bootstrapper, EmbeddingProvider, EmbeddingRecord, MistralConfig,
    MistralEmbeddings, SearchHit, SearchService, DEFAULT_COLLECTION, DEFAULT_LIMIT, EMBEDDING_DIM,
};

// Re-export API
pub use agroflow_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactCache, ArtifactPaths, Bootstrapper, ClassificationResult, Classifier,
        CollectionConfig, Distance, EmbeddingProvider, ImageInput, SearchHit, SearchService,
        Vector, VectorStore, DEFAULT_COLLECTION,
    };
}
