//! # AgroFlow RAG
//!
//! Document retrieval for the advisory flow:
//!
//! - [`Bootstrapper`] - loads an `(id, vector, payload)` table into a collection
//! - [`EmbeddingProvider`] / [`MistralEmbeddings`] - query embedding
//! - [`SearchService`] - embed a question and return the nearest [`SearchHit`]s

pub mod bootstrap;
pub mod embedding;
pub mod error;
pub mod search;

pub use bootstrap::{BootstrapReport, Bootstrapper, EmbeddingRecord, RowError, DEFAULT_COLLECTION};
pub use embedding::{EmbeddingProvider, MistralConfig, MistralEmbeddings, EMBEDDING_DIM};
pub use error::{Error, Result};
pub use search::{SearchHit, SearchService, DEFAULT_LIMIT};
