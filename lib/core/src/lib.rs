//! # AgroFlow Core
//!
//! Core data structures for the AgroFlow retrieval pipeline:
//!
//! - [`Vector`] - Dense vector with cosine scoring
//! - [`Point`] - A vector with an id and a payload
//! - [`Collection`] - Fixed-dimension set of points with exact search
//! - [`Bm25Index`] - Keyword ranking over payload text
//! - [`VectorStore`] - Registry of named collections
//!
//! ## Example
//!
//! ```rust
//! use agroflow_core::{CollectionConfig, Distance, Payload, Point, Vector, VectorStore};
//!
//! let store = VectorStore::new();
//! let (collection, _) = store
//!     .ensure_collection(CollectionConfig::new("test", 3, Distance::Cosine))
//!     .unwrap();
//!
//! let point = Point::new("p1", Vector::new(vec![1.0, 0.0, 0.0]), Payload::new());
//! collection.upsert(point).unwrap();
//!
//! let query = Vector::new(vec![1.0, 0.0, 0.0]);
//! let results = collection.search(&query, 10).unwrap();
//! assert_eq!(results.len(), 1);
//! assert!(collection.keyword_search("tournesol", 10).is_empty());
//! ```

pub mod bm25;
pub mod collection;
pub mod error;
pub mod point;
pub mod store;
pub mod vector;

pub use bm25::Bm25Index;
pub use collection::{Collection, CollectionConfig, Distance, TEXT_FIELD};
pub use error::{Error, ErrorKind, Result};
pub use point::{Payload, Point, PointId};
pub use store::{Ensured, VectorStore};
pub use vector::Vector;
