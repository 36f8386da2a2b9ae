// Integration tests for AgroFlow
use agroflow::prelude::*;
use agroflow::{EmbeddingProvider, ErrorKind, PointId};
use agroflow_vision::{ensure_image_media_type, fixtures};
use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use std::io::Write;
use std::sync::Arc;

const CLASSES: [&str; 12] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___healthy",
    "Corn___Common_rust",
    "Corn___healthy",
    "Grape___Black_rot",
    "Grape___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Tomato___Leaf_Mold",
    "Tomato___healthy",
];

fn leaf() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(48, 40, |x, y| {
        image::Rgb([(x * 5) as u8, 120, (y * 6) as u8])
    }))
}

fn embeddings_file(rows: &[serde_json::Value]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

fn row(id: &str, dim: usize, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "vector": vec![0.5f32; dim],
        "payload": {"text": text, "file_name": format!("{id}.md")},
    })
}

struct ConstantProvider(usize);

#[async_trait]
impl EmbeddingProvider for ConstantProvider {
    fn dimension(&self) -> usize {
        self.0
    }

    async fn embed(&self, texts: &[String]) -> agroflow_rag::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; self.0]).collect())
    }
}

#[test]
fn test_uniform_model_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixtures::write_artifacts(dir.path(), &CLASSES, 32).unwrap();
    let classifier = Classifier::new(Arc::new(ArtifactCache::new()), paths);

    let result = classifier.predict(leaf()).unwrap();

    assert!((result.confidence - 100.0 / 12.0).abs() < 1e-3);
    assert_eq!(result.top_predictions.len(), 3);
    assert_eq!(result.prediction, CLASSES[0]);
    assert_eq!(result.top_predictions[0].disease, result.prediction);
    for pair in result.top_predictions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn test_artifacts_loaded_once_per_path_pair() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixtures::write_artifacts(dir.path(), &CLASSES, 32).unwrap();
    let cache = Arc::new(ArtifactCache::new());
    let classifier = Classifier::new(cache.clone(), paths.clone());

    classifier.predict(leaf()).unwrap();
    let loads = cache.disk_loads();
    classifier.predict(leaf()).unwrap();
    assert_eq!(cache.disk_loads(), loads);

    let (first, _) = cache.load_model(&paths.model, &paths.class_names).unwrap();
    let (second, _) = cache.load_model(&paths.model, &paths.class_names).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_path_and_bytes_inputs_agree() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixtures::write_artifacts(dir.path(), &CLASSES[..4], 32).unwrap();
    let classifier = Classifier::new(Arc::new(ArtifactCache::new()), paths);

    let image_path = dir.path().join("leaf.png");
    leaf().save(&image_path).unwrap();
    let bytes = std::fs::read(&image_path).unwrap();

    let from_path = classifier.predict(ImageInput::Path(image_path)).unwrap();
    let from_bytes = classifier.predict(bytes).unwrap();
    assert_eq!(from_path, from_bytes);
}

#[test]
fn test_pdf_rejected_before_inference() {
    let err = ensure_image_media_type(Some("application/pdf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(ensure_image_media_type(Some("image/jpeg")).is_ok());
}

#[test]
fn test_bootstrap_twice_counts_distinct_ids() {
    let store = Arc::new(VectorStore::new());
    let source = embeddings_file(&[row("a", 8, "one"), row("b", 8, "two"), row("a", 8, "one again")]);
    let bootstrapper = Bootstrapper::new(store.clone()).with_dimension(8);

    let first = bootstrapper.bootstrap(DEFAULT_COLLECTION, source.path()).unwrap();
    let second = bootstrapper.bootstrap(DEFAULT_COLLECTION, source.path()).unwrap();
    assert!(first.created);
    assert!(!second.created);

    let collection = store.collection(DEFAULT_COLLECTION).unwrap();
    assert_eq!(collection.count(), 2);
    let a = collection.get(&PointId::from("a")).unwrap();
    assert_eq!(a.payload_str("text"), "one again");
}

#[test]
fn test_bootstrap_missing_source_is_noop() {
    let store = Arc::new(VectorStore::new());
    let report = Bootstrapper::new(store.clone())
        .bootstrap(DEFAULT_COLLECTION, "does/not/exist.jsonl".as_ref())
        .unwrap();
    assert_eq!(report.upserted, 0);
}

#[test]
fn test_startup_survives_unreadable_source() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(VectorStore::new());

    let report = Bootstrapper::new(store.clone()).load_at_startup(DEFAULT_COLLECTION, dir.path());
    assert_eq!(report.upserted, 0);
    assert!(store.list_collections().is_empty());
}

#[tokio::test]
async fn test_search_empty_collection_returns_nothing() {
    let store = Arc::new(VectorStore::new());
    store
        .ensure_collection(CollectionConfig::new(DEFAULT_COLLECTION, 1024, Distance::Cosine))
        .unwrap();
    let service = SearchService::new(store, Some(Arc::new(ConstantProvider(1024))));

    let hits = service
        .search("quelle est la production de tournesol", DEFAULT_COLLECTION, 5)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_bootstrap_then_search() {
    let store = Arc::new(VectorStore::new());
    let source = embeddings_file(&[row("tournesol", 4, "Production de tournesol"), row("colza", 4, "Colza")]);
    Bootstrapper::new(store.clone())
        .with_dimension(4)
        .bootstrap(DEFAULT_COLLECTION, source.path())
        .unwrap();

    let service = SearchService::new(store, Some(Arc::new(ConstantProvider(4))));
    let hits = service.search("tournesol", DEFAULT_COLLECTION, 5).await.unwrap();

    assert_eq!(hits.len(), 2);
    // Identical vectors tie on score and fall back to id order
    assert_eq!(hits[0].file_name, "colza.md");
    assert_eq!(hits[1].file_name, "tournesol.md");
    assert_eq!(hits[0].date, "");

    let keyword_hits = service.keyword_search("production", DEFAULT_COLLECTION, 5).unwrap();
    assert_eq!(keyword_hits.len(), 1);
    assert_eq!(keyword_hits[0].file_name, "tournesol.md");
}

#[tokio::test]
async fn test_search_without_provider_is_unavailable() {
    let service = SearchService::new(Arc::new(VectorStore::new()), None);
    let err = service.search("mildiou", DEFAULT_COLLECTION, 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}
