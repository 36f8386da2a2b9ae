use crate::ApiError;
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use agroflow_core::Distance;
use agroflow_rag::{SearchService, DEFAULT_COLLECTION, DEFAULT_LIMIT};
use agroflow_vision::{ensure_image_media_type, Classifier, ImageInput};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared handles behind every route
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub search: Arc<SearchService>,
    /// Uploads larger than this are rejected with 413
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>, search: Arc<SearchService>) -> Self {
        Self {
            classifier,
            search,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_collection")]
    collection: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Serialize)]
struct CollectionInfo {
    name: String,
    vectors: VectorConfigResponse,
    points_count: usize,
}

#[derive(Serialize)]
struct VectorConfigResponse {
    size: usize,
    distance: Distance,
}

pub struct RestApi;

impl RestApi {
    /// Register all routes; shared by the server and the route tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/", web::get().to(root))
            .route("/health", web::get().to(health))
            .route("/predict/upload", web::post().to(predict_upload))
            .route("/search", web::post().to(search_documents))
            .route("/search/keyword", web::post().to(keyword_search))
            .route("/collections", web::get().to(list_collections))
            .route("/collections/{name}", web::get().to(get_collection));
    }

    pub async fn start(state: Arc<AppState>, host: String, port: u16) -> std::io::Result<()> {
        info!("Binding HTTP server to {}:{}", host, port);
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::from(state.clone()))
                .configure(RestApi::configure)
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Plant Disease Prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/predict/upload - Upload an image file for prediction",
            "/search - Search document embeddings",
            "/search/keyword - BM25 keyword search over document text",
            "/health - API health check"
        ]
    })))
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    })))
}

async fn predict_upload(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let bad_upload = |e: actix_multipart::MultipartError| ApiError::BadRequest(format!("Invalid upload: {}", e));

    let mut field = loop {
        let field = payload
            .try_next()
            .await
            .map_err(bad_upload)?
            .ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;
        if field.name() == Some(UPLOAD_FIELD) {
            break field;
        }
        debug!(field = ?field.name(), "Skipping multipart field");
    };

    // Checked before the body is read or any model is touched.
    let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
    ensure_image_media_type(content_type.as_deref())
        .map_err(|_| ApiError::BadRequest("File must be an image".into()))?;

    let mut contents = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_upload)? {
        if contents.len() + chunk.len() > state.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "File exceeds the {} byte upload limit",
                state.max_upload_bytes
            )));
        }
        contents.extend_from_slice(&chunk);
    }
    debug!(bytes = contents.len(), content_type = ?content_type, "Received image upload");

    let classifier = state.classifier.clone();
    let image = ImageInput::Bytes(contents.freeze());
    let result = web::block(move || classifier.predict(image))
        .await
        .map_err(|e| ApiError::Internal(format!("Prediction error: {}", e)))?
        .map_err(ApiError::prediction)?;

    Ok(HttpResponse::Ok().json(result))
}

async fn search_documents(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let results = state
        .search
        .search(&params.query, &params.collection, params.limit)
        .await
        .map_err(ApiError::search)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "results": results
    })))
}

async fn keyword_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let results = state
        .search
        .keyword_search(&params.query, &params.collection, params.limit)
        .map_err(ApiError::search)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "results": results
    })))
}

async fn list_collections(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let collections = state.search.store().list_collections();
    Ok(HttpResponse::Ok().json(collections))
}

async fn get_collection(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let collection = state
        .search
        .store()
        .get_collection(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Collection not found: {}", name)))?;

    Ok(HttpResponse::Ok().json(CollectionInfo {
        name: collection.name().to_string(),
        vectors: VectorConfigResponse {
            size: collection.vector_dim(),
            distance: collection.distance(),
        },
        points_count: collection.count(),
    }))
}
