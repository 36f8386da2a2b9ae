use agroflow_api::{AppState, RestApi};
use agroflow_rag::{
    Bootstrapper, EmbeddingProvider, MistralConfig, MistralEmbeddings, SearchService,
    DEFAULT_COLLECTION,
};
use agroflow_vision::{ArtifactCache, ArtifactPaths, Classifier};
use agroflow_core::VectorStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Plant disease prediction and agronomy document search
#[derive(Parser, Debug)]
#[command(name = "agroflow")]
#[command(about = "AgroFlow backend", long_about = None)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Largest accepted image upload, in bytes
    #[arg(long, default_value_t = agroflow_api::DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Model weights (safetensors)
    #[arg(long, default_value = agroflow_vision::artifacts::DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// JSON array of class names
    #[arg(long, default_value = agroflow_vision::artifacts::DEFAULT_CLASS_NAMES_PATH)]
    class_names_path: PathBuf,

    /// Preprocessing transform (JSON)
    #[arg(long, default_value = agroflow_vision::artifacts::DEFAULT_TRANSFORM_PATH)]
    transform_path: PathBuf,

    /// Label encoder (JSON)
    #[arg(long, default_value = agroflow_vision::artifacts::DEFAULT_ENCODER_PATH)]
    label_encoder_path: PathBuf,

    /// Document embeddings table loaded at startup
    #[arg(long, default_value = "RAG/document_embeddings.jsonl")]
    embeddings_path: PathBuf,

    /// Collection the document embeddings are loaded into
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// Mistral API key; search is unavailable without it
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    mistral_api_key: Option<String>,

    /// Mistral embedding model
    #[arg(long, default_value = agroflow_rag::embedding::DEFAULT_MISTRAL_MODEL)]
    embedding_model: String,

    /// Mistral API base URL
    #[arg(long, default_value = agroflow_rag::embedding::DEFAULT_MISTRAL_ENDPOINT)]
    embedding_endpoint: String,
}

impl Args {
    fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            class_names: self.class_names_path.clone(),
            transform: self.transform_path.clone(),
            label_encoder: self.label_encoder_path.clone(),
        }
    }

    fn mistral_config(&self) -> Option<MistralConfig> {
        let key = self.mistral_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        let mut config = MistralConfig::new(key);
        config.model = self.embedding_model.clone();
        config.endpoint = self.embedding_endpoint.clone();
        Some(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting AgroFlow v{}", env!("CARGO_PKG_VERSION"));
    info!("Model: {:?}", args.model_path);
    info!("Embeddings source: {:?}", args.embeddings_path);

    let store = Arc::new(VectorStore::new());
    let report = Bootstrapper::new(store.clone()).load_at_startup(&args.collection, &args.embeddings_path);
    info!(
        "Loaded {} document embeddings for {} ({} skipped)",
        report.upserted, report.collection, report.skipped
    );

    let provider: Option<Arc<dyn EmbeddingProvider>> = match args.mistral_config() {
        Some(config) => Some(Arc::new(MistralEmbeddings::new(config)?)),
        None => {
            warn!("MISTRAL_API_KEY not set; document search is unavailable");
            None
        }
    };

    let state = Arc::new(
        AppState::new(
            Arc::new(Classifier::new(Arc::new(ArtifactCache::new()), args.artifact_paths())),
            Arc::new(SearchService::new(store, provider)),
        )
        .with_max_upload_bytes(args.max_upload_bytes),
    );

    let host = args.host.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, host, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("AgroFlow started");
    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
