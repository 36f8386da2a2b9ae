use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Dimensionality of `mistral-embed` vectors and of the document collections
pub const EMBEDDING_DIM: usize = 1024;

pub const DEFAULT_MISTRAL_ENDPOINT: &str = "https://api.mistral.ai";
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-embed";

/// Turns text into fixed-dimension vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// One vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::ServiceUnavailable("provider returned no embedding".into()))
    }
}

#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub dimension: usize,
    pub timeout: Duration,
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MISTRAL_MODEL.to_string(),
            endpoint: DEFAULT_MISTRAL_ENDPOINT.to_string(),
            dimension: EMBEDDING_DIM,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Client for the Mistral `/v1/embeddings` endpoint
pub struct MistralEmbeddings {
    client: reqwest::Client,
    config: MistralConfig,
}

impl MistralEmbeddings {
    pub fn new(config: MistralConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ServiceUnavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    fn url(&self) -> String {
        format!("{}/v1/embeddings", self.config.endpoint.trim_end_matches('/'))
    }
}

fn collect_embeddings(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(Error::ServiceUnavailable(format!(
            "expected {} embeddings, provider returned {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for MistralEmbeddings {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.config.model, inputs = texts.len(), "Requesting embeddings");
        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ServiceUnavailable(format!(
                "embedding request failed: HTTP {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("invalid embedding response: {}", e)))?;
        collect_embeddings(parsed, texts.len())
    }
}
