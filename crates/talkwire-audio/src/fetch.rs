use async_trait::async_trait;
use std::path::{Path, PathBuf};
use talkwire_core::{FetchError, ModelConfig, ModelSource};

/// Supplies the engine binaries for a model type. External collaborator
/// seam: applications can bring their own resolution strategy.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn fetch(&self, config: &ModelConfig) -> Result<ModelSource, FetchError>;
}

/// Reads module and data payloads from local paths. An empty location means
/// that payload is not configured and resolves to empty bytes.
pub struct FileModelProvider;

#[async_trait]
impl ModelProvider for FileModelProvider {
    async fn fetch(&self, config: &ModelConfig) -> Result<ModelSource, FetchError> {
        Ok(ModelSource {
            model: config.engine.clone(),
            module: read_optional(&config.module)?,
            data: read_optional(&config.data)?,
        })
    }
}

fn read_optional(location: &str) -> Result<Vec<u8>, FetchError> {
    if location.is_empty() {
        return Ok(Vec::new());
    }
    let path = Path::new(location);
    std::fs::read(path).map_err(|source| FetchError::Io {
        path: PathBuf::from(path),
        source,
    })
}

/// Downloads module and data payloads over HTTP. A non-success status fails
/// with the URL and status code; no retries.
pub struct HttpModelProvider {
    client: reqwest::Client,
}

impl HttpModelProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

impl Default for HttpModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for HttpModelProvider {
    async fn fetch(&self, config: &ModelConfig) -> Result<ModelSource, FetchError> {
        Ok(ModelSource {
            model: config.engine.clone(),
            module: self.fetch_bytes(&config.module).await?,
            data: self.fetch_bytes(&config.data).await?,
        })
    }
}

/// Picks a provider by the module location's scheme.
pub fn provider_for(config: &ModelConfig) -> Box<dyn ModelProvider> {
    if config.module.starts_with("http://") || config.module.starts_with("https://") {
        Box::new(HttpModelProvider::new())
    } else {
        Box::new(FileModelProvider)
    }
}
