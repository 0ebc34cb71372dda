//! Image ingestion: one blocking round-trip to a hosted CDN that returns a
//! durable, publicly fetchable reference.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// Image ingestion failure. Fatal to item creation: no catalog entry is
/// written when the upload fails.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("image upload failed: {0}")]
    Upload(String),

    #[error("upload endpoint returned no secure_url")]
    MissingSecureUrl,
}

/// A durable reference to an ingested image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub secure_url: String,
}

#[async_trait]
pub trait ImageIngest: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<ImageRef, IngestError>;
}

/// CDN client: posts the blob as multipart form data and reads the durable
/// `secure_url` out of the JSON response.
pub struct HttpImageIngest {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: Option<String>,
}

impl HttpImageIngest {
    pub fn new(endpoint: impl Into<String>, upload_preset: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            upload_preset,
        }
    }
}

#[async_trait]
impl ImageIngest for HttpImageIngest {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<ImageRef, IngestError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| IngestError::Upload(format!("invalid content type: {e}")))?;

        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(preset) = &self.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| IngestError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::Upload(format!(
                "{} responded {}",
                self.endpoint,
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IngestError::Upload(format!("reading upload response: {e}")))?;

        body.get("secure_url")
            .and_then(|v| v.as_str())
            .map(|url| ImageRef {
                secure_url: url.to_string(),
            })
            .ok_or(IngestError::MissingSecureUrl)
    }
}

/// In-memory ingestion for dev/test: hands out stable `memory://` URLs.
#[derive(Debug, Default)]
pub struct InMemoryImageIngest {
    uploads: Mutex<Vec<String>>,
    counter: AtomicU64,
}

impl InMemoryImageIngest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ImageIngest for InMemoryImageIngest {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: &str,
    ) -> Result<ImageRef, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::Upload("empty image payload".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let secure_url = format!("memory://images/{n}-{filename}");
        self.uploads
            .lock()
            .map_err(|_| IngestError::Upload("lock poisoned".to_string()))?
            .push(secure_url.clone());
        Ok(ImageRef { secure_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_ingest_returns_distinct_durable_urls() {
        let ingest = InMemoryImageIngest::new();
        let a = ingest.upload(vec![1, 2, 3], "a.png", "image/png").await.unwrap();
        let b = ingest.upload(vec![4, 5], "b.png", "image/png").await.unwrap();

        assert_ne!(a.secure_url, b.secure_url);
        assert!(a.secure_url.starts_with("memory://images/"));
        assert_eq!(ingest.uploads().len(), 2);
    }

    #[tokio::test]
    async fn in_memory_ingest_rejects_empty_payloads() {
        let ingest = InMemoryImageIngest::new();
        assert!(ingest.upload(vec![], "a.png", "image/png").await.is_err());
        assert!(ingest.uploads().is_empty());
    }
}
