//! External image host boundary.
//!
//! Profile mutations that supersede an image hand the old URL to the
//! `CleanupQueue` after their transaction commits; a background worker
//! drains the queue and asks the media host to remove the asset. Cleanup
//! is best-effort by contract: failures are logged and dropped, never
//! surfaced to the request that scheduled them.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::CONFIG;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("cannot derive asset id from url: {0}")]
    BadUrl(String),

    #[error("media host rejected deletion with HTTP {0}")]
    Rejected(u16),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn delete_image(&self, url: &str) -> Result<(), MediaError>;
}

/// HTTP client for the hosted media service. Assets are addressed by the
/// public id embedded in the delivery URL's last path segment.
pub struct HttpMediaStore {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HttpMediaStore {
    pub fn from_config() -> Self {
        let media = &CONFIG.media;
        Self {
            client: reqwest::Client::new(),
            api_base: media.api_base.clone(),
            api_key: media.api_key.clone(),
        }
    }

    fn asset_id(url: &str) -> Result<String, MediaError> {
        let parsed = url::Url::parse(url).map_err(|_| MediaError::BadUrl(url.to_string()))?;
        let segment = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MediaError::BadUrl(url.to_string()))?;
        // Strip the format extension: "abc123.png" -> "abc123"
        let id = segment.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(segment);
        if id.is_empty() {
            return Err(MediaError::BadUrl(url.to_string()));
        }
        Ok(id.to_string())
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn delete_image(&self, url: &str) -> Result<(), MediaError> {
        let asset = Self::asset_id(url)?;
        let response = self
            .client
            .post(format!("{}/image/destroy", self.api_base))
            .json(&serde_json::json!({ "public_id": asset, "api_key": self.api_key }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Post-commit deletion jobs for superseded images. Enqueueing never
/// blocks the request: a full or closed queue drops the job with a
/// warning.
#[derive(Clone)]
pub struct CleanupQueue {
    tx: mpsc::Sender<String>,
}

impl CleanupQueue {
    pub fn start(store: Arc<dyn MediaStore>) -> Self {
        let (tx, rx) = mpsc::channel(CONFIG.media.cleanup_queue_depth);
        tokio::spawn(drain(rx, store));
        Self { tx }
    }

    pub fn enqueue(&self, url: impl Into<String>) {
        let url = url.into();
        if url.is_empty() {
            return;
        }
        if let Err(err) = self.tx.try_send(url) {
            warn!("image cleanup job dropped: {}", err);
        }
    }
}

async fn drain(mut rx: mpsc::Receiver<String>, store: Arc<dyn MediaStore>) {
    while let Some(url) = rx.recv().await {
        match store.delete_image(&url).await {
            Ok(()) => debug!("removed superseded image: {}", url),
            Err(err) => warn!("image cleanup failed for {}: {}", url, err),
        }
    }
}
