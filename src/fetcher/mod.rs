//! Downloads resolved photos into the photo store.
//!
//! The fetch stage also owns the resume check: a committed photo of at
//! least `min_bytes` counts as done and is never downloaded again.

pub mod store;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::http::HttpTransport;

pub use store::{DiskStore, PhotoStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub filename: String,
    pub byte_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded(StoredPhoto),
    /// A valid photo was already stored; nothing was requested.
    AlreadyPresent(StoredPhoto),
}

impl FetchOutcome {
    pub fn photo(&self) -> &StoredPhoto {
        match self {
            FetchOutcome::Downloaded(photo) | FetchOutcome::AlreadyPresent(photo) => photo,
        }
    }
}

/// Content types accepted as photo payloads.
fn is_image_content_type(content_type: &str) -> bool {
    content_type.contains("image") || content_type.contains("octet-stream")
}

pub struct ImageFetcher {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn PhotoStore>,
    min_bytes: u64,
    timeout: Duration,
}

impl ImageFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn PhotoStore>,
        config: &FetcherConfig,
    ) -> Self {
        Self {
            transport,
            store,
            min_bytes: config.min_bytes,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The stored photo for `filename` if a previous run completed it.
    pub fn existing(&self, filename: &str) -> Option<StoredPhoto> {
        self.store
            .existing_size(filename)
            .filter(|size| *size >= self.min_bytes)
            .map(|byte_size| StoredPhoto {
                filename: filename.to_string(),
                byte_size,
            })
    }

    /// Delete a file under `filename` that is too small to count as a photo.
    pub fn clear_incomplete(&self, filename: &str) -> Result<(), FetchError> {
        if let Some(byte_size) = self.store.existing_size(filename) {
            if byte_size < self.min_bytes {
                debug!("  removing undersized {} ({} bytes)", filename, byte_size);
                self.store.remove(filename)?;
            }
        }
        Ok(())
    }

    /// Download `url` as `filename` unless a valid photo is already there.
    /// An undersized leftover under `filename` is deleted first.
    ///
    /// On error nothing is left under `filename`.
    pub fn fetch(&self, url: &str, filename: &str) -> Result<FetchOutcome, FetchError> {
        if let Some(photo) = self.existing(filename) {
            return Ok(FetchOutcome::AlreadyPresent(photo));
        }
        self.clear_incomplete(filename)?;

        let mut response = self.transport.get(url, &[], self.timeout)?;
        debug!("  GET {} -> {}", url, response.status);

        let content_type = response.content_type.take().unwrap_or_default();
        if !is_image_content_type(&content_type) {
            let shown = if content_type.is_empty() {
                "no content type".to_string()
            } else {
                content_type
            };
            return Err(FetchError::NotAnImage(shown));
        }

        let byte_size = match self.store.stage(filename, &mut response.body) {
            Ok(size) => size,
            Err(e) => {
                self.store.discard(filename);
                return Err(e.into());
            }
        };

        if byte_size < self.min_bytes {
            self.store.discard(filename);
            return Err(FetchError::TooSmall {
                size: byte_size,
                min: self.min_bytes,
            });
        }

        if let Err(e) = self.store.commit(filename) {
            self.store.discard(filename);
            return Err(e.into());
        }

        Ok(FetchOutcome::Downloaded(StoredPhoto {
            filename: filename.to_string(),
            byte_size,
        }))
    }
}
