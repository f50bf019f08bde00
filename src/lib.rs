//! Photo enrichment for the historical persons catalog.
//!
//! Reads person records from the seed SQL files, finds a photo for each one
//! on the encyclopedia search API, stores it under a stable name and writes
//! conditional `UPDATE` statements pointing the catalog at the new photos.
//! Re-running is safe: completed photos are detected on disk and skipped.

pub mod config;
pub mod corpus;
pub mod emitter;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod logging;
pub mod naming;
pub mod pipeline;
pub mod resolver;

pub use config::Config;
pub use corpus::PersonDescriptor;
pub use emitter::{UpdateEmitter, UpdateRecord};
pub use fetcher::{DiskStore, FetchOutcome, ImageFetcher, PhotoStore, StoredPhoto};
pub use http::{HttpTransport, UreqTransport};
pub use pipeline::{Pipeline, RunSummary};
pub use resolver::{ImageResolver, OverrideTable};
