use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use thiserror::Error;

use domain::cache_key::CacheKey;
use domain::coords::GeoPoint;
use domain::dataset::{FeatureCollection, StreetGraph};
use domain::geometry::Boundary;

/// Payload stored under one cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CacheEntry {
    Streets(Arc<StreetGraph>),
    Features(Arc<FeatureCollection>),
    Coordinates(GeoPoint),
    Boundary(Arc<Boundary>),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error while caching '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("Storage error while caching '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Content-addressed persistent cache. Entries are never evicted.
pub trait DatasetCachePort: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError>;
}

pub type DynDatasetCachePort = Arc<dyn DatasetCachePort>;
