//! Content-addressed dataset cache stored as one JSON document per key.
//!
//! Files are named `{sha256}.json` after the key digest and written through a
//! temporary sibling plus rename, so a reader never observes a partial file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use cityposter_application::ports::outgoing::dataset_cache::{
    CacheEntry, CacheError, DatasetCachePort,
};
use domain::cache_key::CacheKey;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    stored_at: i64,
    entry: CacheEntry,
}

pub struct JsonDirCache {
    root: PathBuf,
}

impl JsonDirCache {
    /// Creates the cache directory when missing.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.json", key.digest()))
    }

    fn storage_error(key: &CacheKey, source: io::Error) -> CacheError {
        CacheError::Storage {
            key: key.canonical().to_string(),
            source,
        }
    }

    fn write_atomic(&self, key: &CacheKey, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root).map_err(|e| Self::storage_error(key, e))?;
        let target = self.entry_path(key);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", key.digest(), Uuid::new_v4().simple()));

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &target)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!(error = %cleanup, "Temporary cache file already gone");
            }
            return Err(Self::storage_error(key, e));
        }
        Ok(())
    }
}

impl DatasetCachePort for JsonDirCache {
    #[instrument(skip(self), fields(key = %key))]
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let bytes = match fs::read(self.entry_path(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::storage_error(key, e)),
        };

        let stored: StoredEntry =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
                key: key.canonical().to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(stored.entry))
    }

    #[instrument(skip(self, entry), fields(key = %key))]
    fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        let stored = StoredEntry {
            key: key.canonical().to_string(),
            stored_at: OffsetDateTime::now_utc().unix_timestamp(),
            entry: entry.clone(),
        };
        let bytes = serde_json::to_vec(&stored).map_err(|e| CacheError::Serialization {
            key: key.canonical().to_string(),
            message: e.to_string(),
        })?;
        self.write_atomic(key, &bytes)?;
        debug!(bytes = bytes.len(), "Cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::cache_key::BoundaryScope;
    use domain::coords::GeoPoint;
    use domain::dataset::{StreetEdge, StreetGraph};
    use domain::fetch_spec::{FetchSpec, NetworkType};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn cache() -> (TempDir, JsonDirCache) {
        let dir = TempDir::new().expect("temp dir");
        let cache = JsonDirCache::new(dir.path().join("cache")).expect("cache dir");
        (dir, cache)
    }

    fn graph() -> StreetGraph {
        StreetGraph {
            nodes: BTreeMap::from([
                (1, GeoPoint { lat: 0.0, lon: 0.0 }),
                (2, GeoPoint { lat: 0.0, lon: 0.01 }),
            ]),
            edges: vec![StreetEdge {
                from: 1,
                to: 2,
                highway: Some("primary".to_string()),
            }],
        }
    }

    fn streets_key() -> CacheKey {
        let spec = FetchSpec::radius(GeoPoint { lat: 0.0, lon: 0.0 }, 1000).expect("spec");
        CacheKey::streets(&spec, NetworkType::Drive)
    }

    #[test]
    fn missing_entry_is_a_miss() {
        let (_dir, cache) = cache();
        assert!(cache.get(&streets_key()).expect("read").is_none());
    }

    #[test]
    fn stored_entry_is_read_back_from_hashed_file() {
        let (_dir, cache) = cache();
        let key = streets_key();
        let entry = CacheEntry::Streets(Arc::new(graph()));

        cache.set(&key, &entry).expect("write");

        assert_eq!(cache.get(&key).expect("read"), Some(entry));
        let expected = cache.root().join(format!("{}.json", key.digest()));
        assert!(expected.is_file());
        let leftovers = fs::read_dir(cache.root())
            .expect("list")
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn entries_survive_a_new_cache_instance() {
        let (dir, cache) = cache();
        let key = CacheKey::coordinates("Paris", "France");
        let entry = CacheEntry::Coordinates(GeoPoint {
            lat: 48.85,
            lon: 2.35,
        });
        cache.set(&key, &entry).expect("write");
        drop(cache);

        let reopened = JsonDirCache::new(dir.path().join("cache")).expect("cache dir");

        assert_eq!(reopened.get(&key).expect("read"), Some(entry));
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let (_dir, cache) = cache();
        let key = CacheKey::boundary(BoundaryScope::City, "Bandung, Indonesia");
        fs::write(cache.entry_path(&key), b"{not json").expect("write garbage");

        let err = cache.get(&key).expect_err("corrupt entry");

        assert!(matches!(err, CacheError::Serialization { ref key, .. } if key.starts_with("boundary_city|")));
    }

    #[test]
    fn unwritable_location_is_a_storage_error() {
        let dir = TempDir::new().expect("temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file").expect("write file");
        let cache = JsonDirCache {
            root: blocker.join("cache"),
        };

        let err = cache
            .set(&streets_key(), &CacheEntry::Streets(Arc::new(graph())))
            .expect_err("cannot create dir under a file");

        assert!(matches!(err, CacheError::Storage { .. }));
    }
}
