use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::dataset::DatasetKind;
use crate::fetch_spec::{FetchSpec, NetworkType};
use crate::tags::TagFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryScope {
    /// Subdistrict or country lookups.
    Region,
    /// City delineation lookups.
    City,
}

impl BoundaryScope {
    fn prefix(self) -> &'static str {
        match self {
            Self::Region => "boundary",
            Self::City => "boundary_city",
        }
    }
}

/// Content address of one cached query: a canonical string plus its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    canonical: String,
    digest: String,
}

impl CacheKey {
    fn from_canonical(canonical: String) -> Self {
        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
        Self { canonical, digest }
    }

    #[must_use]
    pub fn streets(spec: &FetchSpec, network: NetworkType) -> Self {
        Self::from_canonical(format!("graph|{}|{network}", area_component(spec)))
    }

    #[must_use]
    pub fn features(kind: DatasetKind, spec: &FetchSpec, filter: &TagFilter) -> Self {
        Self::from_canonical(format!(
            "{kind}|{}|{}",
            area_component(spec),
            filter.canonical()
        ))
    }

    #[must_use]
    pub fn coordinates(city: &str, country: &str) -> Self {
        Self::from_canonical(format!(
            "coords|{}|{}",
            normalize_name(city),
            normalize_name(country)
        ))
    }

    #[must_use]
    pub fn boundary(scope: BoundaryScope, name: &str) -> Self {
        Self::from_canonical(format!("{}|{}", scope.prefix(), normalize_name(name)))
    }

    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

fn area_component(spec: &FetchSpec) -> String {
    match spec {
        FetchSpec::Radius { center, radius_m } => {
            format!("point|{}|{}|{radius_m}", center.lat, center.lon)
        }
        FetchSpec::Boundary(boundary) => format!("polygon|{}", boundary.fingerprint()),
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
