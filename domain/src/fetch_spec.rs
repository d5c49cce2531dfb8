use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::coords::{BoundingBox, GeoPoint};
use crate::error::{DomainError, DomainResult};
use crate::geometry::Boundary;

/// Resolved area to fetch for one poster job.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchSpec {
    Radius { center: GeoPoint, radius_m: u32 },
    Boundary(Arc<Boundary>),
}

impl FetchSpec {
    pub fn radius(center: GeoPoint, radius_m: u32) -> DomainResult<Self> {
        center.validate()?;
        if radius_m == 0 {
            return Err(DomainError::InvalidGeometry(
                "Fetch radius must be greater than 0".to_string(),
            ));
        }
        Ok(Self::Radius { center, radius_m })
    }

    #[must_use]
    pub fn boundary(boundary: Boundary) -> Self {
        Self::Boundary(Arc::new(boundary))
    }

    /// Point printed on the poster: the center, or the boundary centroid.
    #[must_use]
    pub fn display_point(&self) -> Option<GeoPoint> {
        match self {
            Self::Radius { center, .. } => Some(*center),
            Self::Boundary(boundary) => boundary.centroid(),
        }
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Self::Radius { center, radius_m } => {
                Some(BoundingBox::around(*center, f64::from(*radius_m)))
            }
            Self::Boundary(boundary) => boundary.bbox(),
        }
    }
}

impl fmt::Display for FetchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radius { center, radius_m } => write!(f, "point({center}) r={radius_m}m"),
            Self::Boundary(boundary) => write!(f, "boundary({})", boundary.name),
        }
    }
}

/// OSM street network profile, mirrors the usual routing profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    Drive,
    DriveService,
    Walk,
    Bike,
    All,
}

impl NetworkType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::DriveService => "drive_service",
            Self::Walk => "walk",
            Self::Bike => "bike",
            Self::All => "all",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
