use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::iter;

use crate::coords::{BoundingBox, GeoPoint};
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<GeoPoint>,
    #[serde(default)]
    pub holes: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> DomainResult<Self> {
        if exterior.len() < 3 {
            return Err(DomainError::InvalidGeometry(format!(
                "Polygon ring needs at least 3 points, got {}",
                exterior.len()
            )));
        }
        Ok(Self { exterior, holes })
    }

    pub fn rings(&self) -> impl Iterator<Item = &[GeoPoint]> {
        iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Signed shoelace area of the exterior ring in squared degrees.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        ring_signed_area(&self.exterior)
    }

    #[must_use]
    pub fn centroid(&self) -> Option<GeoPoint> {
        ring_centroid(&self.exterior)
    }
}

/// Administrative boundary returned by a boundary lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl Boundary {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> DomainResult<Self> {
        let name = name.into();
        if polygons.is_empty() {
            return Err(DomainError::InvalidGeometry(format!(
                "Boundary '{name}' has no polygons"
            )));
        }
        Ok(Self { name, polygons })
    }

    /// Stable digest of the coordinate sequence. The name is not part of it,
    /// so two lookups resolving to the same geometry share cached datasets.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut canonical = String::new();
        for polygon in &self.polygons {
            canonical.push('P');
            for ring in polygon.rings() {
                canonical.push('R');
                for point in ring {
                    canonical.push_str(&format!("{:.7},{:.7};", point.lat, point.lon));
                }
            }
        }
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.polygons.iter().flat_map(|polygon| &polygon.exterior))
    }

    /// Area-weighted centroid over all member polygons.
    #[must_use]
    pub fn centroid(&self) -> Option<GeoPoint> {
        let mut weight = 0.0;
        let mut lat = 0.0;
        let mut lon = 0.0;

        for polygon in &self.polygons {
            let area = polygon.signed_area().abs();
            if let Some(center) = polygon.centroid() {
                weight += area;
                lat += center.lat * area;
                lon += center.lon * area;
            }
        }

        if weight > f64::EPSILON {
            Some(GeoPoint {
                lat: lat / weight,
                lon: lon / weight,
            })
        } else {
            self.bbox().map(|bbox| bbox.center())
        }
    }
}

fn ring_signed_area(ring: &[GeoPoint]) -> f64 {
    ring_edges(ring)
        .map(|(a, b)| a.lon * b.lat - b.lon * a.lat)
        .sum::<f64>()
        / 2.0
}

fn ring_centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    let area = ring_signed_area(ring);
    if area.abs() <= f64::EPSILON {
        return BoundingBox::from_points(ring).map(|bbox| bbox.center());
    }

    let (lat, lon) = ring_edges(ring).fold((0.0, 0.0), |(lat, lon), (a, b)| {
        let cross = a.lon * b.lat - b.lon * a.lat;
        (lat + (a.lat + b.lat) * cross, lon + (a.lon + b.lon) * cross)
    });

    Some(GeoPoint {
        lat: lat / (6.0 * area),
        lon: lon / (6.0 * area),
    })
}

fn ring_edges(ring: &[GeoPoint]) -> impl Iterator<Item = (&GeoPoint, &GeoPoint)> {
    ring.iter().zip(ring.iter().cycle().skip(1)).take(ring.len())
}
