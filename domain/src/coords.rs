use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::error::{DomainError, DomainResult};

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "WGS84 coordinate pair in decimal degrees",
    example = json!({"lat": -6.2, "lon": 106.8})
))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> DomainResult<Self> {
        let point = Self { lat, lon };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(DomainError::InvalidCoordinates(format!(
                "Coordinates must be finite, got ({}, {})",
                self.lat, self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(DomainError::InvalidCoordinates(format!(
                "Latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(DomainError::InvalidCoordinates(format!(
                "Longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Human readable label in the form `6.2000° S / 106.8000° E`.
    #[must_use]
    pub fn display_label(&self) -> String {
        let lat_hemisphere = if self.lat >= 0.0 { 'N' } else { 'S' };
        let lon_hemisphere = if self.lon >= 0.0 { 'E' } else { 'W' };
        format!(
            "{:.4}° {} / {:.4}° {}",
            self.lat.abs(),
            lat_hemisphere,
            self.lon.abs(),
            lon_hemisphere
        )
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Square box of `radius_m` metres in every direction around `center`.
    #[must_use]
    pub fn around(center: GeoPoint, radius_m: f64) -> Self {
        let lat_delta = radius_m / METERS_PER_DEGREE_LAT;
        let lon_scale = center.lat.to_radians().cos().abs().max(1e-6);
        let lon_delta = radius_m / (METERS_PER_DEGREE_LAT * lon_scale);

        Self {
            south: (center.lat - lat_delta).max(-90.0),
            west: (center.lon - lon_delta).max(-180.0),
            north: (center.lat + lat_delta).min(90.0),
            east: (center.lon + lon_delta).min(180.0),
        }
    }

    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        points.into_iter().fold(None, |acc, point| {
            Some(match acc {
                None => Self {
                    south: point.lat,
                    west: point.lon,
                    north: point.lat,
                    east: point.lon,
                },
                Some(bbox) => Self {
                    south: bbox.south.min(point.lat),
                    west: bbox.west.min(point.lon),
                    north: bbox.north.max(point.lat),
                    east: bbox.east.max(point.lon),
                },
            })
        })
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south + self.north) / 2.0,
            lon: (self.west + self.east) / 2.0,
        }
    }

    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }
}
