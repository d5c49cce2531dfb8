//! Local equirectangular projection in metres, fitted to the canvas.

use domain::coords::{BoundingBox, GeoPoint};

const EARTH_RADIUS_M: f64 = 6_371_008.8;
const MIN_EXTENT_M: f64 = 50.0;

/// Canvas position in pixels, origin top-left, `y` pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Px {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct Projection {
    center: GeoPoint,
    cos_lat: f64,
    scale: f64,
    half_width: f64,
    half_height: f64,
}

impl Projection {
    /// Centres `extent` on the canvas with one scale for both axes; the
    /// shorter side of the data is padded rather than stretched.
    pub fn fit(extent: &BoundingBox, width: f64, height: f64) -> Self {
        let center = extent.center();
        let cos_lat = center.lat.to_radians().cos().max(1e-6);
        let extent_x =
            ((extent.east - extent.west).to_radians() * EARTH_RADIUS_M * cos_lat).max(MIN_EXTENT_M);
        let extent_y = ((extent.north - extent.south).to_radians() * EARTH_RADIUS_M).max(MIN_EXTENT_M);

        Self {
            center,
            cos_lat,
            scale: (width / extent_x).min(height / extent_y),
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    /// Offset from the projection centre in metres, `y` pointing north.
    pub fn metres(&self, point: GeoPoint) -> (f64, f64) {
        (
            (point.lon - self.center.lon).to_radians() * EARTH_RADIUS_M * self.cos_lat,
            (point.lat - self.center.lat).to_radians() * EARTH_RADIUS_M,
        )
    }

    pub fn project(&self, point: GeoPoint) -> Px {
        let (x, y) = self.metres(point);
        Px {
            x: self.half_width + x * self.scale,
            y: self.half_height - y * self.scale,
        }
    }

    pub fn project_ring(&self, ring: &[GeoPoint]) -> Vec<Px> {
        ring.iter().map(|point| self.project(*point)).collect()
    }
}
