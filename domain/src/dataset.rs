use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::slice;
use std::sync::Arc;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::coords::{BoundingBox, GeoPoint};
use crate::geometry::Polygon;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Streets,
    Water,
    Parks,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [Self::Streets, Self::Water, Self::Parks];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Streets => "streets",
            Self::Water => "water",
            Self::Parks => "parks",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadClass {
    Motorway,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Other,
}

impl RoadClass {
    #[must_use]
    pub fn from_highway(highway: &str) -> Self {
        match highway {
            "motorway" | "motorway_link" => Self::Motorway,
            "trunk" | "trunk_link" | "primary" | "primary_link" => Self::Primary,
            "secondary" | "secondary_link" => Self::Secondary,
            "tertiary" | "tertiary_link" => Self::Tertiary,
            "residential" | "living_street" | "unclassified" => Self::Residential,
            _ => Self::Other,
        }
    }

    /// Stroke width in points at the reference poster size.
    #[must_use]
    pub fn line_width(self) -> f64 {
        match self {
            Self::Motorway => 1.2,
            Self::Primary => 1.0,
            Self::Secondary => 0.8,
            Self::Tertiary => 0.6,
            Self::Residential | Self::Other => 0.4,
        }
    }

    /// Lower values are drawn first.
    #[must_use]
    pub fn draw_order(self) -> u8 {
        match self {
            Self::Other => 0,
            Self::Residential => 1,
            Self::Tertiary => 2,
            Self::Secondary => 3,
            Self::Primary => 4,
            Self::Motorway => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetEdge {
    pub from: i64,
    pub to: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highway: Option<String>,
}

impl StreetEdge {
    #[must_use]
    pub fn road_class(&self) -> RoadClass {
        self.highway
            .as_deref()
            .map_or(RoadClass::Other, RoadClass::from_highway)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetGraph {
    pub nodes: BTreeMap<i64, GeoPoint>,
    pub edges: Vec<StreetEdge>,
}

impl StreetGraph {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint, RoadClass)> + '_ {
        self.edges.iter().filter_map(|edge| {
            let from = self.nodes.get(&edge.from)?;
            let to = self.nodes.get(&edge.to)?;
            Some((*from, *to, edge.road_class()))
        })
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.nodes.values())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum FeatureGeometry {
    Point(GeoPoint),
    LineString(Vec<GeoPoint>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl FeatureGeometry {
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Polygon(polygon) => slice::from_ref(polygon),
            Self::MultiPolygon(polygons) => polygons,
            Self::Point(_) | Self::LineString(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub geometry: FeatureGeometry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Areal geometries only. Points and lines are not filled on a poster.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.features
            .iter()
            .flat_map(|feature| feature.geometry.polygons())
    }
}

/// Result of one fetch round. The street graph is always present.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub streets: Arc<StreetGraph>,
    pub water: Option<Arc<FeatureCollection>>,
    pub parks: Option<Arc<FeatureCollection>>,
}

impl DatasetBundle {
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.streets.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("motorway_link", RoadClass::Motorway)]
    #[case("trunk", RoadClass::Primary)]
    #[case("primary_link", RoadClass::Primary)]
    #[case("secondary", RoadClass::Secondary)]
    #[case("tertiary", RoadClass::Tertiary)]
    #[case("living_street", RoadClass::Residential)]
    #[case("unclassified", RoadClass::Residential)]
    #[case("service", RoadClass::Other)]
    fn classifies_highway_tags(#[case] highway: &str, #[case] expected: RoadClass) {
        assert_eq!(RoadClass::from_highway(highway), expected);
    }

    #[test]
    fn graph_segments_skip_dangling_edges() {
        let graph = StreetGraph {
            nodes: BTreeMap::from([
                (1, GeoPoint { lat: 0.0, lon: 0.0 }),
                (2, GeoPoint { lat: 0.0, lon: 0.001 }),
            ]),
            edges: vec![
                StreetEdge {
                    from: 1,
                    to: 2,
                    highway: Some("primary".to_string()),
                },
                StreetEdge {
                    from: 2,
                    to: 3,
                    highway: None,
                },
            ],
        };

        let segments: Vec<_> = graph.segments().collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].2, RoadClass::Primary);
    }

    #[test]
    fn feature_collection_yields_only_areal_geometries() {
        let square = Polygon::new(
            vec![
                GeoPoint { lat: 0.0, lon: 0.0 },
                GeoPoint { lat: 0.0, lon: 1.0 },
                GeoPoint { lat: 1.0, lon: 1.0 },
            ],
            Vec::new(),
        )
        .expect("polygon");
        let collection = FeatureCollection {
            features: vec![
                Feature {
                    id: 1,
                    tags: BTreeMap::new(),
                    geometry: FeatureGeometry::Point(GeoPoint { lat: 0.5, lon: 0.5 }),
                },
                Feature {
                    id: 2,
                    tags: BTreeMap::new(),
                    geometry: FeatureGeometry::MultiPolygon(vec![square.clone(), square]),
                },
            ],
        };

        assert_eq!(collection.polygons().count(), 2);
    }
}
