//! Transport DTOs for Overpass and Nominatim JSON, decoded first and then
//! mapped into domain geometry in one pass.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use domain::coords::GeoPoint;
use domain::dataset::{Feature, FeatureCollection, FeatureGeometry, StreetEdge, StreetGraph};
use domain::geometry::{Boundary, Polygon};
use domain::tags::TagFilter;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(super) enum OverpassElementDto {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RelationMemberDto>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub(super) struct RelationMemberDto {
    #[serde(rename = "type")]
    pub(super) member_type: String,
    #[serde(rename = "ref")]
    pub(super) id: i64,
    #[serde(default)]
    pub(super) role: String,
}

struct WayRef<'a> {
    nodes: &'a [i64],
}

impl OverpassResponseDto {
    fn node_index(&self) -> HashMap<i64, GeoPoint> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                OverpassElementDto::Node { id, lat, lon, .. } => {
                    GeoPoint::new(*lat, *lon).ok().map(|point| (*id, point))
                }
                _ => None,
            })
            .collect()
    }

    fn way_index(&self) -> HashMap<i64, WayRef<'_>> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                OverpassElementDto::Way { id, nodes, .. } => Some((*id, WayRef { nodes })),
                _ => None,
            })
            .collect()
    }

    /// Every consecutive node pair of a `highway` way becomes one edge. Only
    /// nodes referenced by an edge are kept.
    pub(super) fn into_street_graph(self) -> StreetGraph {
        let index = self.node_index();
        let mut graph = StreetGraph::default();

        for element in &self.elements {
            let OverpassElementDto::Way { nodes, tags, .. } = element else {
                continue;
            };
            let Some(highway) = tags.get("highway") else {
                continue;
            };
            for (from, to) in nodes.iter().zip(nodes.iter().skip(1)) {
                let (Some(a), Some(b)) = (index.get(from), index.get(to)) else {
                    continue;
                };
                graph.nodes.insert(*from, *a);
                graph.nodes.insert(*to, *b);
                graph.edges.push(StreetEdge {
                    from: *from,
                    to: *to,
                    highway: Some(highway.clone()),
                });
            }
        }
        graph
    }

    /// Keeps elements whose own tags match `filter`. Closed ways become
    /// polygons and multipolygon relations are assembled from member ways.
    pub(super) fn into_features(self, filter: &TagFilter) -> FeatureCollection {
        let nodes = self.node_index();
        let ways = self.way_index();
        let mut features = Vec::new();

        for element in &self.elements {
            let feature = match element {
                OverpassElementDto::Node { id, tags, .. } if filter.matches(tags) => nodes
                    .get(id)
                    .map(|point| (*id, tags, FeatureGeometry::Point(*point))),
                OverpassElementDto::Way { id, nodes: refs, tags } if filter.matches(tags) => {
                    way_geometry(refs, &nodes).map(|geometry| (*id, tags, geometry))
                }
                OverpassElementDto::Relation { id, members, tags } if filter.matches(tags) => {
                    relation_geometry(members, &ways, &nodes).map(|geometry| (*id, tags, geometry))
                }
                _ => None,
            };
            if let Some((id, tags, geometry)) = feature {
                features.push(Feature {
                    id,
                    tags: tags.clone(),
                    geometry,
                });
            }
        }
        FeatureCollection { features }
    }
}

fn resolve(refs: &[i64], nodes: &HashMap<i64, GeoPoint>) -> Option<Vec<GeoPoint>> {
    refs.iter().map(|id| nodes.get(id).copied()).collect()
}

fn is_closed(refs: &[i64]) -> bool {
    refs.len() >= 4 && refs.first() == refs.last()
}

fn open_ring(mut ring: Vec<GeoPoint>) -> Vec<GeoPoint> {
    if ring.len() > 3 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

fn way_geometry(refs: &[i64], nodes: &HashMap<i64, GeoPoint>) -> Option<FeatureGeometry> {
    let points = resolve(refs, nodes)?;
    if is_closed(refs) {
        Polygon::new(open_ring(points), Vec::new())
            .ok()
            .map(FeatureGeometry::Polygon)
    } else if points.len() >= 2 {
        Some(FeatureGeometry::LineString(points))
    } else {
        None
    }
}

fn relation_geometry(
    members: &[RelationMemberDto],
    ways: &HashMap<i64, WayRef<'_>>,
    nodes: &HashMap<i64, GeoPoint>,
) -> Option<FeatureGeometry> {
    let segments = |role: &str| -> Vec<Vec<i64>> {
        members
            .iter()
            .filter(|member| member.member_type == "way")
            .filter(|member| match role {
                "inner" => member.role == "inner",
                _ => member.role != "inner",
            })
            .filter_map(|member| ways.get(&member.id))
            .map(|way| way.nodes.to_vec())
            .collect()
    };

    let to_points = |rings: Vec<Vec<i64>>| -> Vec<Vec<GeoPoint>> {
        rings
            .iter()
            .filter_map(|ring| resolve(ring, nodes))
            .map(open_ring)
            .collect()
    };
    let outers = to_points(assemble_rings(segments("outer")));
    let inners = to_points(assemble_rings(segments("inner")));

    let mut polygons: Vec<Polygon> = outers
        .into_iter()
        .filter_map(|ring| Polygon::new(ring, Vec::new()).ok())
        .collect();
    for inner in inners {
        let Some(first) = inner.first().copied() else {
            continue;
        };
        if let Some(outer) = polygons
            .iter_mut()
            .find(|polygon| ring_contains(&polygon.exterior, &first))
        {
            outer.holes.push(inner);
        }
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(FeatureGeometry::Polygon),
        _ => Some(FeatureGeometry::MultiPolygon(polygons)),
    }
}

/// Joins way segments sharing end nodes into closed rings. Segments that never
/// close are dropped.
pub(super) fn assemble_rings(mut pending: Vec<Vec<i64>>) -> Vec<Vec<i64>> {
    pending.retain(|segment| segment.len() >= 2);
    let mut rings = Vec::new();

    while let Some(mut current) = pending.pop() {
        loop {
            if is_closed(&current) {
                rings.push(current);
                break;
            }
            let Some(tail) = current.last().copied() else {
                break;
            };
            let Some(position) = pending
                .iter()
                .position(|segment| segment.first() == Some(&tail) || segment.last() == Some(&tail))
            else {
                break;
            };
            let mut next = pending.swap_remove(position);
            if next.first() != Some(&tail) {
                next.reverse();
            }
            current.extend(next.into_iter().skip(1));
        }
    }
    rings
}

/// Even-odd ray cast in degree space.
fn ring_contains(ring: &[GeoPoint], point: &GeoPoint) -> bool {
    let mut inside = false;
    let previous = ring.iter().cycle().skip(ring.len().saturating_sub(1));
    for (a, b) in ring.iter().zip(previous) {
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let cross = (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if point.lon < cross {
                inside = !inside;
            }
        }
    }
    inside
}

#[derive(Debug, Deserialize)]
pub(super) struct NominatimPlaceDto {
    pub(super) lat: String,
    pub(super) lon: String,
    #[serde(default)]
    pub(super) display_name: String,
    #[serde(default)]
    pub(super) geojson: Option<GeoJsonDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeoJsonDto {
    #[serde(rename = "type")]
    pub(super) kind: String,
    #[serde(default)]
    pub(super) coordinates: Value,
}

type RingDto = Vec<Vec<f64>>;

impl NominatimPlaceDto {
    pub(super) fn point(&self) -> Result<GeoPoint, String> {
        let lat = self
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude '{}': {e}", self.lat))?;
        let lon = self
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude '{}': {e}", self.lon))?;
        GeoPoint::new(lat, lon).map_err(|e| e.to_string())
    }

    /// `None` when the place has no areal outline (e.g. a node result).
    pub(super) fn boundary(&self, name: &str) -> Result<Option<Boundary>, String> {
        let Some(geojson) = &self.geojson else {
            return Ok(None);
        };
        let polygons: Vec<Vec<RingDto>> = match geojson.kind.as_str() {
            "Polygon" => vec![decode_coordinates(&geojson.coordinates)?],
            "MultiPolygon" => decode_coordinates(&geojson.coordinates)?,
            _ => return Ok(None),
        };

        let polygons = polygons
            .iter()
            .filter_map(|rings| polygon_from_rings(rings).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        if polygons.is_empty() {
            return Ok(None);
        }
        Boundary::new(name, polygons)
            .map(Some)
            .map_err(|e| e.to_string())
    }
}

fn decode_coordinates<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<T, String> {
    T::deserialize(value).map_err(|e| format!("invalid GeoJSON coordinates: {e}"))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<Vec<GeoPoint>, String> {
    let ring = positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => GeoPoint::new(*lat, *lon).map_err(|e| e.to_string()),
            _ => Err("GeoJSON position needs two numbers".to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(open_ring(ring))
}

fn polygon_from_rings(rings: &[RingDto]) -> Result<Option<Polygon>, String> {
    let Some((exterior, holes)) = rings.split_first() else {
        return Ok(None);
    };
    let exterior = ring_from_positions(exterior)?;
    let holes = holes
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Result<Vec<_>, _>>()?;
    if exterior.len() < 3 {
        return Ok(None);
    }
    Polygon::new(exterior, holes)
        .map(Some)
        .map_err(|e| e.to_string())
}
