//! GeoJSON road loader.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use ev_core::RouterConfig;
//! use ev_spatial::loader::load_geojson_path;
//!
//! let network = load_geojson_path(Path::new("roads.geojson"), &RouterConfig::default())?;
//! ```
//!
//! # What is loaded
//!
//! Every `LineString` / `MultiLineString` feature becomes a chain of
//! two-point edges, one per consecutive vertex pair.  Other geometry types
//! and features without geometry are skipped and counted.  The document may
//! be a FeatureCollection, a single Feature, or a bare Geometry.
//!
//! # Direction rules
//!
//! Properties are read as trimmed, lower-cased text (`true` → `"true"`,
//! `1` → `"1"`).  For each vertex pair `(a, b)`:
//!
//! | Condition                            | Edges            |
//! |--------------------------------------|------------------|
//! | `oneway` ∈ `yes`, `true`, `1`        | `a → b`          |
//! | `oneway` ∈ `-1`, `reverse`           | `b → a`          |
//! | `junction = roundabout`              | `a → b`          |
//! | `highway = motorway`                 | `a → b`          |
//! | otherwise                            | `a → b`, `b → a` |
//!
//! The first matching row wins.  Speed comes from the configured `highway`
//! table; see [`RouterConfig::speed_for`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use geojson::{Feature, GeoJson, Geometry, Value};
use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;

use ev_core::{LngLat, RouterConfig};

use crate::network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
use crate::SpatialResult;

// ── Public entry points ───────────────────────────────────────────────────────

/// Load a road network from a GeoJSON file.
///
/// # Errors
///
/// [`SpatialError::Io`](crate::SpatialError::Io) if the file cannot be
/// opened, [`SpatialError::GeoJson`](crate::SpatialError::GeoJson) if it is
/// not valid GeoJSON.
pub fn load_geojson_path(path: &Path, config: &RouterConfig) -> SpatialResult<RoadNetwork> {
    let file = File::open(path)?;
    log::info!("loading roads from {}", path.display());
    load_geojson_reader(BufReader::new(file), config)
}

/// Load a road network from any GeoJSON byte source.
pub fn load_geojson_reader<R: Read>(reader: R, config: &RouterConfig) -> SpatialResult<RoadNetwork> {
    let doc: GeoJson = serde_json::from_reader(reader)?;
    Ok(build_from_geojson(&doc, config))
}

/// Load a road network from a GeoJSON string.
pub fn load_geojson_str(s: &str, config: &RouterConfig) -> SpatialResult<RoadNetwork> {
    let doc: GeoJson = s.parse()?;
    Ok(build_from_geojson(&doc, config))
}

/// Build a network from an already-parsed document.
pub fn build_from_geojson(doc: &GeoJson, config: &RouterConfig) -> RoadNetwork {
    let mut stats = LoadStats::default();
    let mut builder = RoadNetworkBuilder::new();
    let mut classes: FxHashMap<String, Arc<str>> = FxHashMap::default();

    let mut load_feature = |props: RoadProps, geometry: Option<&Geometry>| {
        stats.features += 1;
        let Some(geometry) = geometry else {
            stats.skipped += 1;
            log::debug!("feature {} has no geometry; skipped", stats.features - 1);
            return;
        };
        let lines = line_parts(&geometry.value);
        if lines.is_empty() {
            stats.skipped += 1;
            log::debug!("feature {} has no line geometry; skipped", stats.features - 1);
            return;
        }

        let highway = props
            .highway
            .as_deref()
            .map(|h| classes.entry(h.to_owned()).or_insert_with(|| h.into()).clone());
        let direction = props.direction();
        for line in lines {
            stats.invalid_vertices +=
                add_line(&mut builder, line, direction, highway.clone(), config);
        }
    };

    match doc {
        GeoJson::FeatureCollection(fc) => {
            for f in &fc.features {
                load_feature(RoadProps::of(f), f.geometry.as_ref());
            }
        }
        GeoJson::Feature(f) => load_feature(RoadProps::of(f), f.geometry.as_ref()),
        GeoJson::Geometry(g) => load_feature(RoadProps::default(), Some(g)),
    }

    let network = builder.build();
    log::info!(
        "loaded {} features ({} skipped, {} invalid vertices): {} nodes, {} edges, {} segments",
        stats.features,
        stats.skipped,
        stats.invalid_vertices,
        network.node_count(),
        network.edge_count(),
        network.segment_index().len()
    );
    network
}

// ── Internal types ────────────────────────────────────────────────────────────

#[derive(Default)]
struct LoadStats {
    features:         usize,
    skipped:          usize,
    invalid_vertices: usize,
}

/// Which directed edges a vertex pair `(a, b)` produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    Both,
}

impl Direction {
    /// Apply the direction rules to normalized property values.
    pub fn from_tags(highway: Option<&str>, oneway: Option<&str>, junction: Option<&str>) -> Self {
        match oneway {
            Some("yes" | "true" | "1") => return Direction::Forward,
            Some("-1" | "reverse") => return Direction::Reverse,
            _ => {}
        }
        if junction == Some("roundabout") || highway == Some("motorway") {
            Direction::Forward
        } else {
            Direction::Both
        }
    }
}

#[derive(Default)]
struct RoadProps {
    highway:  Option<String>,
    oneway:   Option<String>,
    junction: Option<String>,
}

impl RoadProps {
    fn of(feature: &Feature) -> Self {
        let get = |key: &str| feature.property(key).and_then(normalize);
        Self {
            highway:  get("highway"),
            oneway:   get("oneway"),
            junction: get("junction"),
        }
    }

    fn direction(&self) -> Direction {
        Direction::from_tags(
            self.highway.as_deref(),
            self.oneway.as_deref(),
            self.junction.as_deref(),
        )
    }
}

/// Property value as trimmed lower-case text; `None` for null, empty, or
/// structured values.
fn normalize(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_lowercase(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Vertex lists of every line in a geometry.  Empty for non-line geometry.
fn line_parts(value: &Value) -> Vec<&[Vec<f64>]> {
    match value {
        Value::LineString(coords) => vec![coords.as_slice()],
        Value::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
        Value::GeometryCollection(parts) => {
            parts.iter().flat_map(|g| line_parts(&g.value)).collect()
        }
        _ => Vec::new(),
    }
}

/// Add one line's edges.  Returns the number of invalid vertices dropped.
fn add_line(
    builder: &mut RoadNetworkBuilder,
    coords: &[Vec<f64>],
    direction: Direction,
    highway: Option<Arc<str>>,
    config: &RouterConfig,
) -> usize {
    let mut invalid = 0;
    let mut prev = None;
    for position in coords {
        // Extra dimensions (altitude) are ignored.
        let point = match position.get(..2).map(LngLat::try_from_slice) {
            Some(Ok(p)) => p,
            _ => {
                invalid += 1;
                continue;
            }
        };
        let node = builder.add_node(point);
        if let Some(from) = prev.replace(node) {
            if from == node {
                continue;
            }
            let len = builder.node_pos(from).distance_km(point);
            let attrs = EdgeAttrs::for_road(len, highway.clone(), config);
            match direction {
                Direction::Forward => {
                    builder.add_directed_edge(from, node, attrs);
                }
                Direction::Reverse => {
                    builder.add_directed_edge(node, from, attrs);
                }
                Direction::Both => builder.add_road(from, node, attrs),
            }
        }
    }
    invalid
}
