//! Hazard areas and distance-banded edge penalties.
//!
//! A hazard is a (multi-)polygon.  Around it the penalizer grades edges into
//! three bands, tested in order:
//!
//! | Band   | Edge polyline…                         | Effect (defaults)          |
//! |--------|----------------------------------------|----------------------------|
//! | core   | intersects the hazard                  | ×10, or removed (hard block) |
//! | near   | within `near_km` (~100 m) of it        | ×3                         |
//! | mid    | within `mid_km` (~300 m) of it         | ×1.5                       |
//! | clear  | farther away                           | unchanged                  |
//!
//! "Within r of the hazard" is the same test as "intersects the hazard
//! buffered by r", evaluated as a planar distance in degrees without
//! materializing the buffer polygons.
//!
//! Penalties are only ever applied to a query's [`WorkingGraph`], so nothing
//! leaks between queries.

use geo::{BoundingRect, Distance, Euclidean, Intersects, LineString, MultiPolygon, Polygon, Rect};
use geojson::GeoJson;

use ev_core::geo::km_to_deg;
use ev_core::{EdgeId, HazardBands, LngLat};

use crate::overlay::WorkingGraph;
use crate::search::RoutingGraph;
use crate::SpatialResult;

// ── Hazard ────────────────────────────────────────────────────────────────────

/// Which band of a hazard a polyline falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HazardBand {
    Core,
    Near,
    Mid,
    Clear,
}

/// A hazard area in `(lng, lat)` degrees.
#[derive(Clone, Debug)]
pub struct Hazard {
    area: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl Hazard {
    pub fn from_polygon(polygon: Polygon<f64>) -> Self {
        Self::from_multi_polygon(MultiPolygon(vec![polygon]))
    }

    pub fn from_multi_polygon(area: MultiPolygon<f64>) -> Self {
        let bounds = area.bounding_rect();
        Self { area, bounds }
    }

    /// The first Polygon or MultiPolygon found in a GeoJSON document
    /// (FeatureCollection, Feature, or bare Geometry).  Other geometry types
    /// and geometries that fail to convert are skipped.
    pub fn from_geojson(doc: &GeoJson) -> Option<Self> {
        let geometries: Vec<&geojson::Geometry> = match doc {
            GeoJson::FeatureCollection(fc) => {
                fc.features.iter().filter_map(|f| f.geometry.as_ref()).collect()
            }
            GeoJson::Feature(f) => f.geometry.iter().collect(),
            GeoJson::Geometry(g) => vec![g],
        };

        geometries.into_iter().find_map(|g| match geo::Geometry::<f64>::try_from(g.clone()) {
            Ok(geo::Geometry::Polygon(p)) => Some(Self::from_polygon(p)),
            Ok(geo::Geometry::MultiPolygon(mp)) => Some(Self::from_multi_polygon(mp)),
            _ => None,
        })
    }

    /// Parse a GeoJSON string and extract its first polygon.
    pub fn from_geojson_str(s: &str) -> SpatialResult<Option<Self>> {
        let doc: GeoJson = s.parse()?;
        Ok(Self::from_geojson(&doc))
    }

    pub fn area(&self) -> &MultiPolygon<f64> {
        &self.area
    }

    /// Band of `line` relative to this hazard.
    pub fn classify(&self, line: &LineString<f64>, bands: &HazardBands) -> HazardBand {
        let mid_deg = km_to_deg(bands.mid_km);
        if !self.may_reach(line, mid_deg) {
            return HazardBand::Clear;
        }
        if line.intersects(&self.area) {
            return HazardBand::Core;
        }
        let d = self
            .area
            .0
            .iter()
            .map(|poly| Euclidean.distance(line, poly))
            .fold(f64::INFINITY, f64::min);
        if d <= km_to_deg(bands.near_km) {
            HazardBand::Near
        } else if d <= mid_deg {
            HazardBand::Mid
        } else {
            HazardBand::Clear
        }
    }

    /// `true` if the polyline crosses or touches the hazard itself.
    pub fn intersects_core(&self, coords: &[LngLat]) -> bool {
        coords.len() >= 2 && to_line(coords).intersects(&self.area)
    }

    /// Cheap bounding-box rejection: can `line` come within `pad` degrees?
    fn may_reach(&self, line: &LineString<f64>, pad: f64) -> bool {
        let (Some(h), Some(l)) = (self.bounds, line.bounding_rect()) else {
            return false;
        };
        l.min().x <= h.max().x + pad
            && l.max().x >= h.min().x - pad
            && l.min().y <= h.max().y + pad
            && l.max().y >= h.min().y - pad
    }
}

fn to_line(coords: &[LngLat]) -> LineString<f64> {
    coords.iter().map(|p| (p.lng, p.lat)).collect::<Vec<_>>().into()
}

// ── Penalizer ─────────────────────────────────────────────────────────────────

/// What [`apply_hazard`] did to a working graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardReport {
    /// Edges removed by the hard block, in id order.
    pub removed: Vec<EdgeId>,
    pub core: usize,
    pub near: usize,
    pub mid: usize,
}

/// Penalize (or remove) every live edge of `working` near `hazard`.
///
/// With `hard_block_core`, edges intersecting the hazard are removed and
/// listed in the report (they can be put back with
/// [`WorkingGraph::restore_edges`]); otherwise their weight is multiplied by
/// `bands.core_factor`.  A `None` hazard is a no-op.
pub fn apply_hazard(
    working: &mut WorkingGraph<'_>,
    hazard: Option<&Hazard>,
    hard_block_core: bool,
    bands: &HazardBands,
) -> HazardReport {
    let mut report = HazardReport::default();
    let Some(hazard) = hazard else {
        return report;
    };

    let graded: Vec<(EdgeId, HazardBand)> = working
        .live_edges()
        .map(|e| (e, hazard.classify(&to_line(&working.edge_polyline(e)), bands)))
        .filter(|(_, band)| *band != HazardBand::Clear)
        .collect();

    for (edge, band) in graded {
        let factor = match band {
            HazardBand::Core if hard_block_core => {
                working.remove_edge(edge);
                report.removed.push(edge);
                report.core += 1;
                continue;
            }
            HazardBand::Core => {
                report.core += 1;
                bands.core_factor
            }
            HazardBand::Near => {
                report.near += 1;
                bands.near_factor
            }
            HazardBand::Mid => {
                report.mid += 1;
                bands.mid_factor
            }
            HazardBand::Clear => continue,
        };
        let w = working.edge_weight_hr(edge);
        working.set_weight_hr(edge, w * factor);
    }

    log::debug!(
        "hazard: {} core ({} removed), {} near, {} mid",
        report.core,
        report.removed.len(),
        report.near,
        report.mid
    );
    report
}
