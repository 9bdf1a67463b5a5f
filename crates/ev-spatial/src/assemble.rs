//! Turning a graph path into a caller-facing route.

use ev_core::LngLat;

use crate::search::{Path, RoutingGraph};

/// A route as returned to callers: geometry plus physical and time metrics.
///
/// Serializes (feature `serde`) as
/// `{"path": [[lng, lat], ...], "distance_km": …, "eta_min": …}`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Coordinates from start to end, without duplicated joins.
    pub path: Vec<LngLat>,
    /// Sum of traversed edge lengths.  Hazard multipliers do not apply.
    pub distance_km: f64,
    /// Sum of traversed edge weights (including penalties), in minutes.
    pub eta_min: f64,
}

impl Route {
    /// The empty route: no coordinates, zero metrics.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Concatenate the polylines of `path`'s edges and total its metrics.
///
/// A zero-edge path gives [`Route::empty`].
pub fn assemble<G: RoutingGraph>(graph: &G, path: &Path) -> Route {
    let mut coords: Vec<LngLat> = Vec::with_capacity(path.edges.len() + 1);
    let mut distance_km = 0.0;
    let mut eta_hr = 0.0;

    for &edge in &path.edges {
        let line = graph.edge_polyline(edge);
        let skip = usize::from(coords.last().is_some_and(|last| last.key() == line[0].key()));
        coords.extend_from_slice(&line[skip..]);
        distance_km += graph.edge_length_km(edge);
        eta_hr += graph.edge_weight_hr(edge);
    }

    Route { path: coords, distance_km, eta_min: eta_hr * 60.0 }
}
