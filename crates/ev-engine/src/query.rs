//! Query and response types.

use ev_core::LngLat;
use ev_spatial::{Hazard, Route};

/// `mode` tag of single-route responses.
pub const MODE_DIRECTED: &str = "network+directed";
/// `mode` tag of k-route responses.
pub const MODE_DIRECTED_K: &str = "network+directed+k";

/// Answer to [`RoadRouter::route`](crate::RoadRouter::route).
///
/// An empty `path` means no route was found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResponse {
    pub path: Vec<LngLat>,
    pub distance_km: f64,
    pub eta_min: f64,
    pub mode: String,
}

impl RouteResponse {
    pub fn empty() -> Self {
        Route::empty().into()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            path:        route.path,
            distance_km: route.distance_km,
            eta_min:     route.eta_min,
            mode:        MODE_DIRECTED.to_owned(),
        }
    }
}

/// Answer to [`RoadRouter::route_k`](crate::RoadRouter::route_k): up to `k`
/// distinct routes, cheapest first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSet {
    pub routes: Vec<Route>,
    pub mode: String,
}

impl RouteSet {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes, mode: MODE_DIRECTED_K.to_owned() }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// One k-route query, for batch dispatch.
#[derive(Debug, Clone)]
pub struct RouteQuery {
    pub start: LngLat,
    pub end: LngLat,
    pub hazard: Option<Hazard>,
    pub k: usize,
    pub hard_block_core: bool,
}

impl RouteQuery {
    /// A hazard-free query for `k` routes.
    pub fn new(start: LngLat, end: LngLat, k: usize) -> Self {
        Self { start, end, hazard: None, k, hard_block_core: false }
    }

    pub fn with_hazard(mut self, hazard: Hazard, hard_block_core: bool) -> Self {
        self.hazard = Some(hazard);
        self.hard_block_core = hard_block_core;
        self
    }
}
