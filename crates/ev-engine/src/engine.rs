//! The `RoadRouter` engine.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use ev_core::{LngLat, NodeId, RouterConfig};
use ev_spatial::{
    apply_hazard, assemble, load_geojson_path, shortest_path, snap_point, Hazard, KShortestPaths,
    RoadNetwork, WorkingGraph,
};

use crate::{EngineError, EngineResult, RouteQuery, RouteResponse, RouteSet};

// ── RoadRouter ────────────────────────────────────────────────────────────────

/// Hazard-aware road router over a network that is loaded at most once.
///
/// The base network is immutable after loading and shared by every query.
/// Each query works on its own [`WorkingGraph`], so `&RoadRouter` can be
/// used from many threads at once.
///
/// # Loading
///
/// A router created with [`new`](Self::new) loads its GeoJSON file on the
/// first call to [`load`](Self::load), [`route`](Self::route), or
/// [`route_k`](Self::route_k).  Concurrent first callers block while a single
/// caller builds the network.  A failed load leaves the router unloaded and
/// the next call tries again.
///
/// # Example
///
/// ```rust,ignore
/// let router = RoadRouter::new("roads.geojson", RouterConfig::default())?;
/// let set = router.route_k(start, end, Some(&hazard), 3, true)?;
/// for r in &set.routes {
///     println!("{:.2} km, {:.1} min", r.distance_km, r.eta_min);
/// }
/// ```
pub struct RoadRouter {
    source:    Option<PathBuf>,
    config:    RouterConfig,
    network:   OnceLock<RoadNetwork>,
    load_lock: Mutex<()>,
}

impl RoadRouter {
    /// A router that will load `path` on first use.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] if `config` fails validation.
    pub fn new(path: impl Into<PathBuf>, config: RouterConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            source:    Some(path.into()),
            config,
            network:   OnceLock::new(),
            load_lock: Mutex::new(()),
        })
    }

    /// A router over an already-built network.  It is loaded from the start.
    pub fn with_network(network: RoadNetwork, config: RouterConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            source:    None,
            config,
            network:   OnceLock::from(network),
            load_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.network.get().is_some()
    }

    /// The base network, if loaded.
    pub fn network(&self) -> Option<&RoadNetwork> {
        self.network.get()
    }

    /// Build the base network if it has not been built yet.
    ///
    /// Returns immediately once loaded.  Only one caller ever runs the
    /// loader; the others wait on it.
    ///
    /// # Errors
    ///
    /// [`EngineError::Load`] if the file cannot be read or parsed.
    pub fn load(&self) -> EngineResult<&RoadNetwork> {
        if let Some(net) = self.network.get() {
            return Ok(net);
        }
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(net) = self.network.get() {
            return Ok(net);
        }

        let network = match &self.source {
            Some(path) => load_geojson_path(path, &self.config)?,
            None => RoadNetwork::empty(),
        };
        Ok(self.network.get_or_init(|| network))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Best route from `start` to `end`.
    ///
    /// A hazard, if given, is applied with soft penalties only.  No path,
    /// or an empty network, gives an empty response rather than an error.
    pub fn route(
        &self,
        start: LngLat,
        end: LngLat,
        hazard: Option<&Hazard>,
    ) -> EngineResult<RouteResponse> {
        let Some((working, s, t)) = self.prepare(start, end, hazard, false)? else {
            return Ok(RouteResponse::empty());
        };
        let response = match shortest_path(&working, s, t) {
            Some(path) => assemble(&working, &path).into(),
            None => RouteResponse::empty(),
        };
        log::debug!(
            "route {start} → {end}: {:.3} km, {:.2} min",
            response.distance_km,
            response.eta_min
        );
        Ok(response)
    }

    /// Up to `k` distinct loopless routes from `start` to `end`, cheapest
    /// first.
    ///
    /// `k` above `config.max_k` is capped.  Fewer than `k` routes are
    /// returned when fewer exist.  With `hard_block_core`, edges crossing
    /// the hazard are removed instead of penalized.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidK`] for `k == 0`,
    /// [`EngineError::InvalidCoordinate`] for out-of-range input,
    /// [`EngineError::Load`] if the network cannot be loaded.
    pub fn route_k(
        &self,
        start: LngLat,
        end: LngLat,
        hazard: Option<&Hazard>,
        k: usize,
        hard_block_core: bool,
    ) -> EngineResult<RouteSet> {
        if k == 0 {
            return Err(EngineError::InvalidK(k));
        }
        let k = if k > self.config.max_k {
            log::warn!("k = {k} exceeds max_k; capping at {}", self.config.max_k);
            self.config.max_k
        } else {
            k
        };

        let Some((working, s, t)) = self.prepare(start, end, hazard, hard_block_core)? else {
            return Ok(RouteSet::new(Vec::new()));
        };
        let routes: Vec<_> = KShortestPaths::new(&working, s, t)
            .take(k)
            .map(|path| assemble(&working, &path))
            .collect();
        log::debug!("route_k {start} → {end}: {} of {k} routes", routes.len());
        Ok(RouteSet::new(routes))
    }

    /// Answer independent k-route queries, in input order.
    ///
    /// With the `parallel` feature the queries run on Rayon's thread pool.
    pub fn route_k_many(&self, queries: &[RouteQuery]) -> Vec<EngineResult<RouteSet>> {
        let run = |q: &RouteQuery| {
            self.route_k(q.start, q.end, q.hazard.as_ref(), q.k, q.hard_block_core)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            queries.iter().map(run).collect()
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Validate input, load, and build a query's working graph with both
    /// endpoints snapped and the hazard applied.  `None` if the network has
    /// nothing to snap to.
    fn prepare(
        &self,
        start: LngLat,
        end: LngLat,
        hazard: Option<&Hazard>,
        hard_block_core: bool,
    ) -> EngineResult<Option<(WorkingGraph<'_>, NodeId, NodeId)>> {
        let start = start.validated().map_err(EngineError::InvalidCoordinate)?;
        let end = end.validated().map_err(EngineError::InvalidCoordinate)?;

        let network = self.load()?;
        let mut working = WorkingGraph::new(network);
        let (Some(s), Some(t)) = (
            snap_point(&mut working, start, &self.config),
            snap_point(&mut working, end, &self.config),
        ) else {
            return Ok(None);
        };
        apply_hazard(&mut working, hazard, hard_block_core, &self.config.hazard);
        Ok(Some((working, s, t)))
    }
}
