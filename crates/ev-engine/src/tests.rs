//! Unit tests for ev-engine.

#[cfg(test)]
mod helpers {
    use ev_core::geo::{KM_PER_DEG_LAT, KM_PER_DEG_LNG};
    use ev_core::{LngLat, RouterConfig};
    use ev_spatial::{load_geojson_str, Hazard};

    use crate::RoadRouter;

    pub const STEP_LNG: f64 = 0.1 / KM_PER_DEG_LNG;
    pub const STEP_LAT: f64 = 0.1 / KM_PER_DEG_LAT;

    pub fn grid_pos(col: usize, row: usize) -> LngLat {
        LngLat::new(-88.04 + col as f64 * STEP_LNG, 30.69 + row as f64 * STEP_LAT)
    }

    fn coord(col: usize, row: usize) -> String {
        let p = grid_pos(col, row);
        format!("[{:?}, {:?}]", p.lng, p.lat)
    }

    /// 3×3 grid of 100 m residential streets as GeoJSON: three east–west and
    /// three north–south lines.
    pub fn grid_geojson() -> String {
        let mut lines = Vec::new();
        for i in 0..3 {
            lines.push(format!("[{}, {}, {}]", coord(0, i), coord(1, i), coord(2, i)));
            lines.push(format!("[{}, {}, {}]", coord(i, 0), coord(i, 1), coord(i, 2)));
        }
        let features: Vec<String> = lines
            .iter()
            .map(|c| {
                format!(
                    r#"{{"type":"Feature","properties":{{"highway":"residential"}},
                        "geometry":{{"type":"LineString","coordinates":{c}}}}}"#
                )
            })
            .collect();
        format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","))
    }

    pub fn grid_router() -> RoadRouter {
        grid_router_with(RouterConfig::default())
    }

    pub fn grid_router_with(config: RouterConfig) -> RoadRouter {
        let net = load_geojson_str(&grid_geojson(), &config).unwrap();
        RoadRouter::with_network(net, config).unwrap()
    }

    /// Square hazard of half-side 0.0002° over the grid centre, parsed from
    /// GeoJSON.
    pub fn center_hazard() -> Hazard {
        let c = grid_pos(1, 1);
        let h = 0.0002;
        let ring: Vec<String> = [(-h, -h), (h, -h), (h, h), (-h, h), (-h, -h)]
            .iter()
            .map(|(dx, dy)| format!("[{:?}, {:?}]", c.lng + dx, c.lat + dy))
            .collect();
        let doc = format!(
            r#"{{"type":"Feature","properties":{{}},
                "geometry":{{"type":"Polygon","coordinates":[[{}]]}}}}"#,
            ring.join(",")
        );
        Hazard::from_geojson_str(&doc).unwrap().unwrap()
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loading {
    use std::io::Write;

    use ev_core::RouterConfig;

    use super::helpers::{grid_geojson, grid_pos};
    use crate::{EngineError, RoadRouter};

    #[test]
    fn loads_lazily_on_first_query() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(grid_geojson().as_bytes()).unwrap();

        let router = RoadRouter::new(file.path(), RouterConfig::default()).unwrap();
        assert!(!router.is_loaded());
        assert!(router.network().is_none());

        let r = router.route(grid_pos(0, 0), grid_pos(2, 2), None).unwrap();
        assert!(!r.is_empty());
        assert!(router.is_loaded());
        assert_eq!(router.network().unwrap().node_count(), 9);
    }

    #[test]
    fn load_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(grid_geojson().as_bytes()).unwrap();
        let router = RoadRouter::new(file.path(), RouterConfig::default()).unwrap();

        let first: *const _ = router.load().unwrap();
        let second: *const _ = router.load().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(grid_geojson().as_bytes()).unwrap();
        let router = RoadRouter::new(file.path(), RouterConfig::default()).unwrap();

        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| router.load().unwrap() as *const _ as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roads.geojson");
        let router = RoadRouter::new(&path, RouterConfig::default()).unwrap();

        let err = router.route(grid_pos(0, 0), grid_pos(2, 2), None).unwrap_err();
        assert!(matches!(err, EngineError::Load(_)));
        assert!(!router.is_loaded());

        std::fs::write(&path, grid_geojson()).unwrap();
        assert!(router.load().is_ok());
        assert!(router.is_loaded());
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"type\": \"FeatureCollection\", \"features\": [").unwrap();
        let router = RoadRouter::new(file.path(), RouterConfig::default()).unwrap();
        assert!(matches!(router.load(), Err(EngineError::Load(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RouterConfig { default_speed_kph: 0.0, ..RouterConfig::default() };
        assert!(matches!(
            RoadRouter::new("roads.geojson", config),
            Err(EngineError::Config(_))
        ));
    }
}

// ── Single-route queries ──────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use ev_core::{LngLat, RouterConfig};
    use ev_spatial::RoadNetwork;

    use super::helpers::{center_hazard, grid_pos, grid_router, STEP_LNG};
    use crate::{EngineError, RoadRouter, MODE_DIRECTED};

    #[test]
    fn corner_to_corner() {
        let router = grid_router();
        let r = router.route(grid_pos(0, 0), grid_pos(2, 2), None).unwrap();
        assert_eq!(r.mode, MODE_DIRECTED);
        assert_eq!(r.path.len(), 5);
        // Positions went through JSON, so compare canonical keys.
        assert_eq!(r.path[0].key(), grid_pos(0, 0).key());
        assert_eq!(r.path[4].key(), grid_pos(2, 2).key());
        assert!((r.distance_km - 0.4).abs() < 1e-9);

        let per_edge_hr = 0.1 / 30.0 + router.config().edge_penalty_hr;
        assert!((r.eta_min - 4.0 * per_edge_hr * 60.0).abs() < 1e-6);
    }

    #[test]
    fn off_network_points_are_snapped() {
        let router = grid_router();
        let a = grid_pos(0, 0);
        let start = LngLat::new(a.lng + STEP_LNG / 2.0, a.lat - 0.00005);
        let r = router.route(start, grid_pos(1, 0), None).unwrap();
        assert_eq!(r.path.len(), 2);
        assert!((r.distance_km - 0.05).abs() < 1e-9);
    }

    #[test]
    fn hazard_is_soft_for_single_route() {
        let router = grid_router();
        let plain = router.route(grid_pos(0, 0), grid_pos(2, 2), None).unwrap();
        let hazard = center_hazard();
        let r = router.route(grid_pos(0, 0), grid_pos(2, 2), Some(&hazard)).unwrap();
        assert!(!r.is_empty());
        assert!(r.eta_min >= plain.eta_min);
        assert!((r.distance_km - plain.distance_km).abs() < 1e-9);
    }

    #[test]
    fn invalid_coordinates_rejected() {
        let router = grid_router();
        for bad in [LngLat::new(0.0, 95.0), LngLat::new(181.0, 0.0), LngLat::new(f64::NAN, 0.0)] {
            assert!(matches!(
                router.route(bad, grid_pos(0, 0), None),
                Err(EngineError::InvalidCoordinate(_))
            ));
        }
    }

    #[test]
    fn empty_network_gives_empty_result() {
        let router = RoadRouter::with_network(RoadNetwork::empty(), RouterConfig::default()).unwrap();
        assert!(router.is_loaded());
        let r = router.route(grid_pos(0, 0), grid_pos(1, 1), None).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.distance_km, 0.0);
        assert!(router.route_k(grid_pos(0, 0), grid_pos(1, 1), None, 3, false).unwrap().is_empty());
    }

    #[test]
    fn start_equals_end_is_zero_route() {
        let router = grid_router();
        let r = router.route(grid_pos(1, 1), grid_pos(1, 1), None).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.eta_min, 0.0);
    }
}

// ── k-route queries ───────────────────────────────────────────────────────────

#[cfg(test)]
mod route_k {
    use std::collections::HashSet;

    use ev_core::RouterConfig;

    use super::helpers::{center_hazard, grid_pos, grid_router, grid_router_with};
    use crate::{EngineError, RouteQuery, MODE_DIRECTED_K};

    #[test]
    fn routes_are_distinct_and_ordered() {
        let router = grid_router();
        let set = router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 8, false).unwrap();
        assert_eq!(set.mode, MODE_DIRECTED_K);
        assert_eq!(set.routes.len(), 8);

        let keys: HashSet<String> = set.routes.iter().map(|r| format!("{:?}", r.path)).collect();
        assert_eq!(keys.len(), 8);
        assert!(set.routes.windows(2).all(|w| w[0].eta_min <= w[1].eta_min + 1e-9));
        assert!(set.routes[..6].iter().all(|r| r.path.len() == 5));
    }

    #[test]
    fn zero_k_rejected() {
        let router = grid_router();
        assert!(matches!(
            router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 0, false),
            Err(EngineError::InvalidK(0))
        ));
    }

    #[test]
    fn k_capped_at_max_k() {
        let router = grid_router_with(RouterConfig { max_k: 2, ..RouterConfig::default() });
        let set = router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 5, false).unwrap();
        assert_eq!(set.routes.len(), 2);
    }

    #[test]
    fn fewer_routes_than_requested() {
        let router = grid_router();
        let hazard = center_hazard();
        let set = router
            .route_k(grid_pos(0, 0), grid_pos(2, 2), Some(&hazard), 5, true)
            .unwrap();
        // Only the two perimeter routes avoid the blocked centre.
        assert_eq!(set.routes.len(), 2);
        for r in &set.routes {
            assert!(!hazard.intersects_core(&r.path));
        }
    }

    #[test]
    fn soft_hazard_never_lowers_eta() {
        let router = grid_router();
        let hazard = center_hazard();
        let plain = router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 4, false).unwrap();
        let soft = router
            .route_k(grid_pos(0, 0), grid_pos(2, 2), Some(&hazard), 4, false)
            .unwrap();
        assert_eq!(soft.routes.len(), 4);
        for (p, s) in plain.routes.iter().zip(&soft.routes) {
            assert!(s.eta_min >= p.eta_min - 1e-9);
        }
    }

    #[test]
    fn queries_do_not_affect_each_other() {
        let router = grid_router();
        let baseline = router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 3, false).unwrap();
        let hazard = center_hazard();
        router
            .route_k(grid_pos(0, 1), grid_pos(2, 1), Some(&hazard), 3, true)
            .unwrap();
        let again = router.route_k(grid_pos(0, 0), grid_pos(2, 2), None, 3, false).unwrap();
        assert_eq!(again, baseline);
    }

    #[test]
    fn start_equals_end_yields_one_empty_route() {
        let router = grid_router();
        let set = router.route_k(grid_pos(1, 1), grid_pos(1, 1), None, 3, false).unwrap();
        assert_eq!(set.routes.len(), 1);
        assert!(set.routes[0].is_empty());
    }

    #[test]
    fn batch_matches_individual_queries() {
        let router = grid_router();
        let queries = vec![
            RouteQuery::new(grid_pos(0, 0), grid_pos(2, 2), 3),
            RouteQuery::new(grid_pos(2, 0), grid_pos(0, 2), 2).with_hazard(center_hazard(), true),
            RouteQuery::new(grid_pos(0, 0), grid_pos(2, 2), 0),
        ];
        let results = router.route_k_many(&queries);
        assert_eq!(results.len(), 3);
        for (q, r) in queries.iter().zip(&results[..2]) {
            let expected = router
                .route_k(q.start, q.end, q.hazard.as_ref(), q.k, q.hard_block_core)
                .unwrap();
            assert_eq!(r.as_ref().unwrap(), &expected);
        }
        assert!(matches!(results[2], Err(EngineError::InvalidK(0))));
    }
}

// ── Serialization ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "serde"))]
mod serde_json_shape {
    use super::helpers::{grid_pos, grid_router};

    #[test]
    fn route_set_shape() {
        let router = grid_router();
        let set = router.route_k(grid_pos(0, 0), grid_pos(1, 0), None, 1, false).unwrap();
        let v = serde_json::to_value(&set).unwrap();
        assert_eq!(v["mode"], "network+directed+k");
        let route = &v["routes"][0];
        assert_eq!(route["path"].as_array().unwrap().len(), 2);
        assert!((route["path"][0][0].as_f64().unwrap() - grid_pos(0, 0).lng).abs() < 1e-9);
        assert!(route["distance_km"].as_f64().unwrap() > 0.0);
        assert!(route["eta_min"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn route_response_shape() {
        let router = grid_router();
        let r = router.route(grid_pos(0, 0), grid_pos(1, 0), None).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["mode"], "network+directed");
        assert!(v["path"].is_array());
    }
}
