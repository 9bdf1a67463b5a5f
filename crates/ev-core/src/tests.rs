//! Unit tests for ev-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId::from_index(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, NodeId(42));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert!(!NodeId::default().is_valid());
        assert!(EdgeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(EdgeId(7).to_string(), "EdgeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{km_to_deg, polyline_length_km};
    use crate::{CoreError, LngLat};

    #[test]
    fn zero_distance() {
        let p = LngLat::new(-122.27, 37.80);
        assert_eq!(p.distance_km(p), 0.0);
    }

    #[test]
    fn planar_scale_factors() {
        let o = LngLat::new(0.0, 0.0);
        assert!((o.distance_km(LngLat::new(1.0, 0.0)) - 111.32).abs() < 1e-9);
        assert!((o.distance_km(LngLat::new(0.0, 1.0)) - 110.57).abs() < 1e-9);
    }

    #[test]
    fn polyline_length_sums_pieces() {
        let line = [
            LngLat::new(0.0, 0.0),
            LngLat::new(0.001, 0.0),
            LngLat::new(0.001, 0.001),
        ];
        let expected = 0.001 * 111.32 + 0.001 * 110.57;
        assert!((polyline_length_km(&line) - expected).abs() < 1e-12);
        assert_eq!(polyline_length_km(&line[..1]), 0.0);
    }

    #[test]
    fn key_is_canonical() {
        let a = LngLat::new(-122.270_000_000_1, 37.8);
        let b = LngLat::new(-122.27, 37.800_000_000_04);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), LngLat::new(-122.270_001, 37.8).key());
    }

    #[test]
    fn projection_clamps_and_interpolates() {
        let a = LngLat::new(0.0, 0.0);
        let b = LngLat::new(1.0, 0.0);

        let (t, q) = LngLat::new(0.25, 0.5).project_onto(a, b);
        assert!((t - 0.25).abs() < 1e-12);
        assert_eq!(q, LngLat::new(0.25, 0.0));

        let (t, q) = LngLat::new(-3.0, 1.0).project_onto(a, b);
        assert_eq!(t, 0.0);
        assert_eq!(q, a);

        let (t, q) = LngLat::new(9.0, -1.0).project_onto(a, b);
        assert_eq!(t, 1.0);
        assert_eq!(q, b);
    }

    #[test]
    fn degenerate_segment_projects_to_start() {
        let a = LngLat::new(2.0, 2.0);
        assert_eq!(LngLat::new(5.0, 5.0).project_onto(a, a), (0.0, a));
    }

    #[test]
    fn validation() {
        assert!(LngLat::try_from_slice(&[-122.0, 37.0]).is_ok());
        assert!(matches!(
            LngLat::try_from_slice(&[1.0]),
            Err(CoreError::InvalidCoordinate(_))
        ));
        assert!(LngLat::try_from_slice(&[1.0, 2.0, 3.0]).is_err());
        assert!(LngLat::new(f64::NAN, 0.0).validated().is_err());
        assert!(LngLat::new(181.0, 0.0).validated().is_err());
        assert!(LngLat::new(0.0, -90.5).validated().is_err());
    }

    #[test]
    fn km_to_deg_uses_longitude_scale() {
        assert!((km_to_deg(111.32) - 1.0).abs() < 1e-12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_pair() {
        let p = LngLat::new(1.5, -2.25);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[1.5,-2.25]");
        let back: LngLat = serde_json::from_str("[1.5,-2.25]").unwrap();
        assert_eq!(back, p);
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, RouterConfig};

    #[test]
    fn default_is_valid() {
        RouterConfig::default().validate().unwrap();
    }

    #[test]
    fn speed_lookup_and_fallback() {
        let cfg = RouterConfig::default();
        assert_eq!(cfg.speed_for(Some("motorway")), 100.0);
        assert_eq!(cfg.speed_for(Some("residential")), 30.0);
        assert_eq!(cfg.speed_for(Some("bridleway")), 30.0);
        assert_eq!(cfg.speed_for(None), 30.0);
    }

    #[test]
    fn weight_includes_penalty() {
        let cfg = RouterConfig::default();
        let w = cfg.edge_weight_hr(3.0, 30.0);
        assert!((w - (0.1 + 0.0003)).abs() < 1e-12);
        // Zero-length edges still cost something.
        assert!(cfg.edge_weight_hr(0.0, 30.0) > 0.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = RouterConfig::default();
        cfg.default_speed_kph = 0.0;
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));

        let mut cfg = RouterConfig::default();
        cfg.speeds_kph.insert("track".into(), f64::NAN);
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.snap_radii_deg = vec![0.01, 0.001];
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.hazard.mid_km = 0.05;
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.hazard.near_factor = 0.5;
        assert!(cfg.validate().is_err());

        let mut cfg = RouterConfig::default();
        cfg.max_k = 0;
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let cfg: RouterConfig =
            serde_json::from_str(r#"{"edge_penalty_hr": 0.003, "hazard": {"near_km": 0.2}}"#).unwrap();
        assert_eq!(cfg.edge_penalty_hr, 0.003);
        assert_eq!(cfg.hazard.near_km, 0.2);
        assert_eq!(cfg.hazard.mid_km, 0.3);
        assert_eq!(cfg.max_k, 10);
        assert_eq!(cfg.speed_for(Some("primary")), 60.0);
    }
}
