//! Router configuration.
//!
//! # Design
//!
//! One plain struct holds every tunable of the routing engine.  Applications
//! typically load it from a JSON file (with the `serde` feature) and pass it
//! to the engine; every field has a default so partial files work.
//!
//! # Per-edge penalty
//!
//! Each directed edge costs `length_km / speed_kph + edge_penalty_hr` hours.
//! The default penalty is **0.0003 h (≈ 1.08 s)** per edge.  It only breaks
//! near-ties between paths in favour of fewer, longer edges.

use std::collections::BTreeMap;

use crate::{CoreError, CoreResult};

/// Hazard buffer radii and weight multipliers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HazardBands {
    /// Radius of the "near" band around the hazard, km.  Default: 0.1.
    pub near_km: f64,
    /// Radius of the "mid" band around the hazard, km.  Default: 0.3.
    pub mid_km: f64,
    /// Weight multiplier for edges crossing the hazard itself.
    pub core_factor: f64,
    pub near_factor: f64,
    pub mid_factor: f64,
}

impl Default for HazardBands {
    fn default() -> Self {
        Self {
            near_km:     0.1,
            mid_km:      0.3,
            core_factor: 10.0,
            near_factor: 3.0,
            mid_factor:  1.5,
        }
    }
}

/// Top-level routing configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Assumed travel speed per OSM `highway` class, km/h.
    pub speeds_kph: BTreeMap<String, f64>,

    /// Speed for unknown or missing `highway` classes.  Default: 30 km/h.
    pub default_speed_kph: f64,

    /// Fixed cost added to every directed edge, hours.
    pub edge_penalty_hr: f64,

    pub hazard: HazardBands,

    /// Ascending search radii (degrees) for nearest-segment snapping.
    pub snap_radii_deg: Vec<f64>,

    /// Upper bound on `k` for k-shortest queries.
    pub max_k: usize,
}

impl RouterConfig {
    /// Speed in km/h for a road class, falling back to `default_speed_kph`.
    ///
    /// Never returns less than `1e-6`, so callers can divide by it.
    pub fn speed_for(&self, highway: Option<&str>) -> f64 {
        highway
            .and_then(|h| self.speeds_kph.get(h).copied())
            .unwrap_or(self.default_speed_kph)
            .max(1e-6)
    }

    /// Edge weight in hours for a stretch of road.
    #[inline]
    pub fn edge_weight_hr(&self, length_km: f64, speed_kph: f64) -> f64 {
        length_km / speed_kph.max(1e-6) + self.edge_penalty_hr
    }

    /// Reject configurations that would produce zero, negative, or
    /// non-monotone costs.
    pub fn validate(&self) -> CoreResult<()> {
        // NaN fails every comparison, so each check is phrased as "holds".
        let positive = |x: f64| x > 0.0;
        let bad = |msg: String| Err(CoreError::Config(msg));

        if let Some((class, speed)) = self.speeds_kph.iter().find(|(_, s)| !positive(**s)) {
            return bad(format!("speed for {class:?} must be positive, got {speed}"));
        }
        if !positive(self.default_speed_kph) {
            return bad(format!("default_speed_kph must be positive, got {}", self.default_speed_kph));
        }
        if self.edge_penalty_hr.is_nan() || self.edge_penalty_hr < 0.0 {
            return bad(format!("edge_penalty_hr must be >= 0, got {}", self.edge_penalty_hr));
        }
        let h = &self.hazard;
        let bands_ordered = h.near_km >= 0.0 && h.mid_km >= h.near_km;
        if !bands_ordered {
            return bad(format!(
                "hazard bands must satisfy 0 <= near_km <= mid_km, got {} / {}",
                h.near_km, h.mid_km
            ));
        }
        if [h.core_factor, h.near_factor, h.mid_factor].iter().any(|f| f.is_nan() || *f < 1.0) {
            return bad("hazard factors must be >= 1".into());
        }
        let radii = &self.snap_radii_deg;
        let ascending = radii.windows(2).all(|w| w[0] < w[1]);
        if radii.is_empty() || !positive(radii[0]) || !ascending {
            return bad("snap_radii_deg must be non-empty, positive, and strictly ascending".into());
        }
        if self.max_k == 0 {
            return bad("max_k must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        let speeds_kph = [
            ("motorway", 100.0),
            ("motorway_link", 80.0),
            ("trunk", 80.0),
            ("trunk_link", 70.0),
            ("primary", 60.0),
            ("primary_link", 50.0),
            ("secondary", 50.0),
            ("secondary_link", 45.0),
            ("tertiary", 40.0),
            ("tertiary_link", 35.0),
            ("unclassified", 35.0),
            ("residential", 30.0),
            ("living_street", 15.0),
            ("service", 20.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        Self {
            speeds_kph,
            default_speed_kph: 30.0,
            edge_penalty_hr:   0.0003,
            hazard:            HazardBands::default(),
            snap_radii_deg:    vec![0.0001, 0.0003, 0.001, 0.003, 0.01],
            max_k:             10,
        }
    }
}
