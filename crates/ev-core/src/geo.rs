//! Geographic coordinate type and planar distance helpers.
//!
//! `LngLat` stores `f64` longitude/latitude in GeoJSON axis order.  Distances
//! use a fixed-scale planar approximation (one degree of longitude ≈
//! 111.32 km, one degree of latitude ≈ 110.57 km).  It ignores the cosine of
//! latitude, which is acceptable for relative costs inside a single city.
//!
//! Graph identity never compares raw floats: every coordinate is mapped to a
//! [`NodeKey`] in integer nano-degrees first.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Kilometres per degree of longitude in the planar approximation.
pub const KM_PER_DEG_LNG: f64 = 111.32;
/// Kilometres per degree of latitude in the planar approximation.
pub const KM_PER_DEG_LAT: f64 = 110.57;

/// Nano-degrees per degree; resolution of [`NodeKey`] (~0.1 mm).
const KEY_SCALE: f64 = 1e9;

// ── LngLat ────────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate in `(lng, lat)` order.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[inline]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Build a coordinate from caller input, rejecting anything that is not
    /// exactly two finite numbers inside the WGS-84 range.
    pub fn try_from_slice(values: &[f64]) -> CoreResult<Self> {
        let [lng, lat] = values else {
            return Err(CoreError::InvalidCoordinate(format!(
                "expected [lng, lat], got {} values",
                values.len()
            )));
        };
        Self::new(*lng, *lat).validated()
    }

    /// Return `self` if it is finite and within ±180 / ±90 degrees.
    pub fn validated(self) -> CoreResult<Self> {
        if !self.lng.is_finite() || !self.lat.is_finite() {
            return Err(CoreError::InvalidCoordinate(format!("{self} is not finite")));
        }
        if self.lng.abs() > 180.0 || self.lat.abs() > 90.0 {
            return Err(CoreError::InvalidCoordinate(format!("{self} is out of range")));
        }
        Ok(self)
    }

    /// Canonical hashable identity of this coordinate.
    #[inline]
    pub fn key(self) -> NodeKey {
        NodeKey {
            lng_e9: (self.lng * KEY_SCALE).round() as i64,
            lat_e9: (self.lat * KEY_SCALE).round() as i64,
        }
    }

    /// Planar distance in kilometres.
    #[inline]
    pub fn distance_km(self, other: LngLat) -> f64 {
        let dx = (other.lng - self.lng) * KM_PER_DEG_LNG;
        let dy = (other.lat - self.lat) * KM_PER_DEG_LAT;
        dx.hypot(dy)
    }

    /// Project `self` onto segment `a → b` in raw degree space.
    ///
    /// Returns the clamped parameter `t ∈ [0, 1]` and the interpolated point.
    /// A degenerate segment projects everything onto `a`.
    pub fn project_onto(self, a: LngLat, b: LngLat) -> (f64, LngLat) {
        let (dx, dy) = (b.lng - a.lng, b.lat - a.lat);
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return (0.0, a);
        }
        let t = (((self.lng - a.lng) * dx + (self.lat - a.lat) * dy) / len2).clamp(0.0, 1.0);
        (t, a.lerp(b, t))
    }

    /// Squared distance in degree space from `self` to segment `a → b`.
    #[inline]
    pub fn segment_distance2_deg(self, a: LngLat, b: LngLat) -> f64 {
        let (_, q) = self.project_onto(a, b);
        let (dx, dy) = (self.lng - q.lng, self.lat - q.lat);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn lerp(self, other: LngLat, t: f64) -> LngLat {
        LngLat::new(
            self.lng + (other.lng - self.lng) * t,
            self.lat + (other.lat - self.lat) * t,
        )
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self::new(lng, lat)
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.7}, {:.7}]", self.lng, self.lat)
    }
}

/// Total planar length of a polyline in kilometres.
pub fn polyline_length_km(coords: &[LngLat]) -> f64 {
    coords.windows(2).map(|w| w[0].distance_km(w[1])).sum()
}

/// Convert a real-world distance to degrees for buffer radii.
///
/// Uses the longitude scale for both axes, so buffers are slightly wider
/// north–south than their nominal size.
#[inline]
pub fn km_to_deg(km: f64) -> f64 {
    km / KM_PER_DEG_LNG
}

// ── NodeKey ───────────────────────────────────────────────────────────────────

/// Fixed-precision identity of a coordinate, in integer nano-degrees.
///
/// Two coordinates denote the same graph node iff their keys are equal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeKey {
    pub lng_e9: i64,
    pub lat_e9: i64,
}

impl From<LngLat> for NodeKey {
    #[inline]
    fn from(p: LngLat) -> Self {
        p.key()
    }
}
