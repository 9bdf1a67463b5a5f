//! Nearest-segment lookup over the base network.
//!
//! The index holds every undirected two-point segment of the base network in
//! an R-tree (via `rstar`).  It is built once and never mutated; query-time
//! splits live in the working overlay, not here.

use rstar::{RTree, RTreeObject, AABB};

use ev_core::{LngLat, NodeId};

// ── Segment ───────────────────────────────────────────────────────────────────

/// An undirected base segment `a`–`b` with its endpoint positions.
///
/// `a < b` by id; the directed edges `a → b` / `b → a` may or may not exist
/// depending on one-way rules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub a: NodeId,
    pub b: NodeId,
    pub a_pos: LngLat,
    pub b_pos: LngLat,
}

impl Segment {
    pub fn new(a: NodeId, b: NodeId, a_pos: LngLat, b_pos: LngLat) -> Self {
        Self { a, b, a_pos, b_pos }
    }

    #[inline]
    pub fn length_km(&self) -> f64 {
        self.a_pos.distance_km(self.b_pos)
    }

    /// Squared distance from `p` in degree space.
    #[inline]
    pub fn distance2_deg(&self, p: LngLat) -> f64 {
        p.segment_distance2_deg(self.a_pos, self.b_pos)
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

impl RTreeObject for Segment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.a_pos.lng, self.a_pos.lat],
            [self.b_pos.lng, self.b_pos.lat],
        )
    }
}

// ── SegmentIndex ──────────────────────────────────────────────────────────────

/// Immutable R-tree of base segments.
pub struct SegmentIndex {
    tree: RTree<Segment>,
}

impl SegmentIndex {
    /// Bulk-load the index (O(S log S)).
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { tree: RTree::bulk_load(segments) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.tree.iter()
    }

    /// Nearest segment to `p`.
    ///
    /// Tries each radius in `radii_deg` (ascending) and returns the nearest
    /// segment lying within that distance of `p`.  If even the largest radius
    /// finds nothing, falls back to scanning every segment.  Returns `None`
    /// only for an empty index.
    pub fn nearest_segment(&self, p: LngLat, radii_deg: &[f64]) -> Option<Segment> {
        for &r in radii_deg {
            let window = AABB::from_corners([p.lng - r, p.lat - r], [p.lng + r, p.lat + r]);
            let hit = closest(
                self.tree
                    .locate_in_envelope_intersecting(&window)
                    .filter(|s| s.distance2_deg(p) <= r * r),
                p,
            );
            if hit.is_some() {
                return hit;
            }
        }

        if !self.is_empty() {
            log::debug!(
                "no segment within {} deg of {p}; scanning all {} segments",
                radii_deg.last().copied().unwrap_or(0.0),
                self.len()
            );
        }
        self.nearest_segment_exhaustive(p)
    }

    /// Nearest segment by linear scan.  Always exact; O(S).
    pub fn nearest_segment_exhaustive(&self, p: LngLat) -> Option<Segment> {
        closest(self.tree.iter(), p)
    }
}

/// The candidate nearest to `p`; ties go to the lower `(a, b)` id pair so
/// results do not depend on R-tree iteration order.
fn closest<'a>(candidates: impl Iterator<Item = &'a Segment>, p: LngLat) -> Option<Segment> {
    candidates
        .map(|s| (s.distance2_deg(p), s))
        .min_by(|(da, sa), (db, sb)| {
            da.total_cmp(db).then_with(|| (sa.a, sa.b).cmp(&(sb.a, sb.b)))
        })
        .map(|(_, s)| *s)
}
