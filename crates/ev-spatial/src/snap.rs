//! Attaching query points to the network.
//!
//! Snapping finds the nearest base segment and splits it at the projected
//! point inside a [`WorkingGraph`].  The base network and its index are never
//! touched.

use ev_core::{LngLat, NodeId, RouterConfig};

use crate::index::Segment;
use crate::network::EdgeAttrs;
use crate::overlay::WorkingGraph;

/// Snap `point` onto the nearest segment of `working`'s base network.
///
/// Returns the node to route from/to, or `None` if the network has no
/// segments.
pub fn snap_point(working: &mut WorkingGraph<'_>, point: LngLat, config: &RouterConfig) -> Option<NodeId> {
    let segment = working
        .base()
        .segment_index()
        .nearest_segment(point, &config.snap_radii_deg)?;
    let node = split_segment(working, &segment, point, config);
    log::debug!("snapped {point} to {node} on segment {}–{}", segment.a, segment.b);
    Some(node)
}

/// Split `segment` at the projection of `point`, in `working` only.
///
/// The projection `q` is computed against the full base segment.  If `q` is
/// one of the segment's endpoints that endpoint is returned unchanged.
/// Otherwise the live edges between the split points bracketing `q` (the
/// segment's endpoints, or points inserted by earlier splits in this query)
/// are replaced by edges through `q`, keeping their direction, speed, and
/// class and recomputing weight from the new lengths.
pub fn split_segment(
    working: &mut WorkingGraph<'_>,
    segment: &Segment,
    point: LngLat,
    config: &RouterConfig,
) -> NodeId {
    let (t, q) = point.project_onto(segment.a_pos, segment.b_pos);
    let key = q.key();
    if key == segment.a_pos.key() {
        return segment.a;
    }
    if key == segment.b_pos.key() {
        return segment.b;
    }

    let marks = working.split_points(segment.a, segment.b);
    if let Some(&(_, existing)) = marks.iter().find(|(_, n)| working.node_pos(*n).key() == key) {
        return existing;
    }
    let lo = marks.iter().rev().find(|(s, _)| *s < t).map_or(segment.a, |&(_, n)| n);
    let hi = marks.iter().find(|(s, _)| *s > t).map_or(segment.b, |&(_, n)| n);

    let forward = working.find_edge(lo, hi).map(|e| (e, working.edge_attrs(e)));
    let backward = working.find_edge(hi, lo).map(|e| (e, working.edge_attrs(e)));

    let q_id = working.add_node(q);
    let (lo_pos, hi_pos) = (working.node_pos(lo), working.node_pos(hi));
    let piece = |from: LngLat, to: LngLat, like: &EdgeAttrs| {
        EdgeAttrs::with_speed(from.distance_km(to), like.speed_kph, like.highway.clone(), config)
    };

    if let Some((edge, attrs)) = forward {
        working.remove_edge(edge);
        working.add_edge(lo, q_id, piece(lo_pos, q, &attrs));
        working.add_edge(q_id, hi, piece(q, hi_pos, &attrs));
    }
    if let Some((edge, attrs)) = backward {
        working.remove_edge(edge);
        working.add_edge(hi, q_id, piece(hi_pos, q, &attrs));
        working.add_edge(q_id, lo, piece(q, lo_pos, &attrs));
    }
    working.record_split(segment.a, segment.b, t, q_id);
    q_id
}
