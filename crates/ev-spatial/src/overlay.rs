//! Query-scoped working graph layered over the immutable base network.
//!
//! A [`WorkingGraph`] borrows the base [`RoadNetwork`] and records every
//! per-query change as a small delta:
//!
//! | Change                     | Stored as                                  |
//! |----------------------------|--------------------------------------------|
//! | new node (snapped point)   | `extra_pos`, ids from `base.node_count()`  |
//! | new edge (split piece)     | `extra_*`, ids from `base.edge_count()`    |
//! | removed edge               | `removed` set (base or extra ids)          |
//! | re-weighted base edge      | `weight_override` map                      |
//!
//! Building one costs O(1); nothing in the base network is copied or
//! mutated.  Dropping the working graph discards all of the query's splits
//! and hazard penalties.

use rustc_hash::{FxHashMap, FxHashSet};

use ev_core::{EdgeId, LngLat, NodeId, NodeKey};

use crate::network::{EdgeAttrs, RoadNetwork};
use crate::search::RoutingGraph;

/// Private per-query overlay.  See the module docs.
pub struct WorkingGraph<'n> {
    base: &'n RoadNetwork,

    extra_pos:    Vec<LngLat>,
    extra_lookup: FxHashMap<NodeKey, NodeId>,

    extra_from:  Vec<NodeId>,
    extra_to:    Vec<NodeId>,
    extra_attrs: Vec<EdgeAttrs>,
    /// Overlay edges grouped by source node (base or overlay node).
    extra_out:   FxHashMap<NodeId, Vec<EdgeId>>,

    removed:         FxHashSet<EdgeId>,
    weight_override: FxHashMap<EdgeId, f64>,

    /// Split points per base segment `(a, b)`, as `(t, node)` sorted by `t`.
    splits: FxHashMap<(NodeId, NodeId), Vec<(f64, NodeId)>>,
}

impl<'n> WorkingGraph<'n> {
    pub fn new(base: &'n RoadNetwork) -> Self {
        Self {
            base,
            extra_pos:       Vec::new(),
            extra_lookup:    FxHashMap::default(),
            extra_from:      Vec::new(),
            extra_to:        Vec::new(),
            extra_attrs:     Vec::new(),
            extra_out:       FxHashMap::default(),
            removed:         FxHashSet::default(),
            weight_override: FxHashMap::default(),
            splits:          FxHashMap::default(),
        }
    }

    pub fn base(&self) -> &'n RoadNetwork {
        self.base
    }

    // ── Ids ───────────────────────────────────────────────────────────────

    #[inline]
    fn extra_edge_slot(&self, edge: EdgeId) -> Option<usize> {
        edge.index().checked_sub(self.base.edge_count())
    }

    /// Total edge ids ever allocated, including removed ones.
    pub fn edge_id_bound(&self) -> usize {
        self.base.edge_count() + self.extra_from.len()
    }

    /// Every edge that has not been removed.
    pub fn live_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_id_bound())
            .map(EdgeId::from_index)
            .filter(|e| !self.removed.contains(e))
    }

    pub fn is_removed(&self, edge: EdgeId) -> bool {
        self.removed.contains(&edge)
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    pub fn node_pos(&self, node: NodeId) -> LngLat {
        match node.index().checked_sub(self.base.node_count()) {
            None => self.base.node_pos[node.index()],
            Some(i) => self.extra_pos[i],
        }
    }

    /// The node at exactly `pos` (after canonicalization), base or overlay.
    pub fn node_at(&self, pos: LngLat) -> Option<NodeId> {
        self.base
            .node_at(pos)
            .or_else(|| self.extra_lookup.get(&pos.key()).copied())
    }

    /// Return the node at `pos`, adding an overlay node if the coordinate is
    /// new to both the base network and this overlay.
    pub fn add_node(&mut self, pos: LngLat) -> NodeId {
        if let Some(id) = self.node_at(pos) {
            return id;
        }
        let id = NodeId::from_index(self.base.node_count() + self.extra_pos.len());
        self.extra_pos.push(pos);
        self.extra_lookup.insert(pos.key(), id);
        id
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// The live directed edge `from → to`, if any.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        RoutingGraph::out_edges(self, from).find(|&e| self.edge_target(e) == to)
    }

    /// Attributes of a live or removed edge, with the current weight.
    pub fn edge_attrs(&self, edge: EdgeId) -> EdgeAttrs {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_attrs[i].clone(),
            None => {
                let i = edge.index();
                EdgeAttrs {
                    length_km: self.base.edge_length_km[i],
                    speed_kph: self.base.edge_speed_kph[i],
                    weight_hr: self.edge_weight_hr(edge),
                    highway:   self.base.edge_highway[i].clone(),
                }
            }
        }
    }

    /// Add a directed overlay edge.  Any live edge `from → to` is removed
    /// first, keeping at most one edge per ordered pair.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) -> EdgeId {
        if let Some(old) = self.find_edge(from, to) {
            self.removed.insert(old);
        }
        let id = EdgeId::from_index(self.edge_id_bound());
        self.extra_from.push(from);
        self.extra_to.push(to);
        self.extra_attrs.push(attrs);
        self.extra_out.entry(from).or_default().push(id);
        id
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> bool {
        self.removed.insert(edge)
    }

    /// Reinstate previously removed edges.
    pub fn restore_edges(&mut self, edges: &[EdgeId]) {
        for e in edges {
            self.removed.remove(e);
        }
    }

    pub fn set_weight_hr(&mut self, edge: EdgeId, weight_hr: f64) {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_attrs[i].weight_hr = weight_hr,
            None => {
                self.weight_override.insert(edge, weight_hr);
            }
        }
    }

    // ── Split bookkeeping ─────────────────────────────────────────────────

    /// Split points already inserted on base segment `(a, b)`, by `t`.
    pub fn split_points(&self, a: NodeId, b: NodeId) -> &[(f64, NodeId)] {
        self.splits.get(&(a, b)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn record_split(&mut self, a: NodeId, b: NodeId, t: f64, node: NodeId) {
        let marks = self.splits.entry((a, b)).or_default();
        let at = marks.partition_point(|(s, _)| *s < t);
        marks.insert(at, (t, node));
    }
}

impl RoutingGraph for WorkingGraph<'_> {
    fn node_count(&self) -> usize {
        self.base.node_count() + self.extra_pos.len()
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.base
            .out_edges(node)
            .chain(self.extra_out.get(&node).into_iter().flatten().copied())
            .filter(|e| !self.removed.contains(e))
    }

    fn edge_source(&self, edge: EdgeId) -> NodeId {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_from[i],
            None => self.base.edge_from[edge.index()],
        }
    }

    fn edge_target(&self, edge: EdgeId) -> NodeId {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_to[i],
            None => self.base.edge_to[edge.index()],
        }
    }

    fn edge_weight_hr(&self, edge: EdgeId) -> f64 {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_attrs[i].weight_hr,
            None => self
                .weight_override
                .get(&edge)
                .copied()
                .unwrap_or(self.base.edge_weight_hr[edge.index()]),
        }
    }

    fn edge_length_km(&self, edge: EdgeId) -> f64 {
        match self.extra_edge_slot(edge) {
            Some(i) => self.extra_attrs[i].length_km,
            None => self.base.edge_length_km[edge.index()],
        }
    }

    fn edge_polyline(&self, edge: EdgeId) -> [LngLat; 2] {
        [
            self.node_pos(self.edge_source(edge)),
            self.node_pos(self.edge_target(edge)),
        ]
    }
}
