//! Base road network and its builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  Given
//! a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_km`,
//! `edge_speed_kph`, `edge_weight_hr`, `edge_highway`) are sorted by source
//! node and indexed by `EdgeId`.  Edge geometry has the granularity of the
//! source data (one edge per consecutive vertex pair), so an edge's polyline
//! is exactly its two endpoint positions.
//!
//! Node identity is the canonical [`NodeKey`] of the coordinate: inserting a
//! coordinate twice yields the same `NodeId`.
//!
//! # Spatial index
//!
//! A [`SegmentIndex`] over every undirected two-point segment is bulk-loaded
//! in [`RoadNetworkBuilder::build`].  The network is immutable afterwards and
//! is shared read-only between concurrent queries.

use std::ops::Range;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use ev_core::{EdgeId, LngLat, NodeId, NodeKey, RouterConfig};

use crate::index::{Segment, SegmentIndex};

// ── Edge attributes ───────────────────────────────────────────────────────────

/// Attributes of one directed edge, used when inserting edges.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
    pub length_km: f64,
    pub speed_kph: f64,
    /// Travel cost in hours: `length_km / speed_kph + edge_penalty_hr`.
    pub weight_hr: f64,
    /// OSM `highway` class, if the source feature carried one.
    pub highway: Option<Arc<str>>,
}

impl EdgeAttrs {
    /// Attributes for a road of the given length and class, with the speed
    /// and weight taken from `config`.
    pub fn for_road(length_km: f64, highway: Option<Arc<str>>, config: &RouterConfig) -> Self {
        let speed_kph = config.speed_for(highway.as_deref());
        Self::with_speed(length_km, speed_kph, highway, config)
    }

    /// Attributes for a piece of an existing road: same speed and class,
    /// weight recomputed for the new length.
    pub fn with_speed(
        length_km: f64,
        speed_kph: f64,
        highway: Option<Arc<str>>,
        config: &RouterConfig,
    ) -> Self {
        Self {
            length_km,
            speed_kph,
            weight_hr: config.edge_weight_hr(length_km, speed_kph),
            highway,
        }
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus the segment index used for snapping.
///
/// All arrays are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`] or the GeoJSON loader.
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<LngLat>,

    node_lookup: FxHashMap<NodeKey, NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    pub edge_length_km: Vec<f64>,
    pub edge_speed_kph: Vec<f64>,
    pub edge_weight_hr: Vec<f64>,
    pub edge_highway: Vec<Option<Arc<str>>>,

    // ── Spatial index ─────────────────────────────────────────────────────
    segment_idx: SegmentIndex,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    ///
    /// Every query against an empty network returns an empty result.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// The node at exactly `pos` (after canonicalization), if any.
    pub fn node_at(&self, pos: LngLat) -> Option<NodeId> {
        self.node_lookup.get(&pos.key()).copied()
    }

    /// The directed edge `from → to`, if present.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    /// The edge's polyline, source first.
    #[inline]
    pub fn edge_polyline(&self, edge: EdgeId) -> [LngLat; 2] {
        let i = edge.index();
        [
            self.node_pos[self.edge_from[i].index()],
            self.node_pos[self.edge_to[i].index()],
        ]
    }

    pub fn segment_index(&self) -> &SegmentIndex {
        &self.segment_idx
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// `EdgeId` range of the outgoing edges of `node`.  Empty for ids that
    /// are not base nodes.
    #[inline]
    pub fn out_edge_range(&self, node: NodeId) -> Range<usize> {
        if node.index() >= self.node_count() {
            return 0..0;
        }
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edge_range(node).map(EdgeId::from_index)
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edge_range(node).len()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes are deduplicated by canonical coordinate.  At most one edge is kept
/// per ordered node pair: adding `u → v` again replaces the earlier edge.
/// Self-loops are ignored.
///
/// # Example
///
/// ```
/// use ev_core::{LngLat, RouterConfig};
/// use ev_spatial::{EdgeAttrs, RoadNetworkBuilder};
///
/// let cfg = RouterConfig::default();
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(LngLat::new(-122.27, 37.80));
/// let c = b.add_node(LngLat::new(-122.26, 37.80));
/// b.add_road(a, c, EdgeAttrs::for_road(0.88, Some("primary".into()), &cfg));
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<LngLat>,
    lookup:    FxHashMap<NodeKey, NodeId>,
    raw_edges: Vec<RawEdge>,
    edge_slot: FxHashMap<(NodeId, NodeId), usize>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    attrs: EdgeAttrs,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            lookup:    FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges: Vec::with_capacity(edges),
            edge_slot: FxHashMap::with_capacity_and_hasher(edges, Default::default()),
        }
    }

    /// Return the node at `pos`, adding it if this coordinate is new.
    pub fn add_node(&mut self, pos: LngLat) -> NodeId {
        let next = NodeId::from_index(self.nodes.len());
        let id = *self.lookup.entry(pos.key()).or_insert(next);
        if id == next {
            self.nodes.push(pos);
        }
        id
    }

    /// Add a **directed** edge `from → to`.  Returns `false` for self-loops,
    /// which are dropped.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, attrs: EdgeAttrs) -> bool {
        if from == to {
            return false;
        }
        let edge = RawEdge { from, to, attrs };
        match self.edge_slot.get(&(from, to)) {
            Some(&slot) => self.raw_edges[slot] = edge,
            None => {
                self.edge_slot.insert((from, to), self.raw_edges.len());
                self.raw_edges.push(edge);
            }
        }
        true
    }

    /// Convenience: add edges in **both directions** with the same attributes.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, attrs: EdgeAttrs) {
        self.add_directed_edge(b, a, attrs.clone());
        self.add_directed_edge(a, b, attrs);
    }

    pub fn node_pos(&self, id: NodeId) -> LngLat {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(S log S) for the
    /// segment index bulk load, where S ≤ E is the number of undirected
    /// segments.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Sort by (source, target) so CSR rows are contiguous and stable.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| (e.from, e.to));

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // One index entry per undirected pair, whichever directions exist.
        let mut seen: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
        let mut segments = Vec::with_capacity(edge_count);
        for e in &raw {
            let (a, b) = if e.from < e.to { (e.from, e.to) } else { (e.to, e.from) };
            if seen.insert((a, b)) {
                segments.push(Segment::new(a, b, self.nodes[a.index()], self.nodes[b.index()]));
            }
        }

        let mut edge_from      = Vec::with_capacity(edge_count);
        let mut edge_to        = Vec::with_capacity(edge_count);
        let mut edge_length_km = Vec::with_capacity(edge_count);
        let mut edge_speed_kph = Vec::with_capacity(edge_count);
        let mut edge_weight_hr = Vec::with_capacity(edge_count);
        let mut edge_highway   = Vec::with_capacity(edge_count);
        for e in raw {
            edge_from.push(e.from);
            edge_to.push(e.to);
            edge_length_km.push(e.attrs.length_km);
            edge_speed_kph.push(e.attrs.speed_kph);
            edge_weight_hr.push(e.attrs.weight_hr);
            edge_highway.push(e.attrs.highway);
        }

        RoadNetwork {
            node_pos: self.nodes,
            node_lookup: self.lookup,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_km,
            edge_speed_kph,
            edge_weight_hr,
            edge_highway,
            segment_idx: SegmentIndex::new(segments),
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
