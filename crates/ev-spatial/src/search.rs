//! Shortest-path search: Dijkstra and Yen's k-shortest loopless paths.
//!
//! # Graph abstraction
//!
//! Both algorithms run over anything implementing [`RoutingGraph`]: the
//! immutable [`RoadNetwork`] or a query's [`WorkingGraph`] overlay.
//!
//! # Cost units
//!
//! Costs are edge weights in **hours** (`f64`, non-negative).  Hazard
//! multipliers are already folded into the weights of a working graph, so a
//! path's `cost_hr` is what the caller reports as ETA.
//!
//! # k-shortest paths
//!
//! [`KShortestPaths`] is a lazy iterator: each `next()` does only the work
//! needed to produce one more path, so `take(k)` never computes path `k + 1`.
//! It is finite and cannot be restarted.
//!
//! [`WorkingGraph`]: crate::WorkingGraph

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use rustc_hash::FxHashSet;

use ev_core::{EdgeId, LngLat, NodeId};

use crate::network::RoadNetwork;

// ── RoutingGraph ──────────────────────────────────────────────────────────────

/// Read access to a directed, weighted road graph.
///
/// Node and edge ids are dense: valid node ids are `0..node_count()`.
pub trait RoutingGraph {
    fn node_count(&self) -> usize;

    /// Live outgoing edges of `node`.  Must be empty for unknown nodes.
    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_;

    fn edge_source(&self, edge: EdgeId) -> NodeId;
    fn edge_target(&self, edge: EdgeId) -> NodeId;

    /// Traversal cost in hours.  Never negative.
    fn edge_weight_hr(&self, edge: EdgeId) -> f64;

    /// Physical length in km, unaffected by hazard multipliers.
    fn edge_length_km(&self, edge: EdgeId) -> f64;

    /// Edge geometry, source end first.
    fn edge_polyline(&self, edge: EdgeId) -> [LngLat; 2];

    #[inline]
    fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }
}

impl RoutingGraph for RoadNetwork {
    fn node_count(&self) -> usize {
        RoadNetwork::node_count(self)
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        RoadNetwork::out_edges(self, node)
    }

    #[inline]
    fn edge_source(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    fn edge_target(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    fn edge_weight_hr(&self, edge: EdgeId) -> f64 {
        self.edge_weight_hr[edge.index()]
    }

    #[inline]
    fn edge_length_km(&self, edge: EdgeId) -> f64 {
        self.edge_length_km[edge.index()]
    }

    fn edge_polyline(&self, edge: EdgeId) -> [LngLat; 2] {
        RoadNetwork::edge_polyline(self, edge)
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// A simple path: `nodes.len() == edges.len() + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    /// Sum of edge weights in hours.
    pub cost_hr: f64,
}

impl Path {
    /// The zero-edge path at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: vec![], cost_hr: 0.0 }
    }

    /// `true` if source and target are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }
}

// ── Cost ordering ─────────────────────────────────────────────────────────────

/// `f64` with a total order, for heap keys.
#[derive(Copy, Clone, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Nodes and edges a search must not use.
#[derive(Default)]
struct Exclusions {
    nodes: FxHashSet<NodeId>,
    edges: FxHashSet<EdgeId>,
}

/// Cheapest path `from → to`, or `None` if either endpoint is absent or `to`
/// is unreachable.  `from == to` yields the zero-edge path.
pub fn shortest_path<G: RoutingGraph>(graph: &G, from: NodeId, to: NodeId) -> Option<Path> {
    dijkstra(graph, from, to, &Exclusions::default())
}

fn dijkstra<G: RoutingGraph>(
    graph: &G,
    from: NodeId,
    to: NodeId,
    excluded: &Exclusions,
) -> Option<Path> {
    if !graph.contains_node(from) || !graph.contains_node(to) {
        return None;
    }
    if from == to {
        return Some(Path::trivial(from));
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0.0;

    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Some(reconstruct(graph, &prev_edge, from, to, cost));
        }
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            if excluded.edges.contains(&edge) {
                continue;
            }
            let next = graph.edge_target(edge);
            if excluded.nodes.contains(&next) {
                continue;
            }
            let new_cost = cost + graph.edge_weight_hr(edge);
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev_edge[next.index()] = edge;
                heap.push(Reverse((Cost(new_cost), next)));
            }
        }
    }

    None
}

fn reconstruct<G: RoutingGraph>(
    graph: &G,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    cost_hr: f64,
) -> Path {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = graph.edge_source(e);
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Path { nodes, edges, cost_hr }
}

// ── Yen's k-shortest loopless paths ───────────────────────────────────────────

/// A deviation path waiting in the candidate heap.  Ordered by cost, then hop
/// count, then node sequence, so equal-cost candidates pop deterministically.
struct Candidate(Path);

impl Candidate {
    fn key(&self) -> (Cost, usize, &[NodeId]) {
        (Cost(self.0.cost_hr), self.0.edges.len(), &self.0.nodes)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Lazily generated simple paths `source → target` in non-decreasing cost
/// order (Yen's algorithm).
///
/// The first item is the global shortest path.  Each later item is the
/// cheapest path not yet returned that deviates from a returned path at some
/// spur node: the root prefix up to the spur is kept, the edges that would
/// reproduce an already-returned path with the same root are excluded, the
/// root's other nodes are excluded (keeping the path loopless), and a spur
/// path to the target is searched.  Iteration ends when no candidate is left.
///
/// ```ignore
/// let routes: Vec<Path> = KShortestPaths::new(&working, s, t).take(3).collect();
/// ```
pub struct KShortestPaths<'g, G: RoutingGraph> {
    graph:      &'g G,
    source:     NodeId,
    target:     NodeId,
    accepted:   Vec<Path>,
    candidates: BinaryHeap<Reverse<Candidate>>,
    seen:       FxHashSet<Vec<NodeId>>,
    exhausted:  bool,
}

impl<'g, G: RoutingGraph> KShortestPaths<'g, G> {
    pub fn new(graph: &'g G, source: NodeId, target: NodeId) -> Self {
        Self {
            graph,
            source,
            target,
            accepted:   Vec::new(),
            candidates: BinaryHeap::new(),
            seen:       FxHashSet::default(),
            exhausted:  false,
        }
    }

    /// Paths returned so far, in order.
    pub fn accepted(&self) -> &[Path] {
        &self.accepted
    }

    fn path_cost(&self, edges: &[EdgeId]) -> f64 {
        edges.iter().map(|&e| self.graph.edge_weight_hr(e)).sum()
    }

    /// Push every deviation of the most recently accepted path.
    fn expand_last(&mut self) {
        let Some(last) = self.accepted.last() else {
            return;
        };
        let last = last.clone();

        for i in 0..last.edges.len() {
            let spur = last.nodes[i];
            let root_nodes = &last.nodes[..=i];

            let mut excluded = Exclusions::default();
            for p in &self.accepted {
                if p.edges.len() > i && p.nodes[..=i] == *root_nodes {
                    excluded.edges.insert(p.edges[i]);
                }
            }
            excluded.nodes.extend(root_nodes[..i].iter().copied());

            let Some(spur_path) = dijkstra(self.graph, spur, self.target, &excluded) else {
                continue;
            };

            let mut nodes = root_nodes[..i].to_vec();
            nodes.extend_from_slice(&spur_path.nodes);
            if !self.seen.insert(nodes.clone()) {
                continue;
            }
            let mut edges = last.edges[..i].to_vec();
            edges.extend_from_slice(&spur_path.edges);
            let cost_hr = self.path_cost(&edges);

            self.candidates.push(Reverse(Candidate(Path { nodes, edges, cost_hr })));
        }
    }
}

impl<G: RoutingGraph> Iterator for KShortestPaths<'_, G> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        if self.exhausted {
            return None;
        }

        let next = if self.accepted.is_empty() {
            dijkstra(self.graph, self.source, self.target, &Exclusions::default())
                .inspect(|p| {
                    self.seen.insert(p.nodes.clone());
                })
        } else {
            self.expand_last();
            self.candidates.pop().map(|Reverse(Candidate(p))| p)
        };

        match next {
            Some(path) => {
                self.accepted.push(path.clone());
                Some(path)
            }
            None => {
                self.exhausted = true;
                self.candidates.clear();
                None
            }
        }
    }
}

impl<G: RoutingGraph> FusedIterator for KShortestPaths<'_, G> {}
