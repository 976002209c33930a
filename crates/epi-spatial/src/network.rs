//! Undirected environment graph and its builder.
//!
//! # Data layout
//!
//! Adjacency is stored in **Compressed Sparse Row (CSR)** form.  Every
//! undirected edge is stored once per direction; the neighbours of node `n`
//! occupy
//!
//! ```text
//! adj_to[ adj_start[n] .. adj_start[n+1] ]
//! ```
//!
//! with the matching geometric lengths in `adj_length_m`.
//!
//! # Construction
//!
//! 1. Road lines: every distinct coordinate becomes a road node (exact
//!    [`CoordKey`] deduplication), consecutive coordinates are connected.
//! 2. [`NetworkBuilder::freeze_roads`] bulk-loads an R-tree over the road
//!    nodes.
//! 3. Each building gets its own node at its centroid, connected to the
//!    nearest road node.  `rstar`'s nearest-neighbour search widens its
//!    search envelope until a node is found, so isolated buildings far from
//!    any road are still attached.
//! 4. [`NetworkBuilder::build`] produces CSR arrays and labels connected
//!    components with a BFS pass.

use std::collections::VecDeque;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::{FxHashMap, FxHashSet};

use epi_core::{BuildingId, ComponentId, CoordKey, NodeId, Point};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the road R-tree: a 2-D `[x, y]` point with its `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NodeKind ──────────────────────────────────────────────────────────────────

/// What a graph vertex stands for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Road intersection or polyline vertex.
    Road,
    /// Entry point of a building.
    Building(BuildingId),
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Undirected graph in CSR form plus the road-node spatial index.
///
/// Fields are `pub` for direct indexed access on hot paths.  Build with
/// [`NetworkBuilder`].
pub struct Network {
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos:       Vec<Point>,
    pub node_kind:      Vec<NodeKind>,
    /// Component label of each node, assigned once by `build()`.
    pub node_component: Vec<ComponentId>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub adj_start:    Vec<u32>,
    pub adj_to:       Vec<NodeId>,
    pub adj_length_m: Vec<f64>,

    component_count: u32,
    road_index:      RTree<NodeEntry>,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adj_to.len() / 2
    }

    pub fn component_count(&self) -> u32 {
        self.component_count
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn component(&self, node: NodeId) -> ComponentId {
        self.node_component[node.index()]
    }

    /// `(neighbour, length_m)` pairs adjacent to `node`.
    #[inline]
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let start = self.adj_start[node.index()] as usize;
        let end   = self.adj_start[node.index() + 1] as usize;
        (start..end).map(|i| (self.adj_to[i], self.adj_length_m[i]))
    }

    pub fn degree(&self, node: NodeId) -> usize {
        (self.adj_start[node.index() + 1] - self.adj_start[node.index()]) as usize
    }

    /// Nearest road node to `pos`; `None` only for a network without roads.
    pub fn nearest_road_node(&self, pos: Point) -> Option<NodeId> {
        self.road_index.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Incremental graph construction; see the module docs for the phases.
#[derive(Default)]
pub struct NetworkBuilder {
    nodes:      Vec<Point>,
    kinds:      Vec<NodeKind>,
    edges:      Vec<(NodeId, NodeId)>,
    edge_set:   FxHashSet<(NodeId, NodeId)>,
    coord_ids:  FxHashMap<CoordKey, NodeId>,
    road_index: Option<RTree<NodeEntry>>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push_node(&mut self, pos: Point, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.kinds.push(kind);
        id
    }

    /// The road node at `pos`, created on first use.
    pub fn road_node(&mut self, pos: Point) -> NodeId {
        debug_assert!(self.road_index.is_none(), "roads are frozen");
        let key = CoordKey::from(pos);
        if let Some(&id) = self.coord_ids.get(&key) {
            return id;
        }
        let id = self.push_node(pos, NodeKind::Road);
        self.coord_ids.insert(key, id);
        id
    }

    /// Add an undirected edge.  Self-loops and repeated edges are ignored;
    /// returns whether an edge was added.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if !self.edge_set.insert(key) {
            return false;
        }
        self.edges.push(key);
        true
    }

    /// Add a road polyline, connecting consecutive vertices.  Returns the
    /// number of new edges.
    pub fn add_road_line(&mut self, points: &[Point]) -> usize {
        let mut added = 0;
        let mut prev: Option<NodeId> = None;
        for &p in points {
            let node = self.road_node(p);
            if let Some(prev) = prev {
                if self.connect(prev, node) {
                    added += 1;
                }
            }
            prev = Some(node);
        }
        added
    }

    /// Bulk-load the road R-tree.  After this call no more road nodes may be
    /// added; building nodes can now be snapped to the roads.
    pub fn freeze_roads(&mut self) {
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .zip(&self.kinds)
            .enumerate()
            .filter(|(_, (_, kind))| **kind == NodeKind::Road)
            .map(|(i, (p, _))| NodeEntry { point: p.to_array(), id: NodeId(i as u32) })
            .collect();
        self.road_index = Some(RTree::bulk_load(entries));
    }

    /// Create the entry node for `building` at `pos` and connect it to the
    /// nearest road node.  Freezes the roads on first use.
    ///
    /// Returns the building's node and the road node it was attached to
    /// (`None` if there are no roads at all).
    pub fn attach_building(&mut self, building: BuildingId, pos: Point) -> (NodeId, Option<NodeId>) {
        if self.road_index.is_none() {
            self.freeze_roads();
        }
        let nearest = self
            .road_index
            .as_ref()
            .and_then(|idx| idx.nearest_neighbor(&pos.to_array()))
            .map(|e| e.id);
        let node = self.push_node(pos, NodeKind::Building(building));
        if let Some(road) = nearest {
            self.connect(node, road);
        }
        (node, nearest)
    }

    /// Consume the builder: CSR arrays plus component labels.
    ///
    /// O(E) for the CSR pass and O(N + E) for labelling.
    pub fn build(mut self) -> Network {
        if self.road_index.is_none() {
            self.freeze_roads();
        }
        let n = self.nodes.len();

        // Degree count, then prefix sum into the row pointer.
        let mut adj_start = vec![0u32; n + 1];
        for &(a, b) in &self.edges {
            adj_start[a.index() + 1] += 1;
            adj_start[b.index() + 1] += 1;
        }
        for i in 1..=n {
            adj_start[i] += adj_start[i - 1];
        }

        // Fill in edge insertion order so neighbour order is deterministic.
        let total = adj_start[n] as usize;
        let mut cursor: Vec<u32> = adj_start[..n].to_vec();
        let mut adj_to       = vec![NodeId::INVALID; total];
        let mut adj_length_m = vec![0.0; total];
        for &(a, b) in &self.edges {
            let len = self.nodes[a.index()].distance(self.nodes[b.index()]);
            for (from, to) in [(a, b), (b, a)] {
                let slot = cursor[from.index()] as usize;
                adj_to[slot] = to;
                adj_length_m[slot] = len;
                cursor[from.index()] += 1;
            }
        }

        let (node_component, component_count) = label_components(n, &adj_start, &adj_to);

        Network {
            node_pos: self.nodes,
            node_kind: self.kinds,
            node_component,
            adj_start,
            adj_to,
            adj_length_m,
            component_count,
            road_index: self.road_index.unwrap_or_else(RTree::new),
        }
    }
}

/// BFS connected-component labelling.  Labels are assigned in ascending
/// order of each component's lowest node id.
fn label_components(n: usize, adj_start: &[u32], adj_to: &[NodeId]) -> (Vec<ComponentId>, u32) {
    let mut labels = vec![ComponentId::INVALID; n];
    let mut next = 0u32;
    let mut queue = VecDeque::new();

    for root in 0..n {
        if labels[root] != ComponentId::INVALID {
            continue;
        }
        let label = ComponentId(next);
        next += 1;
        labels[root] = label;
        queue.push_back(root);
        while let Some(v) = queue.pop_front() {
            let (s, e) = (adj_start[v] as usize, adj_start[v + 1] as usize);
            for w in &adj_to[s..e] {
                if labels[w.index()] == ComponentId::INVALID {
                    labels[w.index()] = label;
                    queue.push_back(w.index());
                }
            }
        }
    }
    (labels, next)
}
