//! Shortest-path routing and the per-pair route cache.
//!
//! # Pluggability
//!
//! The environment routes through the [`Router`] trait, so an application can
//! swap in A* or a contraction hierarchy without touching the cache.  The
//! default [`ShortestPathRouter`] is Dijkstra over geometric edge length.
//!
//! # Cost units
//!
//! Costs are whole **millimetres** (`u64`) internally so the heap key is
//! totally ordered.  Ties are broken by discovery order: every heap push gets
//! an increasing sequence number and a node's predecessor is only replaced by
//! a strictly shorter path, so among equal-length paths the one discovered
//! first wins.
//!
//! # Caching
//!
//! Individuals commute between the same static building pairs over and over.
//! [`RouteCache`] memoises one path per *unordered* pair, stored in the
//! orientation `min(id) → max(id)`; the reverse request is a reversed view of
//! the same `Arc<Route>`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use epi_core::{BuildingId, NodeId};

use crate::network::Network;

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered node sequence from source to destination (both inclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes:    Vec<NodeId>,
    pub length_m: f64,
}

impl Route {
    /// A route that starts and ends at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], length_m: 0.0 }
    }
}

// ── RoutePath ─────────────────────────────────────────────────────────────────

/// A direction-aware handle to a cached [`Route`].
///
/// Cloning is cheap (an `Arc` bump).  Two handles for the same building pair
/// share one allocation; see [`shares_route`](Self::shares_route).
#[derive(Debug, Clone)]
pub struct RoutePath {
    route:    Arc<Route>,
    reversed: bool,
}

impl RoutePath {
    pub fn len(&self) -> usize {
        self.route.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.nodes.is_empty()
    }

    /// The `i`-th node in travel order.
    #[inline]
    pub fn node(&self, i: usize) -> NodeId {
        if self.reversed {
            self.route.nodes[self.route.nodes.len() - 1 - i]
        } else {
            self.route.nodes[i]
        }
    }

    /// Nodes in travel order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.len()).map(|i| self.node(i))
    }

    pub fn length_m(&self) -> f64 {
        self.route.length_m
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// `true` if both handles view the very same cached allocation.
    pub fn shares_route(&self, other: &RoutePath) -> bool {
        Arc::ptr_eq(&self.route, &other.route)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Must be `Send + Sync` so a simulation (and its environment) can be moved
/// onto a timer thread.
pub trait Router: Send + Sync {
    /// Path from `from` to `to`, or `None` if they are not connected.
    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> Option<Route>;
}

/// Dijkstra over geometric length.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortestPathRouter;

impl Router for ShortestPathRouter {
    fn route(&self, network: &Network, from: NodeId, to: NodeId) -> Option<Route> {
        dijkstra(network, from, to)
    }
}

#[inline]
fn to_mm(m: f64) -> u64 {
    (m * 1_000.0).round() as u64
}

fn dijkstra(network: &Network, from: NodeId, to: NodeId) -> Option<Route> {
    if from == to {
        return Some(Route::trivial(from));
    }
    // Different components can never connect; skip the search.
    if network.component(from) != network.component(to) {
        return None;
    }

    let n = network.node_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev = vec![NodeId::INVALID; n];
    dist[from.index()] = 0;

    // Min-heap on (cost, discovery sequence).
    let mut seq: u64 = 0;
    let mut heap: BinaryHeap<Reverse<(u64, u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, seq, from)));

    while let Some(Reverse((cost, _, node))) = heap.pop() {
        if node == to {
            return Some(reconstruct(network, &prev, from, to));
        }
        if cost > dist[node.index()] {
            continue;
        }
        for (next, len) in network.neighbours(node) {
            let new_cost = cost.saturating_add(to_mm(len));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev[next.index()] = node;
                seq += 1;
                heap.push(Reverse((new_cost, seq, next)));
            }
        }
    }
    None
}

fn reconstruct(network: &Network, prev: &[NodeId], from: NodeId, to: NodeId) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        nodes.push(cur);
    }
    nodes.reverse();
    let length_m = nodes
        .windows(2)
        .map(|w| network.position(w[0]).distance(network.position(w[1])))
        .sum();
    Route { nodes, length_m }
}

// ── RouteCache ────────────────────────────────────────────────────────────────

/// Memoised building-to-building routes keyed by the canonical
/// `(min id, max id)` pair.  Unreachable pairs are cached as `None`.
#[derive(Default)]
pub struct RouteCache {
    routes: FxHashMap<(BuildingId, BuildingId), Option<Arc<Route>>>,
    hits:   u64,
    misses: u64,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached path for `from → to`, computing it with `compute` on first
    /// request.  `compute` receives the canonical `(low, high)` pair and
    /// must return the path in that orientation.
    pub fn get_or_compute(
        &mut self,
        from:    BuildingId,
        to:      BuildingId,
        compute: impl FnOnce(BuildingId, BuildingId) -> Option<Route>,
    ) -> Option<RoutePath> {
        let key = if from <= to { (from, to) } else { (to, from) };
        let entry = match self.routes.get(&key) {
            Some(cached) => {
                self.hits += 1;
                cached.clone()
            }
            None => {
                self.misses += 1;
                let computed = compute(key.0, key.1).map(Arc::new);
                self.routes.insert(key, computed.clone());
                computed
            }
        };
        entry.map(|route| RoutePath { route, reversed: from > to })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
