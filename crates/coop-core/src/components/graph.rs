//! Graph Component
//!
//! Fixed network topology with optional signed (trust) edges.
//!
//! Nodes are addressed by a dense [`NodeId`] in `0..node_count()`; the label
//! each node had in its source dataset is kept for export. For undirected
//! graphs every edge is stored once in [`Graph::edges`] and appears in the
//! adjacency of both endpoints. For directed graphs the neighborhood used by
//! the update rules is the out-neighborhood, so a node reads the trust sign it
//! assigned *to* each neighbor.

use coop_events::TrustSign;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Dense node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A stored edge. For undirected graphs `source`/`target` have no meaning
/// beyond insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub trust: Option<TrustSign>,
}

/// Adjacency entry: the neighbor and the sign of the edge pointing to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub node: NodeId,
    pub trust: Option<TrustSign>,
}

/// Immutable network topology.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    signed: bool,
    labels: Vec<u64>,
    edges: Vec<Edge>,
    out_adjacency: Vec<Vec<Neighbor>>,
    in_adjacency: Vec<Vec<Neighbor>>,
}

impl Graph {
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// True when the graph was built as a trust network and every edge
    /// carries a sign. An edgeless trust network is signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All node ids in index order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> {
        (0..self.labels.len()).map(NodeId)
    }

    /// Each stored edge exactly once.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Dataset label of a node.
    pub fn label(&self, node: NodeId) -> u64 {
        self.labels[node.0]
    }

    pub fn labels(&self) -> &[u64] {
        &self.labels
    }

    /// Neighborhood used by the update rules (out-neighbors when directed).
    pub fn neighbors(&self, node: NodeId) -> &[Neighbor] {
        &self.out_adjacency[node.0]
    }

    /// Out-neighbors. Same as [`Graph::neighbors`].
    pub fn out_neighbors(&self, node: NodeId) -> &[Neighbor] {
        &self.out_adjacency[node.0]
    }

    /// In-neighbors, with the sign each of them assigned to `node`.
    pub fn in_neighbors(&self, node: NodeId) -> &[Neighbor] {
        &self.in_adjacency[node.0]
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.out_adjacency[node.0].len()
    }

    /// Sign that `from` assigned to `to`, if such an edge exists.
    pub fn trust(&self, from: NodeId, to: NodeId) -> Option<TrustSign> {
        self.out_adjacency[from.0]
            .iter()
            .find(|n| n.node == to)
            .and_then(|n| n.trust)
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.out_adjacency[from.0].iter().any(|n| n.node == to)
    }
}

/// Incremental graph construction keyed by dataset labels.
///
/// Self-loops are dropped. A repeated edge replaces the earlier one, so the
/// last sign seen for a pair wins.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    directed: bool,
    signed: bool,
    labels: Vec<u64>,
    index: HashMap<u64, NodeId>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
    dropped_self_loops: usize,
}

impl GraphBuilder {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Marks the graph as a trust network, even before any edge is added.
    pub fn mark_signed(&mut self) -> &mut Self {
        self.signed = true;
        self
    }

    /// Returns the id for `label`, adding the node on first sight.
    pub fn add_node(&mut self, label: u64) -> NodeId {
        if let Some(&id) = self.index.get(&label) {
            return id;
        }
        let id = NodeId(self.labels.len());
        self.labels.push(label);
        self.index.insert(label, id);
        id
    }

    /// Adds an unsigned edge between two labels.
    pub fn add_edge(&mut self, source: u64, target: u64) -> &mut Self {
        self.insert(source, target, None)
    }

    /// Adds a signed edge between two labels.
    pub fn add_signed_edge(&mut self, source: u64, target: u64, sign: TrustSign) -> &mut Self {
        self.signed = true;
        self.insert(source, target, Some(sign))
    }

    fn insert(&mut self, source: u64, target: u64, trust: Option<TrustSign>) -> &mut Self {
        let s = self.add_node(source);
        let t = self.add_node(target);
        if s == t {
            self.dropped_self_loops += 1;
            return self;
        }

        let key = if self.directed || s < t { (s, t) } else { (t, s) };
        let edge = Edge {
            source: s,
            target: t,
            trust,
        };
        match self.edge_index.get(&key) {
            Some(&i) => self.edges[i] = edge,
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(edge);
            }
        }
        self
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn build(self) -> Graph {
        if self.dropped_self_loops > 0 {
            tracing::debug!("Dropped {} self-loops", self.dropped_self_loops);
        }

        let n = self.labels.len();
        let mut out_adjacency = vec![Vec::new(); n];
        let mut in_adjacency = vec![Vec::new(); n];

        for edge in &self.edges {
            let forward = Neighbor {
                node: edge.target,
                trust: edge.trust,
            };
            let backward = Neighbor {
                node: edge.source,
                trust: edge.trust,
            };
            out_adjacency[edge.source.0].push(forward);
            in_adjacency[edge.target.0].push(backward);
            if !self.directed {
                out_adjacency[edge.target.0].push(backward);
                in_adjacency[edge.source.0].push(forward);
            }
        }

        let signed = self.signed && self.edges.iter().all(|e| e.trust.is_some());
        Graph {
            directed: self.directed,
            signed,
            labels: self.labels,
            edges: self.edges,
            out_adjacency,
            in_adjacency,
        }
    }
}
