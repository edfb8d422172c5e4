//! Simulation Components
//!
//! Data-only building blocks: the network and the per-iteration state.

pub mod graph;
pub mod state;

pub use graph::{Edge, Graph, GraphBuilder, Neighbor, NodeId};
pub use state::{PayoffVector, StrategyAssignment};
