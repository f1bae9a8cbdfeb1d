#![forbid(unsafe_code)]

//! Node/link graph container used by `starmap`.
//!
//! Nodes are keyed by string ids. Links are directed records, but traversal helpers such as
//! [`Graph::for_each_linked_node`] treat them as undirected, which is what highlight and
//! subgraph views need.

pub mod graph;

pub use graph::{Graph, Link};
