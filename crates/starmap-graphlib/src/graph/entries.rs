//! Internal storage entries for [`Graph`](super::Graph).

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry<N> {
    pub(in crate::graph) id: String,
    pub(in crate::graph) data: N,
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct LinkEntry<E> {
    pub(in crate::graph) from_ix: usize,
    pub(in crate::graph) to_ix: usize,
    pub(in crate::graph) data: E,
}
