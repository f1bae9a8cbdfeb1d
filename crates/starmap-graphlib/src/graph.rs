//! Graph container APIs used by `starmap`.
//!
//! The container mirrors the small surface a force-layout graph library exposes to the map
//! viewer: `add_node`, `add_link`, `has_link` and `for_each_linked_node`.

use rustc_hash::FxBuildHasher;
use std::cell::{Ref, RefCell};

mod adj_cache;
mod entries;

use adj_cache::IncidenceCache;
use entries::{LinkEntry, NodeEntry};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// A borrowed view of one link.
#[derive(Debug)]
pub struct Link<'a, E> {
    pub from: &'a str,
    pub to: &'a str,
    pub data: &'a E,
}

impl<E> Clone for Link<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Link<'_, E> {}

impl<'a, E> Link<'a, E> {
    /// The endpoint that is not `id` (or `id` itself for a self link).
    pub fn other(&self, id: &str) -> &'a str {
        if self.from == id { self.to } else { self.from }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

pub struct Graph<N, E> {
    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    links: Vec<LinkEntry<E>>,
    link_index: HashMap<(usize, usize), usize>,

    // Bumped on every structural mutation; the incidence cache is rebuilt when it lags behind.
    generation: u64,
    incidence: RefCell<IncidenceCache>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> std::fmt::Debug for Graph<N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .finish()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            links: Vec::new(),
            link_index: HashMap::default(),
            generation: 0,
            incidence: RefCell::new(IncidenceCache::build::<E>(0, 0, &[])),
        }
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn ensure_incidence(&self) -> Ref<'_, IncidenceCache> {
        let stale = self.incidence.borrow().generation != self.generation;
        if stale {
            *self.incidence.borrow_mut() =
                IncidenceCache::build(self.generation, self.nodes.len(), &self.links);
        }
        self.incidence.borrow()
    }

    fn link_view(&self, link_ix: usize) -> Link<'_, E> {
        let e = &self.links[link_ix];
        Link {
            from: &self.nodes[e.from_ix].id,
            to: &self.nodes[e.to_ix].id,
            data: &e.data,
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the data of an existing one.
    pub fn add_node(&mut self, id: impl Into<String>, data: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].data = data;
            return self;
        }
        self.invalidate();
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            data,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].data)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].data)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|n| (n.id.as_str(), &n.data))
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> impl Iterator<Item = Link<'_, E>> {
        (0..self.links.len()).map(|ix| self.link_view(ix))
    }

    /// Adds a directed link `from -> to`, creating missing endpoints with default data.
    ///
    /// Adding the same directed pair twice replaces the stored data.
    pub fn add_link(&mut self, from: impl Into<String>, to: impl Into<String>, data: E) -> &mut Self
    where
        N: Default,
    {
        let from_ix = self.ensure_node(from.into());
        let to_ix = self.ensure_node(to.into());

        if let Some(&idx) = self.link_index.get(&(from_ix, to_ix)) {
            self.links[idx].data = data;
            return self;
        }

        self.invalidate();
        let idx = self.links.len();
        self.links.push(LinkEntry {
            from_ix,
            to_ix,
            data,
        });
        self.link_index.insert((from_ix, to_ix), idx);
        self
    }

    fn ensure_node(&mut self, id: String) -> usize
    where
        N: Default,
    {
        if let Some(&idx) = self.node_index.get(&id) {
            return idx;
        }
        self.add_node(id.clone(), N::default());
        self.nodes.len() - 1
    }

    /// Directed lookup: is there a link `from -> to`?
    pub fn has_link(&self, from: &str, to: &str) -> bool {
        self.link(from, to).is_some()
    }

    /// Undirected lookup: is there a link `a -> b` or `b -> a`?
    pub fn has_link_between(&self, a: &str, b: &str) -> bool {
        self.has_link(a, b) || self.has_link(b, a)
    }

    pub fn link(&self, from: &str, to: &str) -> Option<&E> {
        let from_ix = *self.node_index.get(from)?;
        let to_ix = *self.node_index.get(to)?;
        let idx = *self.link_index.get(&(from_ix, to_ix))?;
        Some(&self.links[idx].data)
    }

    /// Number of links incident to `id`, in either direction.
    pub fn degree(&self, id: &str) -> usize {
        let Some(&idx) = self.node_index.get(id) else {
            return 0;
        };
        self.ensure_incidence().incident(idx).len()
    }

    /// Visits every link incident to `id` in insertion order, passing the node on the other end.
    ///
    /// Direction is ignored. A self link visits `id` itself once. Unknown ids visit nothing.
    pub fn for_each_linked_node<F>(&self, id: &str, mut f: F)
    where
        F: FnMut(&str, Link<'_, E>),
    {
        let Some(&idx) = self.node_index.get(id) else {
            return;
        };
        let cache = self.ensure_incidence();
        for &link_ix in cache.incident(idx) {
            let link = self.link_view(link_ix);
            f(link.other(id), link);
        }
    }

    /// Distinct neighbors of `id` in first-seen order.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let cache = self.ensure_incidence();
        let mut seen: HashSet<usize> = HashSet::default();
        let mut out: Vec<&str> = Vec::new();
        for &link_ix in cache.incident(idx) {
            let e = &self.links[link_ix];
            let other_ix = if e.from_ix == idx { e.to_ix } else { e.from_ix };
            if seen.insert(other_ix) {
                out.push(self.nodes[other_ix].id.as_str());
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.invalidate();
        self.nodes.clear();
        self.node_index.clear();
        self.links.clear();
        self.link_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_link_creates_missing_endpoints() {
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("a", "b", ());

        assert!(g.has_node("a"));
        assert!(g.has_node("b"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.link_count(), 1);
    }

    #[test]
    fn repeated_directed_pair_replaces_data() {
        let mut g: Graph<(), i32> = Graph::new();
        g.add_link("a", "b", 1);
        g.add_link("a", "b", 2);
        g.add_link("b", "a", 3);

        assert_eq!(g.link_count(), 2);
        assert_eq!(g.link("a", "b"), Some(&2));
        assert_eq!(g.link("b", "a"), Some(&3));
    }

    #[test]
    fn incidence_cache_follows_mutations() {
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("a", "b", ());
        assert_eq!(g.degree("a"), 1);

        g.add_link("c", "a", ());
        assert_eq!(g.degree("a"), 2);
        assert_eq!(g.neighbors("a"), vec!["b", "c"]);

        g.clear();
        assert_eq!(g.degree("a"), 0);
        assert!(g.neighbors("a").is_empty());
    }

    #[test]
    fn self_link_is_visited_once() {
        let mut g: Graph<(), ()> = Graph::new();
        g.add_link("a", "a", ());

        let mut seen = Vec::new();
        g.for_each_linked_node("a", |other, _| seen.push(other.to_string()));
        assert_eq!(seen, vec!["a"]);
    }
}
