//! Incidence cache used by [`Graph`](super::Graph).
//!
//! Incident link indices per node in a CSR layout, rebuilt lazily after mutations.

#[derive(Debug, Clone)]
pub(in crate::graph) struct IncidenceCache {
    pub(in crate::graph) generation: u64,
    pub(in crate::graph) offsets: Vec<usize>,
    pub(in crate::graph) links: Vec<usize>,
}

impl IncidenceCache {
    pub(in crate::graph) fn build<E>(
        generation: u64,
        node_count: usize,
        entries: &[super::entries::LinkEntry<E>],
    ) -> Self {
        let mut degree = vec![0usize; node_count];
        for e in entries {
            degree[e.from_ix] += 1;
            if e.to_ix != e.from_ix {
                degree[e.to_ix] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + d);
        }

        // Filling in link order keeps each node's slice in insertion order.
        let mut cursor = offsets[..node_count].to_vec();
        let mut links = vec![0usize; offsets[node_count]];
        for (link_ix, e) in entries.iter().enumerate() {
            links[cursor[e.from_ix]] = link_ix;
            cursor[e.from_ix] += 1;
            if e.to_ix != e.from_ix {
                links[cursor[e.to_ix]] = link_ix;
                cursor[e.to_ix] += 1;
            }
        }

        Self {
            generation,
            offsets,
            links,
        }
    }

    pub(in crate::graph) fn incident(&self, node_ix: usize) -> &[usize] {
        let start = self.offsets[node_ix];
        let end = self.offsets[node_ix + 1];
        &self.links[start..end]
    }
}
