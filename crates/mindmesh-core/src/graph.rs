//! Link Graph
//!
//! In-memory adjacency over the `note_links` edge table. Edges are directed
//! `(from, to)` pairs; self links and cycles are allowed.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Forward and reverse adjacency for the note link relation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    forward: BTreeMap<i64, BTreeSet<i64>>,
    reverse: BTreeMap<i64, BTreeSet<i64>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(from, to)` pairs; duplicates collapse
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    pub fn add_edge(&mut self, from: i64, to: i64) {
        self.forward.entry(from).or_default().insert(to);
        self.reverse.entry(to).or_default().insert(from);
    }

    /// Targets of `id`'s links, ascending
    pub fn outgoing(&self, id: i64) -> Vec<i64> {
        self.forward
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Sources of links pointing at `id`, ascending
    pub fn incoming(&self, id: i64) -> Vec<i64> {
        self.reverse
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// All edges, ordered by `(from, to)`
    pub fn edges(&self) -> Vec<(i64, i64)> {
        self.forward
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Ids reachable from `center` within `depth` hops, following links in
    /// either direction. `center` is always included and comes first; the
    /// rest are in discovery order. Stops once `max_nodes` ids are collected.
    pub fn neighborhood(&self, center: i64, depth: usize, max_nodes: usize) -> Vec<i64> {
        if max_nodes == 0 {
            return vec![];
        }

        let mut visited = BTreeSet::from([center]);
        let mut order = vec![center];
        let mut queue = VecDeque::from([(center, 0usize)]);

        while let Some((id, dist)) = queue.pop_front() {
            if dist >= depth {
                continue;
            }
            let neighbours = self.outgoing(id).into_iter().chain(self.incoming(id));
            for next in neighbours {
                if order.len() >= max_nodes {
                    return order;
                }
                if visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, dist + 1));
                }
            }
        }

        order
    }
}

// ============================================================================
// TESTS
// ============================================================================
