//! Read-side traversal of the relationship graph.

use std::collections::{BTreeMap, HashSet, VecDeque};

use petgraph::visit::EdgeRef;

use super::{Relationship, RelationshipGraph};

/// Default depth for [`RelationshipGraph::reachable`].
pub const DEFAULT_MAX_DEPTH: usize = 3;

impl RelationshipGraph {
    /// Direct neighbors of `id`, sorted. Unknown ids have none.
    pub fn related(&self, id: &str) -> Vec<String> {
        let Some(idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<String> = self
            .graph
            .neighbors(*idx)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Every node within `max_depth` hops of `start`, with its BFS depth.
    ///
    /// `start` itself is always present at depth 0.
    pub fn reachable(&self, start: &str, max_depth: usize) -> BTreeMap<String, usize> {
        let mut depths = BTreeMap::new();
        depths.insert(start.to_string(), 0);
        let Some(start_idx) = self.node_index.get(start) else {
            return depths;
        };

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        queue.push_back((*start_idx, 0usize));
        visited.insert(*start_idx);

        while let Some((current, depth)) = queue.pop_front() {
            if depth == max_depth {
                continue;
            }
            for neighbor in self.graph.neighbors(current) {
                if visited.insert(neighbor) {
                    depths.insert(self.graph[neighbor].clone(), depth + 1);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }
        depths
    }

    /// The edge between `a` and `b`, in either order.
    pub fn relationship(&self, a: &str, b: &str) -> Option<&Relationship> {
        let ia = self.node_index.get(a)?;
        let ib = self.node_index.get(b)?;
        let edge = self.graph.find_edge(*ia, *ib)?;
        self.graph.edge_weight(edge)
    }

    /// All edges, in insertion order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.graph.edge_references().map(|e| e.weight())
    }

    /// Sorted adjacency lists for every node that has an edge.
    pub fn adjacency(&self) -> BTreeMap<String, Vec<String>> {
        let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for edge in self.graph.edge_references() {
            let a = &self.graph[edge.source()];
            let b = &self.graph[edge.target()];
            adjacency.entry(a.clone()).or_default().push(b.clone());
            adjacency.entry(b.clone()).or_default().push(a.clone());
        }
        for neighbors in adjacency.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }
        adjacency
    }
}
