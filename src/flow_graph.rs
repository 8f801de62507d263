//! Flow graph built from workflow edges (Arc<str> optimized)
//!
//! Uses Arc<str> for zero-cost cloning of node IDs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::workflow::Edge;

/// Directed graph of node connections
///
/// Parallel edges collapse into one adjacency entry.
pub struct FlowGraph {
    /// node_id -> successor node_ids
    adjacency: HashMap<Arc<str>, HashSet<Arc<str>>>,
    /// All node IDs, in definition order
    node_ids: Vec<Arc<str>>,
}

impl FlowGraph {
    pub fn new<'a>(node_ids: impl IntoIterator<Item = &'a str>, edges: &[Edge]) -> Self {
        let mut adjacency: HashMap<Arc<str>, HashSet<Arc<str>>> = HashMap::new();
        let mut ids: Vec<Arc<str>> = Vec::new();

        // Create Arc<str> once per node, reuse everywhere
        for id in node_ids {
            let id: Arc<str> = Arc::from(id);
            ids.push(Arc::clone(&id));
            adjacency.insert(id, HashSet::new());
        }

        for edge in edges {
            let target = adjacency
                .get_key_value(edge.target.as_str())
                .map(|(k, _)| Arc::clone(k))
                .unwrap_or_else(|| Arc::from(edge.target.as_str()));
            adjacency
                .entry(Arc::from(edge.source.as_str()))
                .or_default()
                .insert(target);
        }

        Self {
            adjacency,
            node_ids: ids,
        }
    }

    /// Get successors of a node
    pub fn successors(&self, node_id: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(node_id)
            .into_iter()
            .flat_map(|set| set.iter().map(|s| s.as_ref()))
    }

    /// Check if node exists
    #[inline]
    pub fn contains(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|id| id.as_ref() == node_id)
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Nodes reachable from `from` by following edges source -> target (BFS)
    ///
    /// Includes `from` itself.
    pub fn reachable_from(&self, from: &str) -> HashSet<&str> {
        let mut visited: HashSet<&str> = HashSet::with_capacity(self.node_ids.len());
        let mut queue: VecDeque<&str> = VecDeque::new();

        let Some((start, _)) = self.adjacency.get_key_value(from) else {
            return visited;
        };
        visited.insert(start.as_ref());
        queue.push_back(start.as_ref());

        while let Some(current) = queue.pop_front() {
            for neighbor in self.successors(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited
    }

    /// Node IDs not reachable from `from`, in definition order
    pub fn unreachable_from(&self, from: &str) -> Vec<&str> {
        let reachable = self.reachable_from(from);
        self.node_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| !reachable.contains(id))
            .collect()
    }

    /// Check if there's a path from `from` to `to` (BFS)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        from == to || self.reachable_from(from).contains(to)
    }
}
