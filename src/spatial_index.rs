//! Flat z-ordered cache of node bounds for hit testing.
//!
//! The index is either `Clean` (built from a known graph instance at a
//! known revision) or `Dirty`. Reading through [`SpatialIndex::ensure_fresh`] rebuilds a dirty
//! index synchronously before any lookup, so a query never sees stale
//! bounds. A rebuild regenerates every entry; entries are never patched.

use log::debug;

use crate::geometry::GeometryModel;
use crate::graph::{Graph, NodeId};
use crate::transform::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub node_id: NodeId,
    /// Canvas space
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexState {
    Clean { graph: u64, revision: u64 },
    Dirty,
}

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Visible non-group nodes in graph (draw) order
    entries: Vec<IndexEntry>,
    /// Visible groups, deepest first, then topmost first
    groups: Vec<IndexEntry>,
    state: IndexState,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex {
    /// A new index starts dirty; the first query builds it.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            groups: Vec::new(),
            state: IndexState::Dirty,
        }
    }

    /// Force a rebuild on the next read.
    pub fn mark_dirty(&mut self) {
        self.state = IndexState::Dirty;
    }

    /// Dirty if explicitly marked, if `graph` is not the graph the index
    /// was built from, or if that graph changed since the last build.
    pub fn is_dirty(&self, graph: &Graph) -> bool {
        match self.state {
            IndexState::Dirty => true,
            IndexState::Clean { graph: instance, revision } => {
                instance != graph.instance_id() || revision != graph.revision()
            }
        }
    }

    /// Rebuild if dirty. Returns `true` when a rebuild happened.
    pub fn ensure_fresh(&mut self, graph: &Graph, geometry: &GeometryModel) -> bool {
        if self.is_dirty(graph) {
            self.rebuild(graph, geometry);
            true
        } else {
            false
        }
    }

    /// Regenerate every entry from the graph.
    ///
    /// Nodes hidden inside a collapsed group are left out.
    pub fn rebuild(&mut self, graph: &Graph, geometry: &GeometryModel) {
        let mut entries = Vec::with_capacity(graph.nodes().len());
        let mut groups = Vec::new();

        for (z, node) in graph.nodes().iter().enumerate() {
            if graph.is_hidden(node.id) {
                continue;
            }
            if node.is_group {
                let entry = IndexEntry {
                    node_id: node.id,
                    bounds: geometry.node_bounds(node),
                };
                groups.push((graph.nesting_depth(node.id), z, entry));
            } else {
                entries.push(IndexEntry {
                    node_id: node.id,
                    bounds: geometry.node_bounds(node),
                });
            }
        }

        // Deepest group first; among equals, the one drawn last first
        groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        self.entries = entries;
        self.groups = groups.into_iter().map(|(_, _, entry)| entry).collect();
        self.state = IndexState::Clean {
            graph: graph.instance_id(),
            revision: graph.revision(),
        };

        debug!(
            "spatial index rebuilt: {} nodes, {} groups (revision {})",
            self.entries.len(),
            self.groups.len(),
            graph.revision()
        );
    }

    /// Entries in draw order (bottom first).
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entries topmost first.
    pub fn iter_topmost(&self) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries.iter().rev()
    }

    /// Groups in hit priority order.
    pub fn groups(&self) -> &[IndexEntry] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Topmost entry whose bounds contain `point` (canvas space).
    pub fn find_topmost(&self, point: Point) -> Option<&IndexEntry> {
        self.iter_topmost().find(|entry| entry.bounds.contains(point))
    }
}
