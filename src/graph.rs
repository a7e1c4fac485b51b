//! Graph snapshot consumed by geometry, hit testing and rendering.
//!
//! The editing layer owns and mutates the [`Graph`]; this crate only reads
//! it. Mutators that can change any node's bounds or visibility bump the
//! graph's structure revision, which the spatial index compares against
//! to know when it is stale.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::transform::{Point, Rect};

pub type NodeId = i32;
pub type PortId = i32;
pub type EdgeId = i32;
pub type ShapeId = i32;

/// Arrowhead drawn at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    #[default]
    None,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub name: Option<String>,
}

impl Port {
    pub fn new(id: PortId) -> Self {
        Self { id, name: None }
    }
}

/// A node, or a group when `is_group` is set.
///
/// Ports are derived-position: only their order matters, which is why
/// there is no coordinate stored on [`Port`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Type tag used to look up per-type size and drawing behavior
    pub node_type: String,
    pub title: Option<String>,
    /// Top-left corner, canvas space
    pub position: Point,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub is_selected: bool,
    pub is_group: bool,
    pub is_collapsed: bool,
    pub is_resizable: bool,
    /// Enclosing group, if any. Looked up by id, never owned.
    pub parent_group: Option<NodeId>,
}

impl Node {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            node_type: String::new(),
            title: None,
            position: Point::new(x, y),
            width: None,
            height: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            is_selected: false,
            is_group: false,
            is_collapsed: false,
            is_resizable: false,
            parent_group: None,
        }
    }

    pub fn group(id: NodeId, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            is_group: true,
            ..Self::new(id, x, y).with_size(width, height)
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_inputs<I: IntoIterator<Item = PortId>>(mut self, ids: I) -> Self {
        self.inputs = ids.into_iter().map(Port::new).collect();
        self
    }

    pub fn with_outputs<I: IntoIterator<Item = PortId>>(mut self, ids: I) -> Self {
        self.outputs = ids.into_iter().map(Port::new).collect();
        self
    }

    pub fn in_group(mut self, group: NodeId) -> Self {
        self.parent_group = Some(group);
        self
    }

    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }

    pub fn resizable(mut self) -> Self {
        self.is_resizable = true;
        self
    }

    pub fn collapsed(mut self) -> Self {
        self.is_collapsed = true;
        self
    }

    /// Locate a port by id: `(index, is_output)`.
    pub fn find_port(&self, port_id: PortId) -> Option<(usize, bool)> {
        if let Some(i) = self.inputs.iter().position(|p| p.id == port_id) {
            return Some((i, false));
        }
        self.outputs
            .iter()
            .position(|p| p.id == port_id)
            .map(|i| (i, true))
    }

    pub fn ports(&self, is_output: bool) -> &[Port] {
        if is_output {
            &self.outputs
        } else {
            &self.inputs
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source_node: NodeId,
    pub source_port: PortId,
    pub target_node: NodeId,
    pub target_port: PortId,
    pub label: Option<String>,
    pub source_marker: MarkerStyle,
    pub target_marker: MarkerStyle,
    pub is_selected: bool,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        source_node: NodeId,
        source_port: PortId,
        target_node: NodeId,
        target_port: PortId,
    ) -> Self {
        Self {
            id,
            source_node,
            source_port,
            target_node,
            target_port,
            label: None,
            source_marker: MarkerStyle::None,
            target_marker: MarkerStyle::Closed,
            is_selected: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_markers(mut self, source: MarkerStyle, target: MarkerStyle) -> Self {
        self.source_marker = source;
        self.target_marker = target;
        self
    }

    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }
}

/// Free-standing canvas decoration (annotation box, frame).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    /// Canvas space
    pub bounds: Rect,
    pub z_index: i32,
    pub is_visible: bool,
    pub is_selectable: bool,
}

impl Shape {
    pub fn new(id: ShapeId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            bounds,
            z_index,
            is_visible: true,
            is_selectable: true,
        }
    }
}

static NEXT_GRAPH_INSTANCE: AtomicU64 = AtomicU64::new(1);

fn next_instance() -> u64 {
    NEXT_GRAPH_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// Ordered nodes, edges and shapes. Node order is z-order: later nodes draw on top.
///
/// Every `Graph` value, clones included, carries its own instance id, so
/// `(instance_id, revision)` names one node layout and never two.
#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    shapes: Vec<Shape>,
    node_index: HashMap<NodeId, usize>,
    instance: u64,
    revision: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            shapes: Vec::new(),
            node_index: HashMap::new(),
            instance: next_instance(),
            revision: 0,
        }
    }
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            shapes: self.shapes.clone(),
            node_index: self.node_index.clone(),
            instance: next_instance(),
            revision: self.revision,
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of this graph value; clones get a fresh one.
    pub fn instance_id(&self) -> u64 {
        self.instance
    }

    /// Incremented by every change that can move, resize, hide or reveal a node.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).and_then(|&i| self.nodes.get(i))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Add a node on top of the z-order. A node with an existing id is replaced in place.
    pub fn add_node(&mut self, node: Node) {
        match self.node_index.get(&node.id) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.node_index.insert(node.id, self.nodes.len());
                self.nodes.push(node);
            }
        }
        self.revision += 1;
    }

    /// Remove a node. Edges that referenced it are left in place and skipped
    /// by every query until the editing layer removes them.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.node_index.remove(&id)?;
        let node = self.nodes.remove(index);
        for (i, n) in self.nodes.iter().enumerate().skip(index) {
            self.node_index.insert(n.id, i);
        }
        self.revision += 1;
        Some(node)
    }

    /// Mutable access to a node. Conservatively treated as a structural change.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let &i = self.node_index.get(&id)?;
        self.revision += 1;
        self.nodes.get_mut(i)
    }

    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        self.node_mut(id)
            .map(|n| n.position = Point::new(x, y))
            .is_some()
    }

    pub fn resize_node(&mut self, id: NodeId, width: f64, height: f64) -> bool {
        self.node_mut(id)
            .map(|n| {
                n.width = Some(width);
                n.height = Some(height);
            })
            .is_some()
    }

    pub fn set_parent_group(&mut self, id: NodeId, group: Option<NodeId>) -> bool {
        self.node_mut(id).map(|n| n.parent_group = group).is_some()
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> bool {
        self.node_mut(id).map(|n| n.is_collapsed = collapsed).is_some()
    }

    /// Selection does not affect bounds, so it leaves the revision alone.
    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) -> bool {
        match self.node_index.get(&id) {
            Some(&i) => {
                self.nodes[i].is_selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let i = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(i))
    }

    pub fn set_edge_selected(&mut self, id: EdgeId, selected: bool) -> bool {
        match self.edges.iter_mut().find(|e| e.id == id) {
            Some(edge) => {
                edge.is_selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Ids of edges touching `node_id` at either end, in edge order.
    pub fn edges_connected_to(&self, node_id: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.source_node == node_id || e.target_node == node_id)
            .map(|e| e.id)
            .collect()
    }

    /// Number of enclosing groups, following `parent_group` links.
    ///
    /// Dangling parents end the walk. Cyclic parent chains are cut off after
    /// visiting every node once.
    pub fn nesting_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|n| n.parent_group);
        while let Some(parent_id) = current {
            if depth >= self.nodes.len() {
                break;
            }
            match self.node(parent_id) {
                Some(parent) => {
                    depth += 1;
                    current = parent.parent_group;
                }
                None => break,
            }
        }
        depth
    }

    /// A node is hidden when any enclosing group is collapsed.
    ///
    /// A collapsed group itself stays visible, showing only its header.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut steps = 0;
        let mut current = self.node(id).and_then(|n| n.parent_group);
        while let Some(parent_id) = current {
            if steps >= self.nodes.len() {
                return false;
            }
            match self.node(parent_id) {
                Some(parent) if parent.is_collapsed => return true,
                Some(parent) => current = parent.parent_group,
                None => return false,
            }
            steps += 1;
        }
        false
    }
}
