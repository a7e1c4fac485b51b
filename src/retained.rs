//! Retained-mode scene backed by Slint models.
//!
//! [`RetainedScene`] keeps one `VecModel` per visual kind and updates it from
//! a [`FramePlan`] row by row: changed rows are replaced, new rows pushed,
//! surplus rows removed from the end. Models are never swapped out, so a
//! `ModelRc` handed to the UI once stays live.
//!
//! Visual coordinates are in canvas space. The toolkit applies the scene's
//! [`ViewTransform`] (scale by zoom, translate by pan) to the whole layer,
//! which is why visuals carry no screen coordinates and zoom/pan changes
//! alone only touch rows whose screen-constant sizes depend on zoom.
//!
//! # Example
//!
//! ```ignore
//! let mut scene = RetainedScene::new();
//! window.set_nodes(scene.node_model());
//! window.set_edges(scene.edge_model());
//!
//! // On every graph or viewport change
//! scene.sync(&CanvasSnapshot::new(&graph, &viewport, &geometry));
//! if let Some(t) = scene.transform() {
//!     window.set_view_zoom(t.zoom as f32);
//! }
//! ```

use std::rc::Rc;

use log::debug;
use slint::{Model, ModelRc, SharedString, VecModel};

use crate::graph::MarkerStyle;
use crate::lod::LevelOfDetail;
use crate::render::{EdgePlan, FramePlan, MarkerPlan, NodePlan};
use crate::snapshot::CanvasSnapshot;
use crate::transform::{Point, ViewTransform};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeVisual {
    pub id: i32,
    pub node_type: SharedString,
    pub title: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub is_group: bool,
    pub is_collapsed: bool,
    pub is_selected: bool,
    /// Simplified nodes must not use per-type content
    pub simplified: bool,
    pub show_resize_handles: bool,
    /// Resize handle side, already converted to canvas units
    pub handle_size: f32,
    pub header_height: f32,
    pub button_x: f32,
    pub button_y: f32,
    pub button_size: f32,
    pub label_x: f32,
    pub label_y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortVisual {
    pub node_id: i32,
    pub port_id: i32,
    pub is_output: bool,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeVisual {
    pub id: i32,
    pub path_commands: SharedString,
    /// Empty when the end has no marker
    pub source_arrow: SharedString,
    pub source_arrow_filled: bool,
    pub target_arrow: SharedString,
    pub target_arrow_filled: bool,
    pub label: SharedString,
    pub label_x: f32,
    pub label_y: f32,
    pub is_selected: bool,
    pub start_x: f32,
    pub start_y: f32,
    pub end_x: f32,
    pub end_y: f32,
    /// Endpoint handle radius in canvas units; 0 when not selected
    pub handle_radius: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeVisual {
    pub id: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub z_index: i32,
}

/// Row changes made by one sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub updated: usize,
    pub added: usize,
    pub removed: usize,
}

impl SyncStats {
    fn merge(self, other: SyncStats) -> SyncStats {
        SyncStats {
            updated: self.updated + other.updated,
            added: self.added + other.added,
            removed: self.removed + other.removed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updated == 0 && self.added == 0 && self.removed == 0
    }
}

/// Bring `model` in line with `rows` without replacing it.
fn sync_rows<T>(model: &VecModel<T>, rows: Vec<T>) -> SyncStats
where
    T: Clone + PartialEq + 'static,
{
    let mut stats = SyncStats::default();
    let len = rows.len();

    // Update existing rows or add new ones
    for (i, row) in rows.into_iter().enumerate() {
        if i < model.row_count() {
            if model.row_data(i).as_ref() != Some(&row) {
                model.set_row_data(i, row);
                stats.updated += 1;
            }
        } else {
            model.push(row);
            stats.added += 1;
        }
    }
    // Remove excess rows
    while model.row_count() > len {
        model.remove(model.row_count() - 1);
        stats.removed += 1;
    }
    stats
}

fn node_visual(plan: &NodePlan, lod: &LevelOfDetail) -> NodeVisual {
    let node = plan.node;
    let mut visual = NodeVisual {
        id: node.id,
        node_type: node.node_type.as_str().into(),
        title: if plan.title.is_some() {
            node.title.as_deref().unwrap_or_default().into()
        } else {
            SharedString::default()
        },
        x: plan.bounds.x as f32,
        y: plan.bounds.y as f32,
        width: plan.bounds.width as f32,
        height: plan.bounds.height as f32,
        corner_radius: plan.corner_radius as f32,
        is_group: node.is_group,
        is_collapsed: node.is_collapsed,
        is_selected: node.is_selected,
        simplified: lod.simplify_nodes,
        show_resize_handles: !plan.resize_handles.is_empty(),
        handle_size: plan
            .resize_handles
            .first()
            .map(|(_, r)| r.width as f32)
            .unwrap_or_default(),
        ..NodeVisual::default()
    };
    if let Some(header) = &plan.header {
        visual.header_height = header.header.height as f32;
        visual.button_x = header.button.x as f32;
        visual.button_y = header.button.y as f32;
        visual.button_size = header.button.width as f32;
    }
    if let Some(label) = plan.title {
        visual.label_x = label.x as f32;
        visual.label_y = label.y as f32;
    }
    visual
}

fn edge_visual(plan: &EdgePlan) -> EdgeVisual {
    let edge = plan.edge;
    let identity = |p: Point| p;
    let arrow = |marker: Option<MarkerPlan>| match marker {
        Some(m) => (SharedString::from(m.path(identity)), m.style == MarkerStyle::Closed),
        None => (SharedString::default(), false),
    };
    let (source_arrow, source_arrow_filled) = arrow(plan.source_marker);
    let (target_arrow, target_arrow_filled) = arrow(plan.target_marker);
    let (label, label_x, label_y) = match (plan.label, &edge.label) {
        (Some(at), Some(text)) => (SharedString::from(text.as_str()), at.x as f32, at.y as f32),
        _ => (SharedString::default(), 0.0, 0.0),
    };

    EdgeVisual {
        id: edge.id,
        path_commands: plan.path(identity).into(),
        source_arrow,
        source_arrow_filled,
        target_arrow,
        target_arrow_filled,
        label,
        label_x,
        label_y,
        is_selected: edge.is_selected,
        start_x: plan.start.x as f32,
        start_y: plan.start.y as f32,
        end_x: plan.end.x as f32,
        end_y: plan.end.y as f32,
        handle_radius: plan.handle_radius.unwrap_or_default() as f32,
    }
}

/// Slint models for one canvas, kept in sync with the graph.
pub struct RetainedScene {
    nodes: Rc<VecModel<NodeVisual>>,
    ports: Rc<VecModel<PortVisual>>,
    edges: Rc<VecModel<EdgeVisual>>,
    shapes: Rc<VecModel<ShapeVisual>>,
    transform: Option<ViewTransform>,
    lod: Option<LevelOfDetail>,
}

impl Default for RetainedScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedScene {
    pub fn new() -> Self {
        Self {
            nodes: Rc::new(VecModel::default()),
            ports: Rc::new(VecModel::default()),
            edges: Rc::new(VecModel::default()),
            shapes: Rc::new(VecModel::default()),
            transform: None,
            lod: None,
        }
    }

    /// Groups first (outermost first), then nodes in draw order.
    pub fn node_model(&self) -> ModelRc<NodeVisual> {
        ModelRc::from(self.nodes.clone())
    }

    pub fn port_model(&self) -> ModelRc<PortVisual> {
        ModelRc::from(self.ports.clone())
    }

    pub fn edge_model(&self) -> ModelRc<EdgeVisual> {
        ModelRc::from(self.edges.clone())
    }

    pub fn shape_model(&self) -> ModelRc<ShapeVisual> {
        ModelRc::from(self.shapes.clone())
    }

    /// Canvas-to-viewport transform the toolkit must apply to every visual.
    /// `None` until the first successful sync.
    pub fn transform(&self) -> Option<ViewTransform> {
        self.transform
    }

    pub fn lod(&self) -> Option<LevelOfDetail> {
        self.lod
    }

    /// Sync from a snapshot. Leaves the models untouched and returns `None`
    /// when there is no graph, no viewport, or a zero-area viewport.
    pub fn sync(&mut self, snapshot: &CanvasSnapshot) -> Option<SyncStats> {
        let plan = FramePlan::build(snapshot)?;
        Some(self.sync_plan(&plan))
    }

    pub fn sync_plan(&mut self, plan: &FramePlan) -> SyncStats {
        let node_rows: Vec<NodeVisual> = plan
            .groups
            .iter()
            .chain(plan.nodes.iter())
            .map(|n| node_visual(n, &plan.lod))
            .collect();

        let port_rows: Vec<PortVisual> = plan
            .groups
            .iter()
            .chain(plan.nodes.iter())
            .flat_map(|n| {
                n.ports.iter().map(move |p| PortVisual {
                    node_id: n.node.id,
                    port_id: p.port_id,
                    is_output: p.is_output,
                    x: p.center.x as f32,
                    y: p.center.y as f32,
                    radius: n.port_radius as f32,
                })
            })
            .collect();

        let edge_rows: Vec<EdgeVisual> = plan.edges.iter().map(edge_visual).collect();

        let shape_rows: Vec<ShapeVisual> = plan
            .shapes
            .iter()
            .map(|s| ShapeVisual {
                id: s.id,
                x: s.bounds.x as f32,
                y: s.bounds.y as f32,
                width: s.bounds.width as f32,
                height: s.bounds.height as f32,
                z_index: s.z_index,
            })
            .collect();

        let stats = sync_rows(&self.nodes, node_rows)
            .merge(sync_rows(&self.ports, port_rows))
            .merge(sync_rows(&self.edges, edge_rows))
            .merge(sync_rows(&self.shapes, shape_rows));

        self.transform = Some(plan.viewport.transform());
        self.lod = Some(plan.lod);

        debug!(
            "retained scene synced: {} nodes, {} edges, {} shapes ({:?})",
            self.nodes.row_count(),
            self.edges.row_count(),
            self.shapes.row_count(),
            stats
        );
        stats
    }
}
