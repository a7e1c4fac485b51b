//! Frame planning and the immediate-mode renderer.
//!
//! A [`FramePlan`] is the single place where culling, LOD and geometry are
//! decided for a frame. It holds everything in canvas space. The
//! immediate renderer maps the plan to screen space and emits
//! [`DrawCommand`]s; the retained scene (see [`crate::retained`]) copies the
//! same plan into toolkit models untransformed. Neither computes geometry of
//! its own, so the two cannot drift apart.
//!
//! Draw order: grid, groups (outermost first), edges, nodes with their
//! ports and resize handles, edge endpoint handles, shapes (by z-index).

use log::trace;

use crate::geometry::{arrow_points, GeometryModel, ResizeHandle};
use crate::graph::{Edge, MarkerStyle, Node, NodeId, PortId, Shape};
use crate::grid::grid_for_viewport;
use crate::lod::LevelOfDetail;
use crate::path::{generate_bezier_path, generate_line_path, generate_polyline_path, CubicBezier};
use crate::snapshot::CanvasSnapshot;
use crate::transform::{Point, Rect, Viewport};

/// What a draw command depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawRole {
    Grid,
    GroupBody,
    GroupHeader,
    CollapseButton,
    NodeBody,
    Port,
    Edge,
    Arrow,
    Label,
    EndpointHandle,
    ResizeHandle,
    Shape,
}

/// One immediate-mode drawing primitive, screen space.
///
/// `id` is the owning element: node id for bodies, ports, titles and
/// resize handles; edge id for paths, arrows, labels and endpoint handles;
/// shape id for shapes; 0 for the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        role: DrawRole,
        id: i32,
        bounds: Rect,
        corner_radius: f64,
        selected: bool,
    },
    Circle {
        role: DrawRole,
        id: i32,
        center: Point,
        radius: f64,
    },
    Path {
        role: DrawRole,
        id: i32,
        commands: String,
        filled: bool,
        selected: bool,
    },
    /// `centered` text is centered on `position`; otherwise it starts there.
    Text {
        role: DrawRole,
        id: i32,
        position: Point,
        text: String,
        centered: bool,
    },
}

impl DrawCommand {
    pub fn role(&self) -> DrawRole {
        match self {
            DrawCommand::Rect { role, .. }
            | DrawCommand::Circle { role, .. }
            | DrawCommand::Path { role, .. }
            | DrawCommand::Text { role, .. } => *role,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            DrawCommand::Rect { id, .. }
            | DrawCommand::Circle { id, .. }
            | DrawCommand::Path { id, .. }
            | DrawCommand::Text { id, .. } => *id,
        }
    }
}

/// Receives draw commands. Implemented by the toolkit's painter, or by a
/// `Vec` for recording.
pub trait DrawSink {
    fn push(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn push(&mut self, command: DrawCommand) {
        Vec::push(self, command);
    }
}

// ============================================================================
// Frame plan
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortPlan {
    pub port_id: PortId,
    pub index: usize,
    pub is_output: bool,
    /// Canvas space
    pub center: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupHeaderPlan {
    pub header: Rect,
    pub button: Rect,
    pub label: Point,
}

/// A visible node or group. All geometry in canvas space.
#[derive(Debug, Clone)]
pub struct NodePlan<'a> {
    pub node: &'a Node,
    pub bounds: Rect,
    /// 0 when nodes are simplified
    pub corner_radius: f64,
    /// Empty unless ports are shown at this zoom
    pub ports: Vec<PortPlan>,
    pub port_radius: f64,
    /// Present only for selected, resizable nodes
    pub resize_handles: Vec<(ResizeHandle, Rect)>,
    pub header: Option<GroupHeaderPlan>,
    pub title: Option<Point>,
}

impl<'a> NodePlan<'a> {
    fn new(node: &'a Node, bounds: Rect, geometry: &GeometryModel, zoom: f64, lod: &LevelOfDetail) -> Self {
        let settings = geometry.settings();

        let ports = if lod.show_ports {
            [false, true]
                .into_iter()
                .flat_map(|is_output| {
                    let list = node.ports(is_output);
                    list.iter().enumerate().map(move |(index, port)| PortPlan {
                        port_id: port.id,
                        index,
                        is_output,
                        center: geometry.port_position_by_index(node, index, list.len(), is_output),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let resize_handles = if node.is_selected && node.is_resizable {
            let side = settings.resize_handle_size / zoom;
            geometry
                .resize_handle_positions(node)
                .into_iter()
                .map(|(handle, center)| (handle, Rect::centered(center, side)))
                .collect()
        } else {
            Vec::new()
        };

        let header = node.is_group.then(|| GroupHeaderPlan {
            header: geometry.group_header_bounds(node),
            button: geometry.collapse_button_bounds(node),
            label: geometry.group_label_position(node),
        });

        let title = match (&node.title, lod.show_labels) {
            (Some(_), true) => Some(match &header {
                Some(h) => h.label,
                None => geometry.node_title_position(node),
            }),
            _ => None,
        };

        Self {
            node,
            bounds,
            corner_radius: if lod.simplify_nodes { 0.0 } else { settings.corner_radius },
            ports,
            port_radius: geometry.port_draw_radius(zoom),
            resize_handles,
            header,
            title,
        }
    }
}

/// Arrowhead triangle, canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlan {
    pub style: MarkerStyle,
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

impl MarkerPlan {
    fn new(style: MarkerStyle, tip: Point, angle: f64, size: f64) -> Option<Self> {
        if style == MarkerStyle::None {
            return None;
        }
        let (left, right) = arrow_points(tip, angle, size);
        Some(Self { style, tip, left, right })
    }

    /// Path commands after mapping through `map`. Closed markers are a
    /// filled triangle, open ones a two-stroke chevron.
    pub fn path(&self, map: impl Fn(Point) -> Point) -> String {
        let points = [map(self.left), map(self.tip), map(self.right)];
        generate_polyline_path(&points, self.style == MarkerStyle::Closed)
    }
}

/// A visible edge. All geometry in canvas space.
#[derive(Debug, Clone)]
pub struct EdgePlan<'a> {
    pub edge: &'a Edge,
    pub start: Point,
    pub end: Point,
    /// `None` when edges are simplified to straight lines
    pub curve: Option<CubicBezier>,
    pub source_marker: Option<MarkerPlan>,
    pub target_marker: Option<MarkerPlan>,
    pub label: Option<Point>,
    /// Drawn radius of the endpoint handles, present only when selected
    pub handle_radius: Option<f64>,
}

impl<'a> EdgePlan<'a> {
    fn new(edge: &'a Edge, start: Point, end: Point, geometry: &GeometryModel, zoom: f64, lod: &LevelOfDetail) -> Self {
        let settings = geometry.settings();
        let curve = (!lod.simplify_edges).then(|| geometry.edge_curve(start, end));
        let traced = curve.unwrap_or_else(|| CubicBezier::line(start, end));

        let (source_marker, target_marker) = if lod.show_arrows {
            (
                MarkerPlan::new(edge.source_marker, start, traced.start_angle(), settings.arrow_size),
                MarkerPlan::new(edge.target_marker, end, traced.end_angle(), settings.arrow_size),
            )
        } else {
            (None, None)
        };

        let label = match (&edge.label, lod.show_labels) {
            (Some(_), true) => Some(match &curve {
                Some(c) => geometry.edge_label_position(c),
                None => geometry.chord_label_position(start, end),
            }),
            _ => None,
        };

        Self {
            edge,
            start,
            end,
            curve,
            source_marker,
            target_marker,
            label,
            handle_radius: edge
                .is_selected
                .then(|| settings.endpoint_handle_size / 2.0 / zoom),
        }
    }

    /// Path commands after mapping through `map`.
    pub fn path(&self, map: impl Fn(Point) -> Point) -> String {
        match &self.curve {
            Some(curve) => generate_bezier_path(&curve.map(map)),
            None => generate_line_path(map(self.start), map(self.end)),
        }
    }
}

/// Everything visible this frame, culled and LOD-resolved, in canvas space.
#[derive(Debug, Clone)]
pub struct FramePlan<'a> {
    pub viewport: &'a Viewport,
    pub geometry: &'a GeometryModel,
    pub lod: LevelOfDetail,
    /// Outermost first, then draw order
    pub groups: Vec<NodePlan<'a>>,
    pub nodes: Vec<NodePlan<'a>>,
    pub edges: Vec<EdgePlan<'a>>,
    /// Ascending z-index
    pub shapes: Vec<&'a Shape>,
    pub culled_nodes: usize,
    pub culled_edges: usize,
}

impl<'a> FramePlan<'a> {
    /// Plan a frame at the LOD the viewport's zoom calls for. `None` when the
    /// snapshot has no graph, no viewport, or a zero-area viewport.
    pub fn build(snapshot: &CanvasSnapshot<'a>) -> Option<Self> {
        let (_, viewport) = snapshot.resolve()?;
        let lod = LevelOfDetail::for_zoom(viewport.zoom(), snapshot.geometry.settings());
        Self::build_with_lod(snapshot, lod)
    }

    pub fn build_with_lod(snapshot: &CanvasSnapshot<'a>, lod: LevelOfDetail) -> Option<Self> {
        let (graph, viewport) = snapshot.resolve()?;
        let geometry = snapshot.geometry;
        let margin = geometry.settings().viewport_cull_margin;
        let zoom = viewport.zoom();

        let mut groups = Vec::new();
        let mut nodes = Vec::new();
        let mut culled_nodes = 0;
        for (z, node) in graph.nodes().iter().enumerate() {
            if graph.is_hidden(node.id) {
                continue;
            }
            let bounds = geometry.node_bounds(node);
            if !viewport.is_in_view(viewport.canvas_rect_to_screen(bounds), margin) {
                culled_nodes += 1;
                continue;
            }
            let plan = NodePlan::new(node, bounds, geometry, zoom, &lod);
            if node.is_group {
                groups.push((graph.nesting_depth(node.id), z, plan));
            } else {
                nodes.push(plan);
            }
        }
        groups.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut edges = Vec::new();
        let mut culled_edges = 0;
        for edge in graph.edges() {
            let (Some(source), Some(target)) = (graph.node(edge.source_node), graph.node(edge.target_node)) else {
                trace!("edge {} references a missing node, not drawn", edge.id);
                continue;
            };
            if graph.is_hidden(source.id) || graph.is_hidden(target.id) {
                continue;
            }
            let (start, end) = geometry.edge_endpoints(edge, source, target);
            if !viewport.is_edge_in_view(viewport.canvas_to_screen(start), viewport.canvas_to_screen(end), margin) {
                culled_edges += 1;
                continue;
            }
            edges.push(EdgePlan::new(edge, start, end, geometry, zoom, &lod));
        }

        let mut shapes: Vec<&Shape> = graph
            .shapes()
            .iter()
            .filter(|s| s.is_visible)
            .filter(|s| viewport.is_in_view(viewport.canvas_rect_to_screen(s.bounds), margin))
            .collect();
        shapes.sort_by_key(|s| s.z_index);

        Some(Self {
            viewport,
            geometry,
            lod,
            groups: groups.into_iter().map(|(_, _, plan)| plan).collect(),
            nodes,
            edges,
            shapes,
            culled_nodes,
            culled_edges,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&NodePlan<'a>> {
        self.nodes
            .iter()
            .chain(self.groups.iter())
            .find(|plan| plan.node.id == id)
    }
}

// ============================================================================
// Immediate renderer
// ============================================================================

/// Counts from one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub groups: usize,
    pub nodes: usize,
    pub edges: usize,
    pub shapes: usize,
    pub culled_nodes: usize,
    pub culled_edges: usize,
}

/// Draws a frame plan as screen-space [`DrawCommand`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateRenderer {
    /// Emit the background grid first
    pub draw_grid: bool,
}

impl ImmediateRenderer {
    pub fn new() -> Self {
        Self { draw_grid: true }
    }

    /// Render the snapshot at the LOD its zoom calls for. `None` when there is
    /// nothing to render against (no graph, no viewport, zero-area viewport).
    pub fn render(&self, snapshot: &CanvasSnapshot, sink: &mut dyn DrawSink) -> Option<RenderStats> {
        let plan = FramePlan::build(snapshot)?;
        Some(self.render_plan(&plan, sink))
    }

    pub fn render_plan(&self, plan: &FramePlan, sink: &mut dyn DrawSink) -> RenderStats {
        let viewport = plan.viewport;
        let zoom = viewport.zoom();
        let to_screen = |p: Point| viewport.canvas_to_screen(p);

        if self.draw_grid {
            let commands = grid_for_viewport(viewport, plan.geometry.settings().grid_spacing);
            if !commands.is_empty() {
                sink.push(DrawCommand::Path {
                    role: DrawRole::Grid,
                    id: 0,
                    commands,
                    filled: false,
                    selected: false,
                });
            }
        }

        for group in &plan.groups {
            self.draw_node(plan, group, sink);
        }

        for edge in &plan.edges {
            let id = edge.edge.id;
            sink.push(DrawCommand::Path {
                role: DrawRole::Edge,
                id,
                commands: edge.path(to_screen),
                filled: false,
                selected: edge.edge.is_selected,
            });
            for marker in [edge.source_marker, edge.target_marker].into_iter().flatten() {
                sink.push(DrawCommand::Path {
                    role: DrawRole::Arrow,
                    id,
                    commands: marker.path(to_screen),
                    filled: marker.style == MarkerStyle::Closed,
                    selected: edge.edge.is_selected,
                });
            }
            if let (Some(position), Some(text)) = (edge.label, &edge.edge.label) {
                sink.push(DrawCommand::Text {
                    role: DrawRole::Label,
                    id,
                    position: to_screen(position),
                    text: text.clone(),
                    centered: true,
                });
            }
        }

        for node in &plan.nodes {
            self.draw_node(plan, node, sink);
        }

        for edge in &plan.edges {
            let Some(radius) = edge.handle_radius else { continue };
            for anchor in [edge.start, edge.end] {
                sink.push(DrawCommand::Circle {
                    role: DrawRole::EndpointHandle,
                    id: edge.edge.id,
                    center: to_screen(anchor),
                    radius: radius * zoom,
                });
            }
        }

        for shape in &plan.shapes {
            sink.push(DrawCommand::Rect {
                role: DrawRole::Shape,
                id: shape.id,
                bounds: viewport.canvas_rect_to_screen(shape.bounds),
                corner_radius: 0.0,
                selected: false,
            });
        }

        let stats = RenderStats {
            groups: plan.groups.len(),
            nodes: plan.nodes.len(),
            edges: plan.edges.len(),
            shapes: plan.shapes.len(),
            culled_nodes: plan.culled_nodes,
            culled_edges: plan.culled_edges,
        };
        trace!("immediate frame: {:?}", stats);
        stats
    }

    fn draw_node(&self, plan: &FramePlan, node_plan: &NodePlan, sink: &mut dyn DrawSink) {
        let viewport = plan.viewport;
        let zoom = viewport.zoom();
        let node = node_plan.node;
        let screen = viewport.canvas_rect_to_screen(node_plan.bounds);

        // Simplified nodes never reach per-type drawing
        let custom = !plan.lod.simplify_nodes
            && plan
                .geometry
                .registry()
                .get(&node.node_type)
                .draw(node, screen, sink);
        if !custom {
            sink.push(DrawCommand::Rect {
                role: if node.is_group { DrawRole::GroupBody } else { DrawRole::NodeBody },
                id: node.id,
                bounds: screen,
                corner_radius: node_plan.corner_radius * zoom,
                selected: node.is_selected,
            });
        }

        if let Some(header) = &node_plan.header {
            sink.push(DrawCommand::Rect {
                role: DrawRole::GroupHeader,
                id: node.id,
                bounds: viewport.canvas_rect_to_screen(header.header),
                corner_radius: 0.0,
                selected: node.is_selected,
            });
            sink.push(DrawCommand::Rect {
                role: DrawRole::CollapseButton,
                id: node.id,
                bounds: viewport.canvas_rect_to_screen(header.button),
                corner_radius: 0.0,
                selected: node.is_collapsed,
            });
        }

        if let (Some(position), Some(title)) = (node_plan.title, &node.title) {
            sink.push(DrawCommand::Text {
                role: DrawRole::Label,
                id: node.id,
                position: viewport.canvas_to_screen(position),
                text: title.clone(),
                centered: !node.is_group,
            });
        }

        for port in &node_plan.ports {
            sink.push(DrawCommand::Circle {
                role: DrawRole::Port,
                id: node.id,
                center: viewport.canvas_to_screen(port.center),
                radius: node_plan.port_radius * zoom,
            });
        }

        for (_, handle) in &node_plan.resize_handles {
            sink.push(DrawCommand::Rect {
                role: DrawRole::ResizeHandle,
                id: node.id,
                bounds: viewport.canvas_rect_to_screen(*handle),
                corner_radius: 0.0,
                selected: true,
            });
        }
    }
}
