//! Geometry model: where nodes, ports, edges and handles live in canvas space.
//!
//! Everything here is a pure function of a node/edge, the settings, and the
//! per-type registry. Both renderers and the hit tester go through
//! [`GeometryModel`] for port anchors and curves; none of them computes its
//! own, which is what keeps them in agreement.

use std::f64::consts::FRAC_PI_6;

use crate::graph::{Edge, Graph, Node};
use crate::path::CubicBezier;
use crate::registry::NodeTypeRegistry;
use crate::settings::FlowCanvasSettings;
use crate::transform::{Point, Rect};

/// Half the opening angle of every arrowhead (30 degrees).
pub const ARROW_HALF_ANGLE: f64 = FRAC_PI_6;

/// The eight resize handles around a node, clockwise from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    /// Handle center on `bounds`.
    pub fn anchor(self, bounds: Rect) -> Point {
        let cx = bounds.x + bounds.width / 2.0;
        let cy = bounds.y + bounds.height / 2.0;
        match self {
            ResizeHandle::TopLeft => Point::new(bounds.x, bounds.y),
            ResizeHandle::Top => Point::new(cx, bounds.y),
            ResizeHandle::TopRight => Point::new(bounds.right(), bounds.y),
            ResizeHandle::Right => Point::new(bounds.right(), cy),
            ResizeHandle::BottomRight => Point::new(bounds.right(), bounds.bottom()),
            ResizeHandle::Bottom => Point::new(cx, bounds.bottom()),
            ResizeHandle::BottomLeft => Point::new(bounds.x, bounds.bottom()),
            ResizeHandle::Left => Point::new(bounds.x, cy),
        }
    }
}

/// Back corners of an arrowhead whose tip is at `tip`, pointing along `angle`.
///
/// `tip - size * (cos(angle -/+ 30deg), sin(angle -/+ 30deg))`.
pub fn arrow_points(tip: Point, angle: f64, size: f64) -> (Point, Point) {
    let a = angle - ARROW_HALF_ANGLE;
    let b = angle + ARROW_HALF_ANGLE;
    (
        Point::new(tip.x - size * a.cos(), tip.y - size * a.sin()),
        Point::new(tip.x - size * b.cos(), tip.y - size * b.sin()),
    )
}

#[derive(Debug, Default)]
pub struct GeometryModel {
    settings: FlowCanvasSettings,
    registry: NodeTypeRegistry,
}

impl GeometryModel {
    pub fn new(settings: FlowCanvasSettings) -> Self {
        Self {
            settings,
            registry: NodeTypeRegistry::new(),
        }
    }

    pub fn with_registry(settings: FlowCanvasSettings, registry: NodeTypeRegistry) -> Self {
        Self { settings, registry }
    }

    pub fn settings(&self) -> &FlowCanvasSettings {
        &self.settings
    }

    /// Swap the settings, keeping registered node types.
    pub fn set_settings(&mut self, settings: FlowCanvasSettings) {
        self.settings = settings;
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NodeTypeRegistry {
        &mut self.registry
    }

    // === Nodes ===

    /// Node size: explicit size, else the type's size, else the global default.
    ///
    /// Collapsed groups are always exactly one header tall.
    pub fn node_size(&self, node: &Node) -> (f64, f64) {
        let behavior = self.registry.get(&node.node_type);
        let width = node
            .width
            .or_else(|| behavior.width(node, &self.settings))
            .unwrap_or(self.settings.default_node_width);
        let height = if node.is_group && node.is_collapsed {
            self.settings.group_header_height
        } else {
            node.height
                .or_else(|| behavior.height(node, &self.settings))
                .unwrap_or(self.settings.default_node_height)
        };
        (width, height)
    }

    /// Node rectangle in canvas space.
    pub fn node_bounds(&self, node: &Node) -> Rect {
        let (width, height) = self.node_size(node);
        Rect::new(node.position.x, node.position.y, width, height)
    }

    /// Center of a node's title: horizontally centered, in the top strip.
    pub fn node_title_position(&self, node: &Node) -> Point {
        let bounds = self.node_bounds(node);
        Point::new(
            bounds.x + bounds.width / 2.0,
            bounds.y + self.settings.group_header_height.min(bounds.height) / 2.0,
        )
    }

    // === Ports ===

    /// Anchor of the `index`-th of `total` ports on one side of the node.
    ///
    /// Inputs sit on the left edge, outputs on the right. A single port is
    /// vertically centered; several are spaced `height / (total + 1)` apart.
    pub fn port_position_by_index(
        &self,
        node: &Node,
        index: usize,
        total: usize,
        is_output: bool,
    ) -> Point {
        let bounds = self.node_bounds(node);
        let x = if is_output { bounds.right() } else { bounds.x };
        let y = if total <= 1 {
            bounds.y + bounds.height / 2.0
        } else {
            let spacing = bounds.height / (total as f64 + 1.0);
            bounds.y + spacing * (index as f64 + 1.0)
        };
        Point::new(x, y)
    }

    /// Anchor of a port by id on the given side; `None` if the id is not there.
    pub fn port_position(&self, node: &Node, port_id: i32, is_output: bool) -> Option<Point> {
        let ports = node.ports(is_output);
        let index = ports.iter().position(|p| p.id == port_id)?;
        Some(self.port_position_by_index(node, index, ports.len(), is_output))
    }

    /// Radius of the drawn port dot, canvas units. `port_size` is its
    /// on-screen diameter.
    pub fn port_draw_radius(&self, zoom: f64) -> f64 {
        self.settings.port_size / 2.0 / zoom
    }

    /// Radius of the port's hit circle, canvas units.
    ///
    /// Twice the drawn radius: the whole `port_size` square around the dot
    /// (and a bit past its corners) picks the port.
    pub fn port_hit_radius(&self, zoom: f64) -> f64 {
        self.settings.port_size / zoom
    }

    /// True if `point` lies within the port's hit circle (canvas space).
    pub fn is_point_in_port(&self, point: Point, port_center: Point, zoom: f64) -> bool {
        point.distance_to(port_center) <= self.port_hit_radius(zoom)
    }

    // === Edges ===

    /// Source and target anchors of an edge, canvas space.
    ///
    /// A stale port id falls back to index 0 on the expected side so one
    /// outdated reference does not drop the whole edge.
    pub fn edge_endpoints(&self, edge: &Edge, source: &Node, target: &Node) -> (Point, Point) {
        (
            self.anchor_or_first(source, edge.source_port, true),
            self.anchor_or_first(target, edge.target_port, false),
        )
    }

    /// [`edge_endpoints`](Self::edge_endpoints) with node lookup; `None` when
    /// either node is missing from the graph.
    pub fn edge_endpoints_in(&self, graph: &Graph, edge: &Edge) -> Option<(Point, Point)> {
        let source = graph.node(edge.source_node)?;
        let target = graph.node(edge.target_node)?;
        Some(self.edge_endpoints(edge, source, target))
    }

    fn anchor_or_first(&self, node: &Node, port_id: i32, is_output: bool) -> Point {
        self.port_position(node, port_id, is_output).unwrap_or_else(|| {
            let total = node.ports(is_output).len();
            self.port_position_by_index(node, 0, total, is_output)
        })
    }

    /// The two bezier control points for an edge from `start` to `end`.
    pub fn bezier_control_points(&self, start: Point, end: Point) -> (Point, Point) {
        let curve = self.edge_curve(start, end);
        (curve.p1, curve.p2)
    }

    pub fn edge_curve(&self, start: Point, end: Point) -> CubicBezier {
        CubicBezier::from_endpoints(
            start,
            end,
            self.settings.bezier_curvature,
            self.settings.bezier_min_offset,
        )
    }

    /// Where an edge label is anchored: the curve's parametric midpoint.
    pub fn edge_label_position(&self, curve: &CubicBezier) -> Point {
        curve.eval(0.5)
    }

    /// Label anchor for an edge drawn as a straight line: the chord midpoint.
    pub fn chord_label_position(&self, start: Point, end: Point) -> Point {
        Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0)
    }

    /// Canvas-space radius of a selected edge's endpoint handles.
    pub fn endpoint_handle_radius(&self, zoom: f64) -> f64 {
        (self.settings.endpoint_handle_size / 2.0 + self.settings.endpoint_handle_padding) / zoom
    }

    // === Resize handles ===

    pub fn resize_handle_positions(&self, node: &Node) -> [(ResizeHandle, Point); 8] {
        let bounds = self.node_bounds(node);
        ResizeHandle::ALL.map(|handle| (handle, handle.anchor(bounds)))
    }

    /// True if `point` is inside the square handle centered on `center`.
    ///
    /// The square is `resize_handle_size` screen pixels wide at any zoom.
    pub fn is_point_in_resize_handle(&self, point: Point, center: Point, zoom: f64) -> bool {
        let half = self.settings.resize_handle_size / 2.0 / zoom;
        (point.x - center.x).abs() <= half && (point.y - center.y).abs() <= half
    }

    // === Groups ===

    /// Header strip along the top of a group.
    pub fn group_header_bounds(&self, node: &Node) -> Rect {
        let bounds = self.node_bounds(node);
        Rect::new(
            bounds.x,
            bounds.y,
            bounds.width,
            self.settings.group_header_height.min(bounds.height),
        )
    }

    /// Collapse/expand toggle, left-aligned and vertically centered in the header.
    pub fn collapse_button_bounds(&self, node: &Node) -> Rect {
        let header = self.group_header_bounds(node);
        let size = self.settings.collapse_button_size;
        Rect::new(
            header.x + self.settings.group_header_padding,
            header.y + (header.height - size) / 2.0,
            size,
            size,
        )
    }

    /// Baseline-left of the group title, to the right of the collapse button.
    pub fn group_label_position(&self, node: &Node) -> Point {
        let button = self.collapse_button_bounds(node);
        let header = self.group_header_bounds(node);
        Point::new(
            button.right() + self.settings.group_label_gap,
            header.y + header.height / 2.0,
        )
    }
}
