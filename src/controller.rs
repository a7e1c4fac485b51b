//! High-level controller for canvas applications.
//!
//! [`CanvasController`] bundles the settings, node type registry, viewport,
//! hit tester and retained scene behind one cloneable handle, so UI
//! callbacks can share them without threading state around.
//!
//! # Example
//!
//! ```ignore
//! use flow_canvas::{CanvasController, FlowCanvasSettings};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = CanvasController::new(FlowCanvasSettings::default());
//!     ctrl.set_graph(graph.clone());
//!     ctrl.set_viewport(1.0, 0.0, 0.0, 1024.0, 768.0).unwrap();
//!
//!     window.set_nodes(ctrl.node_model());
//!     window.set_edges(ctrl.edge_model());
//!
//!     window.on_node_at(ctrl.node_at_callback());
//!     window.on_update_viewport(ctrl.update_viewport_callback());
//!     window.on_request_grid(ctrl.grid_callback());
//!
//!     window.run().unwrap();
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use slint::{ModelRc, SharedString};

use crate::error::Result;
use crate::geometry::{GeometryModel, ResizeHandle};
use crate::graph::{EdgeId, Graph, NodeId, ShapeId};
use crate::grid::grid_for_viewport;
use crate::hit_test::{EdgeEnd, HitResult, HitTester, PortHit};
use crate::registry::NodeTypeBehavior;
use crate::render::{DrawSink, ImmediateRenderer, RenderStats};
use crate::retained::{EdgeVisual, NodeVisual, PortVisual, RetainedScene, ShapeVisual, SyncStats};
use crate::settings::FlowCanvasSettings;
use crate::snapshot::CanvasSnapshot;
use crate::transform::{Point, Rect, Viewport};

/// Controller that owns canvas state and provides callback implementations.
///
/// The graph itself belongs to the editing layer and is shared in through
/// [`set_graph`](Self::set_graph); the controller only reads it. Mutations
/// made through [`Graph`]'s own methods are picked up automatically. Call
/// [`notify_structure_changed`](Self::notify_structure_changed) after
/// anything else that changes node bounds or visibility.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct CanvasController {
    graph: Rc<RefCell<Option<Rc<RefCell<Graph>>>>>,
    viewport: Rc<RefCell<Option<Viewport>>>,
    geometry: Rc<RefCell<GeometryModel>>,
    hit_tester: Rc<RefCell<HitTester>>,
    scene: Rc<RefCell<RetainedScene>>,
    renderer: Rc<RefCell<ImmediateRenderer>>,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(FlowCanvasSettings::default())
    }
}

impl CanvasController {
    pub fn new(settings: FlowCanvasSettings) -> Self {
        Self {
            graph: Rc::new(RefCell::new(None)),
            viewport: Rc::new(RefCell::new(None)),
            geometry: Rc::new(RefCell::new(GeometryModel::new(settings))),
            hit_tester: Rc::new(RefCell::new(HitTester::new())),
            scene: Rc::new(RefCell::new(RetainedScene::new())),
            renderer: Rc::new(RefCell::new(ImmediateRenderer::new())),
        }
    }

    // === State ===

    pub fn set_graph(&self, graph: Rc<RefCell<Graph>>) {
        *self.graph.borrow_mut() = Some(graph);
        self.notify_structure_changed();
    }

    pub fn clear_graph(&self) {
        *self.graph.borrow_mut() = None;
        self.notify_structure_changed();
    }

    pub fn graph(&self) -> Option<Rc<RefCell<Graph>>> {
        self.graph.borrow().clone()
    }

    pub fn settings(&self) -> FlowCanvasSettings {
        self.geometry.borrow().settings().clone()
    }

    /// Replace the settings after validating them. Sizes feed node bounds,
    /// so the spatial index is rebuilt on the next query.
    pub fn set_settings(&self, settings: FlowCanvasSettings) -> Result<()> {
        settings.validate()?;
        self.geometry.borrow_mut().set_settings(settings);
        self.notify_structure_changed();
        Ok(())
    }

    pub fn register_node_type<B>(&self, node_type: impl Into<String>, behavior: B)
    where
        B: NodeTypeBehavior + 'static,
    {
        self.geometry.borrow_mut().registry_mut().register(node_type, behavior);
        self.notify_structure_changed();
    }

    /// Mark the spatial index stale for changes the graph revision cannot see.
    pub fn notify_structure_changed(&self) {
        self.hit_tester.borrow_mut().mark_dirty();
    }

    pub fn set_draw_grid(&self, draw_grid: bool) {
        self.renderer.borrow_mut().draw_grid = draw_grid;
    }

    // === Viewport ===

    /// Set or create the viewport. An invalid zoom is rejected and the
    /// previous viewport is kept.
    pub fn set_viewport(&self, zoom: f64, offset_x: f64, offset_y: f64, width: f64, height: f64) -> Result<()> {
        let viewport = Viewport::new(zoom, offset_x, offset_y, width, height)?;
        *self.viewport.borrow_mut() = Some(viewport);
        Ok(())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        *self.viewport.borrow()
    }

    /// Pan and zoom, keeping the current viewport size.
    pub fn set_view(&self, zoom: f64, offset_x: f64, offset_y: f64) -> Result<()> {
        let mut slot = self.viewport.borrow_mut();
        match slot.as_mut() {
            Some(viewport) => {
                viewport.set_zoom(zoom)?;
                viewport.set_offset(offset_x, offset_y);
            }
            None => *slot = Some(Viewport::new(zoom, offset_x, offset_y, 0.0, 0.0)?),
        }
        Ok(())
    }

    /// Resize, creating a unit-zoom viewport on first call.
    pub fn resize_viewport(&self, width: f64, height: f64) -> Result<()> {
        let mut slot = self.viewport.borrow_mut();
        match slot.as_mut() {
            Some(viewport) => viewport.resize(width, height)?,
            None => *slot = Some(Viewport::new(1.0, 0.0, 0.0, width, height)?),
        }
        Ok(())
    }

    /// Zoom around a screen point. No-op without a viewport.
    pub fn zoom_about(&self, screen_x: f64, screen_y: f64, zoom: f64) -> Result<()> {
        if let Some(viewport) = self.viewport.borrow_mut().as_mut() {
            viewport.zoom_about(Point::new(screen_x, screen_y), zoom)?;
        }
        Ok(())
    }

    pub fn pan_by(&self, dx: f64, dy: f64) {
        if let Some(viewport) = self.viewport.borrow_mut().as_mut() {
            viewport.pan_by(dx, dy);
        }
    }

    // === Queries ===

    fn query<R>(&self, f: impl FnOnce(&mut HitTester, &CanvasSnapshot) -> R) -> R {
        let graph = self.graph.borrow();
        let graph_ref = graph.as_ref().map(|g| g.borrow());
        let viewport = self.viewport.borrow();
        let geometry = self.geometry.borrow();
        let snapshot = CanvasSnapshot {
            graph: graph_ref.as_deref(),
            viewport: viewport.as_ref(),
            geometry: &geometry,
        };
        let mut hit_tester = self.hit_tester.borrow_mut();
        f(&mut hit_tester, &snapshot)
    }

    // Screen-space hit-testing facades. Coordinates are pointer
    // coordinates; conversion to canvas space happens inside.

    pub fn hit_test(&self, screen_x: f64, screen_y: f64) -> Option<HitResult> {
        self.query(|tester, snapshot| tester.hit_test(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_node(&self, screen_x: f64, screen_y: f64) -> Option<NodeId> {
        self.query(|tester, snapshot| tester.hit_test_node(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_port(&self, screen_x: f64, screen_y: f64) -> Option<PortHit> {
        self.query(|tester, snapshot| tester.hit_test_port(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_edge(&self, screen_x: f64, screen_y: f64) -> Option<EdgeId> {
        self.query(|tester, snapshot| tester.hit_test_edge(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_edge_endpoint_handle(&self, screen_x: f64, screen_y: f64) -> Option<(EdgeId, EdgeEnd)> {
        self.query(|tester, snapshot| tester.hit_test_edge_endpoint_handle(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_resize_handle(&self, screen_x: f64, screen_y: f64) -> Option<(NodeId, ResizeHandle)> {
        self.query(|tester, snapshot| tester.hit_test_resize_handle(snapshot, screen_x, screen_y))
    }

    pub fn hit_test_shape(&self, screen_x: f64, screen_y: f64) -> Option<ShapeId> {
        self.query(|tester, snapshot| tester.hit_test_shape(snapshot, screen_x, screen_y))
    }

    /// Nodes intersecting a screen-space rubber band.
    pub fn nodes_in_selection_box(&self, x: f64, y: f64, width: f64, height: f64) -> Vec<NodeId> {
        let rect = Rect::from_points(Point::new(x, y), Point::new(x + width, y + height));
        self.query(|tester, snapshot| tester.nodes_in_selection_box(snapshot, rect))
    }

    /// Edges with an endpoint inside a screen-space rubber band.
    pub fn edges_in_selection_box(&self, x: f64, y: f64, width: f64, height: f64) -> Vec<EdgeId> {
        let rect = Rect::from_points(Point::new(x, y), Point::new(x + width, y + height));
        self.query(|tester, snapshot| tester.edges_in_selection_box(snapshot, rect))
    }

    // === Rendering ===

    /// Draw the current frame immediately into `sink`.
    pub fn render(&self, sink: &mut dyn DrawSink) -> Option<RenderStats> {
        let renderer = *self.renderer.borrow();
        self.query(|_, snapshot| renderer.render(snapshot, sink))
    }

    /// Bring the retained models up to date with the graph and viewport.
    pub fn sync_scene(&self) -> Option<SyncStats> {
        let scene = self.scene.clone();
        self.query(|_, snapshot| scene.borrow_mut().sync(snapshot))
    }

    pub fn node_model(&self) -> ModelRc<NodeVisual> {
        self.scene.borrow().node_model()
    }

    pub fn port_model(&self) -> ModelRc<PortVisual> {
        self.scene.borrow().port_model()
    }

    pub fn edge_model(&self) -> ModelRc<EdgeVisual> {
        self.scene.borrow().edge_model()
    }

    pub fn shape_model(&self) -> ModelRc<ShapeVisual> {
        self.scene.borrow().shape_model()
    }

    /// Grid path commands for the current viewport; empty without one.
    pub fn grid(&self) -> SharedString {
        let spacing = self.geometry.borrow().settings().grid_spacing;
        self.viewport
            .borrow()
            .as_ref()
            .map(|viewport| grid_for_viewport(viewport, spacing))
            .unwrap_or_default()
            .into()
    }

    // === Callback factories ===

    /// Returns a callback for `node-at`: the node under a screen point, or -1.
    pub fn node_at_callback(&self) -> impl Fn(f32, f32) -> i32 {
        let ctrl = self.clone();
        move |x, y| ctrl.hit_test_node(x as f64, y as f64).unwrap_or(-1)
    }

    /// Returns a callback for `edge-at`: the edge under a screen point, or -1.
    pub fn edge_at_callback(&self) -> impl Fn(f32, f32) -> i32 {
        let ctrl = self.clone();
        move |x, y| ctrl.hit_test_edge(x as f64, y as f64).unwrap_or(-1)
    }

    /// Returns a callback for `update-viewport`: applies zoom and pan, then
    /// resyncs the retained scene. An invalid zoom is logged and ignored.
    pub fn update_viewport_callback(&self) -> impl Fn(f32, f32, f32) {
        let ctrl = self.clone();
        move |zoom, pan_x, pan_y| {
            if let Err(err) = ctrl.set_view(zoom as f64, pan_x as f64, pan_y as f64) {
                warn!("viewport update ignored: {}", err);
                return;
            }
            ctrl.sync_scene();
        }
    }

    /// Returns a callback for `viewport-resized`. A non-finite size is
    /// logged and ignored.
    pub fn viewport_resized_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |width, height| {
            if let Err(err) = ctrl.resize_viewport(width as f64, height as f64) {
                warn!("viewport resize ignored: {}", err);
                return;
            }
            ctrl.sync_scene();
        }
    }

    /// Returns a callback for `request-grid`.
    pub fn grid_callback(&self) -> impl Fn() -> SharedString {
        let ctrl = self.clone();
        move || ctrl.grid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};
    use crate::registry::FixedSize;
    use slint::Model;

    fn shared_graph() -> Rc<RefCell<Graph>> {
        let mut graph = Graph::new();
        graph.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 60.0).with_outputs([10]));
        graph.add_node(Node::new(2, 300.0, 0.0).with_size(100.0, 60.0).with_inputs([20]));
        graph.add_edge(Edge::new(1, 1, 10, 2, 20));
        Rc::new(RefCell::new(graph))
    }

    fn controller() -> (CanvasController, Rc<RefCell<Graph>>) {
        let ctrl = CanvasController::default();
        let graph = shared_graph();
        ctrl.set_graph(graph.clone());
        ctrl.set_viewport(1.0, 0.0, 0.0, 800.0, 600.0).unwrap();
        (ctrl, graph)
    }

    // ========================================================================
    // Preconditions
    // ========================================================================

    #[test]
    fn test_no_graph_no_hits() {
        let ctrl = CanvasController::default();
        ctrl.set_viewport(1.0, 0.0, 0.0, 800.0, 600.0).unwrap();
        assert!(ctrl.hit_test(50.0, 30.0).is_none());
        assert!(ctrl.sync_scene().is_none());
    }

    #[test]
    fn test_invalid_zoom_keeps_previous_viewport() {
        let (ctrl, _) = controller();
        assert!(ctrl.set_view(0.0, 10.0, 10.0).is_err());
        assert_eq!(ctrl.viewport().unwrap().zoom(), 1.0);
        assert!(ctrl.zoom_about(10.0, 10.0, -2.0).is_err());
    }

    #[test]
    fn test_non_finite_resize_keeps_previous_size() {
        let (ctrl, _) = controller();
        assert!(ctrl.resize_viewport(f64::INFINITY, 600.0).is_err());
        assert_eq!(ctrl.viewport().unwrap().size(), (800.0, 600.0));

        let resized = ctrl.viewport_resized_callback();
        resized(f32::INFINITY, f32::NAN);
        assert_eq!(ctrl.viewport().unwrap().size(), (800.0, 600.0));
        assert!(!ctrl.grid().is_empty());

        resized(1024.0, 768.0);
        assert_eq!(ctrl.viewport().unwrap().size(), (1024.0, 768.0));
    }

    #[test]
    fn test_first_resize_creates_viewport() {
        let ctrl = CanvasController::default();
        assert!(ctrl.resize_viewport(f64::NAN, 600.0).is_err());
        assert!(ctrl.viewport().is_none());
        ctrl.resize_viewport(640.0, 480.0).unwrap();
        assert_eq!(ctrl.viewport().unwrap().zoom(), 1.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let (ctrl, _) = controller();
        let bad = FlowCanvasSettings {
            port_size: -1.0,
            ..FlowCanvasSettings::default()
        };
        assert!(ctrl.set_settings(bad).is_err());
        assert_eq!(ctrl.settings().port_size, 12.0);
    }

    // ========================================================================
    // Hit testing through shared state
    // ========================================================================

    #[test]
    fn test_hits_follow_shared_graph_mutations() {
        let (ctrl, graph) = controller();
        assert_eq!(ctrl.hit_test_node(50.0, 30.0), Some(1));

        graph.borrow_mut().move_node(1, 500.0, 300.0);
        assert_eq!(ctrl.hit_test_node(50.0, 30.0), None);
        assert_eq!(ctrl.hit_test_node(550.0, 330.0), Some(1));
    }

    #[test]
    fn test_pan_and_zoom_applied_to_hits() {
        let (ctrl, _) = controller();
        ctrl.pan_by(100.0, 0.0);
        assert_eq!(ctrl.hit_test_node(150.0, 30.0), Some(1));
        ctrl.zoom_about(0.0, 0.0, 2.0).unwrap();
        // Zooming about the origin doubles the size, offset stays: x 100..300
        assert_eq!(ctrl.hit_test_node(200.0, 60.0), Some(1));
        assert_eq!(ctrl.hit_test_node(90.0, 60.0), None);
    }

    #[test]
    fn test_register_node_type_changes_bounds() {
        let ctrl = CanvasController::default();
        let mut graph = Graph::new();
        graph.add_node(Node::new(1, 0.0, 0.0).with_type("big"));
        ctrl.set_graph(Rc::new(RefCell::new(graph)));
        ctrl.set_viewport(1.0, 0.0, 0.0, 800.0, 600.0).unwrap();

        assert_eq!(ctrl.hit_test_node(250.0, 150.0), None);
        ctrl.register_node_type("big", FixedSize::new(400.0, 300.0));
        assert_eq!(ctrl.hit_test_node(250.0, 150.0), Some(1));
    }

    #[test]
    fn test_selection_box_accepts_negative_extent() {
        let (ctrl, _) = controller();
        assert_eq!(ctrl.nodes_in_selection_box(150.0, 100.0, -100.0, -90.0), vec![1]);
        assert_eq!(ctrl.edges_in_selection_box(290.0, 20.0, 20.0, 20.0), vec![1]);
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    #[test]
    fn test_node_at_callback() {
        let (ctrl, _) = controller();
        let node_at = ctrl.node_at_callback();
        assert_eq!(node_at(50.0, 30.0), 1);
        assert_eq!(node_at(700.0, 500.0), -1);
    }

    #[test]
    fn test_update_viewport_callback_resyncs_scene() {
        let (ctrl, _) = controller();
        let nodes = ctrl.node_model();
        ctrl.sync_scene();
        assert_eq!(nodes.row_count(), 2);

        let update = ctrl.update_viewport_callback();
        // Pan far away: everything culled
        update(1.0, -10000.0, -10000.0);
        assert_eq!(nodes.row_count(), 0);

        // Invalid zoom is ignored
        update(0.0, 0.0, 0.0);
        assert_eq!(ctrl.viewport().unwrap().offset(), (-10000.0, -10000.0));
    }

    #[test]
    fn test_grid_callback() {
        let (ctrl, _) = controller();
        let grid = ctrl.grid_callback();
        assert!(grid().starts_with("M 0 0"));
        assert!(CanvasController::default().grid().is_empty());
    }

    #[test]
    fn test_render_through_controller() {
        let (ctrl, _) = controller();
        ctrl.set_draw_grid(false);
        let mut out = Vec::new();
        let stats = ctrl.render(&mut out).unwrap();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.edges, 1);
        assert!(!out.is_empty());
    }
}
