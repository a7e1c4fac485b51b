//! # Flow Canvas
//!
//! Render geometry and hit-testing engine for interactive node-graph
//! canvases: nodes connected by bezier edges, collapsible groups, free
//! shapes, on a pannable and zoomable surface.
//!
//! ## Features
//!
//! - **One geometry model** - Port anchors, bezier curves, arrowheads and
//!   handles are computed in one place and shared by every consumer
//! - **Zoom-adaptive hit testing** - Screen-constant hit sizes, topmost-first
//!   priority, and a shrinking click target for nodes tiny on screen
//! - **Self-healing spatial index** - Rebuilt on the first query after any
//!   change to node bounds or visibility
//! - **Two renderers, one plan** - Immediate-mode draw commands in screen
//!   space, or Slint `VecModel`s in canvas space synced row by row
//! - **Pure LOD** - Simplification depends only on the current zoom
//!
//! ## Spaces
//!
//! *Canvas space* is the graph's own coordinate system. *Screen space* is
//! pointer coordinates: `screen = canvas * zoom + offset`. Hit-test entry
//! points take screen coordinates; geometry is canvas space.
//!
//! ## Quick Start
//!
//! ```
//! use flow_canvas::{CanvasSnapshot, Edge, GeometryModel, Graph, HitTester, Node, Viewport};
//!
//! let mut graph = Graph::new();
//! graph.add_node(Node::new(1, 0.0, 0.0).with_size(100.0, 60.0).with_outputs([10]));
//! graph.add_node(Node::new(2, 300.0, 0.0).with_size(100.0, 60.0).with_inputs([20]));
//! graph.add_edge(Edge::new(1, 1, 10, 2, 20));
//!
//! let viewport = Viewport::new(1.0, 0.0, 0.0, 800.0, 600.0).unwrap();
//! let geometry = GeometryModel::default();
//! let snapshot = CanvasSnapshot::new(&graph, &viewport, &geometry);
//!
//! let mut hits = HitTester::new();
//! assert_eq!(hits.hit_test_node(&snapshot, 50.0, 30.0), Some(1));
//! assert_eq!(hits.hit_test_edge(&snapshot, 200.0, 30.0), Some(1));
//! ```
//!
//! ## Modules
//!
//! - [`transform`] - [`Point`], [`Rect`], [`Viewport`] and culling
//! - [`geometry`] - [`GeometryModel`]: node bounds, ports, curves, handles
//! - [`hit_test`] - [`HitTester`] and rubber-band selection queries
//! - [`render`] - [`FramePlan`] and the [`ImmediateRenderer`]
//! - [`retained`] - [`RetainedScene`] backed by Slint models
//! - [`controller`] - [`CanvasController`] for wiring into a Slint UI

pub mod controller;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod lod;
pub mod path;
pub mod registry;
pub mod render;
pub mod retained;
pub mod settings;
pub mod snapshot;
pub mod spatial_index;
pub mod transform;

// Re-export the public surface
pub use controller::CanvasController;
pub use error::{CanvasError, Result};
pub use geometry::{arrow_points, GeometryModel, ResizeHandle, ARROW_HALF_ANGLE};
pub use graph::{Edge, EdgeId, Graph, MarkerStyle, Node, NodeId, Port, PortId, Shape, ShapeId};
pub use grid::{generate_grid_commands, grid_for_viewport};
pub use hit_test::{
    accepts_click, click_acceptance_ratio, normalized_center_distance, EdgeEnd, HitResult,
    HitTester, PortHit,
};
pub use lod::LevelOfDetail;
pub use path::{
    distance_to_segment, generate_bezier_path, generate_line_path, generate_polyline_path,
    CubicBezier,
};
pub use registry::{DefaultNodeType, FixedSize, NodeTypeBehavior, NodeTypeRegistry};
pub use render::{
    DrawCommand, DrawRole, DrawSink, EdgePlan, FramePlan, ImmediateRenderer, MarkerPlan,
    NodePlan, RenderStats,
};
pub use retained::{EdgeVisual, NodeVisual, PortVisual, RetainedScene, ShapeVisual, SyncStats};
pub use settings::FlowCanvasSettings;
pub use snapshot::CanvasSnapshot;
pub use spatial_index::{IndexEntry, SpatialIndex};
pub use transform::{canvas_to_screen, screen_to_canvas, Point, Rect, ViewTransform, Viewport};
