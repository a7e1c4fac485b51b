//! Per-node-type behavior, keyed by the node's type tag.
//!
//! Applications register a [`NodeTypeBehavior`] for each type that needs a
//! custom size, custom drawing, or an extra hit area. Unregistered types fall
//! back to [`DefaultNodeType`], which supplies nothing and lets the geometry
//! and rendering code use their defaults.
//!
//! # Example
//!
//! ```
//! use flow_canvas::{FixedSize, NodeTypeRegistry};
//!
//! let mut registry = NodeTypeRegistry::new();
//! registry.register("color-picker", FixedSize::new(220.0, 180.0));
//! assert!(registry.contains("color-picker"));
//! ```

use std::collections::HashMap;

use crate::graph::Node;
use crate::render::DrawSink;
use crate::settings::FlowCanvasSettings;
use crate::transform::{Point, Rect};

/// Capabilities a node type can override. Every method has a no-op default.
pub trait NodeTypeBehavior {
    /// Width in canvas units, or `None` to use the global default
    fn width(&self, _node: &Node, _settings: &FlowCanvasSettings) -> Option<f64> {
        None
    }

    /// Height in canvas units, or `None` to use the global default
    fn height(&self, _node: &Node, _settings: &FlowCanvasSettings) -> Option<f64> {
        None
    }

    /// Draw the node body into `out`. `screen_bounds` is in screen space.
    ///
    /// Return `false` to let the default body be drawn instead.
    fn draw(&self, _node: &Node, _screen_bounds: Rect, _out: &mut dyn DrawSink) -> bool {
        false
    }

    /// Accept clicks outside the node rectangle (canvas space), e.g. a knob
    /// that sticks out of the body.
    fn hit_test_extra(&self, _node: &Node, _bounds: Rect, _point: Point) -> bool {
        false
    }
}

/// Fallback for unregistered types.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNodeType;

impl NodeTypeBehavior for DefaultNodeType {}

/// A type whose nodes all have the same size.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize {
    pub width: f64,
    pub height: f64,
}

impl FixedSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl NodeTypeBehavior for FixedSize {
    fn width(&self, _node: &Node, _settings: &FlowCanvasSettings) -> Option<f64> {
        Some(self.width)
    }

    fn height(&self, _node: &Node, _settings: &FlowCanvasSettings) -> Option<f64> {
        Some(self.height)
    }
}

static DEFAULT_BEHAVIOR: DefaultNodeType = DefaultNodeType;

#[derive(Default)]
pub struct NodeTypeRegistry {
    behaviors: HashMap<String, Box<dyn NodeTypeBehavior>>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register behavior for a type tag, replacing any previous registration.
    pub fn register<B>(&mut self, node_type: impl Into<String>, behavior: B)
    where
        B: NodeTypeBehavior + 'static,
    {
        self.behaviors.insert(node_type.into(), Box::new(behavior));
    }

    pub fn unregister(&mut self, node_type: &str) -> bool {
        self.behaviors.remove(node_type).is_some()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.behaviors.contains_key(node_type)
    }

    /// True when no type is registered, so every node uses the defaults.
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Behavior for `node_type`, or the default when none is registered.
    pub fn get(&self, node_type: &str) -> &dyn NodeTypeBehavior {
        match self.behaviors.get(node_type) {
            Some(behavior) => behavior.as_ref(),
            None => &DEFAULT_BEHAVIOR,
        }
    }
}

impl std::fmt::Debug for NodeTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.behaviors.keys().collect();
        types.sort();
        f.debug_struct("NodeTypeRegistry").field("types", &types).finish()
    }
}
