use crate::geometry::GeometryModel;
use crate::graph::Graph;
use crate::transform::Viewport;

/// Read-only view of everything a query needs.
///
/// The graph and viewport are optional because the editing layer may not
/// have supplied them yet; every query returns "no result" in that case.
/// The caller must not mutate either while a query runs.
#[derive(Debug, Clone, Copy)]
pub struct CanvasSnapshot<'a> {
    pub graph: Option<&'a Graph>,
    pub viewport: Option<&'a Viewport>,
    pub geometry: &'a GeometryModel,
}

impl<'a> CanvasSnapshot<'a> {
    pub fn new(graph: &'a Graph, viewport: &'a Viewport, geometry: &'a GeometryModel) -> Self {
        Self {
            graph: Some(graph),
            viewport: Some(viewport),
            geometry,
        }
    }

    /// Graph and viewport, provided both exist and the viewport has area.
    pub fn resolve(&self) -> Option<(&'a Graph, &'a Viewport)> {
        let graph = self.graph?;
        let viewport = self.viewport?;
        if viewport.has_area() {
            Some((graph, viewport))
        } else {
            None
        }
    }
}
