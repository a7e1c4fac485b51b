//! Coordinate transform between canvas space and screen space.
//!
//! Canvas space is the graph's own coordinate system. Screen space is what
//! the pointer reports: `screen = canvas * zoom + offset`. Every function in
//! this crate takes and returns points in exactly one of the two spaces and
//! says which in its name or docs.

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rect containing both points, whatever their order.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: a.x.max(b.x) - x,
            height: a.y.max(b.y) - y,
        }
    }

    /// Square of side `size` centered on `center`.
    pub fn centered(center: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Strict overlap test; rects that only touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Map a canvas point to screen space.
pub fn canvas_to_screen(point: Point, zoom: f64, offset_x: f64, offset_y: f64) -> Point {
    Point::new(point.x * zoom + offset_x, point.y * zoom + offset_y)
}

/// Map a screen point to canvas space; exact inverse of [`canvas_to_screen`].
pub fn screen_to_canvas(point: Point, zoom: f64, offset_x: f64, offset_y: f64) -> Point {
    Point::new((point.x - offset_x) / zoom, (point.y - offset_y) / zoom)
}

/// Zoom and pan state of the visible canvas area.
///
/// The zoom factor is validated on construction and on every update, so
/// conversions never need to re-check it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Create a viewport of `width` x `height` screen pixels.
    ///
    /// `offset_x`/`offset_y` are where the canvas origin lands on screen.
    /// Negative sizes clamp to zero; infinite or NaN sizes are rejected.
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64, width: f64, height: f64) -> Result<Self> {
        check_zoom(zoom)?;
        check_size(width, height)?;
        Ok(Self {
            zoom,
            offset_x,
            offset_y,
            width: width.max(0.0),
            height: height.max(0.0),
        })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        check_zoom(zoom)?;
        self.zoom = zoom;
        Ok(())
    }

    /// Change zoom while keeping the canvas point under `anchor` (screen) fixed.
    pub fn zoom_about(&mut self, anchor: Point, zoom: f64) -> Result<()> {
        check_zoom(zoom)?;
        let pinned = self.screen_to_canvas(anchor);
        self.zoom = zoom;
        self.offset_x = anchor.x - pinned.x * zoom;
        self.offset_y = anchor.y - pinned.y * zoom;
        Ok(())
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
    }

    /// Same rules as [`Viewport::new`]; on error the size is unchanged.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        check_size(width, height)?;
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        Ok(())
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// The visible area in screen space.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// The visible area in canvas space.
    pub fn visible_canvas_rect(&self) -> Rect {
        self.screen_rect_to_canvas(self.visible_rect())
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        canvas_to_screen(point, self.zoom, self.offset_x, self.offset_y)
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        screen_to_canvas(point, self.zoom, self.offset_x, self.offset_y)
    }

    pub fn canvas_rect_to_screen(&self, rect: Rect) -> Rect {
        let origin = self.canvas_to_screen(Point::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.width * self.zoom, rect.height * self.zoom)
    }

    pub fn screen_rect_to_canvas(&self, rect: Rect) -> Rect {
        let origin = self.screen_to_canvas(Point::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.width / self.zoom, rect.height / self.zoom)
    }

    /// Convert a length that must stay constant on screen into canvas units.
    pub fn screen_len_to_canvas(&self, len: f64) -> f64 {
        len / self.zoom
    }

    /// Culling test shared by hit testing and rendering.
    ///
    /// `screen_rect` is visible when it intersects the visible rect grown by
    /// `cull_margin * zoom` pixels on every side.
    pub fn is_in_view(&self, screen_rect: Rect, cull_margin: f64) -> bool {
        let bounds = self.visible_rect().expand(cull_margin * self.zoom);
        // Zero-area rects (a horizontal edge chord) still count when inside.
        screen_rect.x <= bounds.right()
            && screen_rect.right() >= bounds.x
            && screen_rect.y <= bounds.bottom()
            && screen_rect.bottom() >= bounds.y
    }

    /// Edge culling: an edge is kept when at least one endpoint (screen
    /// space) is inside the same expanded rect [`is_in_view`](Self::is_in_view) uses.
    pub fn is_edge_in_view(&self, start: Point, end: Point, cull_margin: f64) -> bool {
        let bounds = self.visible_rect().expand(cull_margin * self.zoom);
        bounds.contains(start) || bounds.contains(end)
    }

    /// Snapshot of the affine transform a retained renderer applies itself.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform {
            zoom: self.zoom,
            pan_x: self.offset_x,
            pan_y: self.offset_y,
        }
    }
}

fn check_zoom(zoom: f64) -> Result<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(CanvasError::InvalidZoom(zoom))
    }
}

fn check_size(width: f64, height: f64) -> Result<()> {
    if width.is_finite() && height.is_finite() {
        Ok(())
    } else {
        Err(CanvasError::InvalidViewportSize { width, height })
    }
}

/// Canvas-to-viewport affine transform owned by a retained-mode scene.
///
/// Retained visuals are stored in canvas space and the toolkit scales and
/// translates them with this transform, so their coordinates are *not*
/// screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewTransform {
    pub fn to_viewport(&self, canvas: Point) -> Point {
        canvas_to_screen(canvas, self.zoom, self.pan_x, self.pan_y)
    }

    pub fn to_canvas(&self, viewport: Point) -> Point {
        screen_to_canvas(viewport, self.zoom, self.pan_x, self.pan_y)
    }
}
