//! Level-of-detail decision.
//!
//! [`LevelOfDetail::for_zoom`] is a pure function of the zoom and two
//! thresholds from the settings. It carries no state between frames, so the
//! same zoom always yields the same decision.

use crate::settings::FlowCanvasSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOfDetail {
    /// Straight edges, no curve evaluation
    pub simplify_edges: bool,
    /// Plain rectangles: no rounded corners, no custom per-type drawing
    pub simplify_nodes: bool,
    pub show_ports: bool,
    pub show_labels: bool,
    pub show_arrows: bool,
}

impl LevelOfDetail {
    pub fn for_zoom(zoom: f64, settings: &FlowCanvasSettings) -> Self {
        let simplified = zoom < settings.lod_zoom_threshold;
        Self {
            simplify_edges: simplified,
            simplify_nodes: simplified,
            show_ports: settings.show_ports && zoom >= settings.port_lod_zoom_threshold,
            show_labels: settings.show_labels && !simplified,
            show_arrows: !simplified,
        }
    }

    /// Everything drawn at full detail.
    pub fn full() -> Self {
        Self {
            simplify_edges: false,
            simplify_nodes: false,
            show_ports: true,
            show_labels: true,
            show_arrows: true,
        }
    }
}
