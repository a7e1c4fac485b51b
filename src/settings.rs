//! Canvas configuration.
//!
//! [`FlowCanvasSettings`] gathers every size, threshold and toggle the
//! geometry, hit-testing and rendering code reads. Values marked "screen
//! pixels" stay constant on screen at any zoom; everything else is in
//! canvas units.
//!
//! Settings deserialize with `#[serde(default)]`, so a partial JSON
//! document only overrides the fields it names:
//!
//! ```
//! use flow_canvas::FlowCanvasSettings;
//!
//! let settings = FlowCanvasSettings::from_json_str(r#"{ "port_size": 16.0 }"#).unwrap();
//! assert_eq!(settings.port_size, 16.0);
//! assert_eq!(settings.default_node_width, 150.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowCanvasSettings {
    /// Node width when neither the node nor its type supplies one
    pub default_node_width: f64,
    /// Node height when neither the node nor its type supplies one
    pub default_node_height: f64,
    /// Diameter of a drawn port, screen pixels. Ports pick up clicks
    /// within `port_size` of their center, twice the drawn radius.
    pub port_size: f64,
    /// Width of the clickable band around an edge, screen pixels
    pub edge_hit_width: f64,
    /// Diameter of the drag handles on a selected edge's endpoints, screen pixels
    pub endpoint_handle_size: f64,
    /// Extra slack around endpoint handles, screen pixels
    pub endpoint_handle_padding: f64,
    /// Side of the square resize handles, screen pixels
    pub resize_handle_size: f64,
    /// Below this zoom edges and nodes are drawn simplified
    pub lod_zoom_threshold: f64,
    /// Below this zoom port circles are not drawn
    pub port_lod_zoom_threshold: f64,
    pub show_ports: bool,
    pub show_labels: bool,
    /// Smaller on-screen node side under which clicks must land nearer the center
    pub min_clickable_screen_size: f64,
    /// Fraction of the node clickable as its on-screen size approaches zero
    pub min_click_ratio: f64,
    /// Culling slack around the visible rect, scaled by zoom
    pub viewport_cull_margin: f64,
    /// Fraction of the horizontal distance used for bezier control offsets
    pub bezier_curvature: f64,
    /// Lower bound on the bezier control offset
    pub bezier_min_offset: f64,
    pub group_header_height: f64,
    pub collapse_button_size: f64,
    pub group_header_padding: f64,
    pub group_label_gap: f64,
    pub arrow_size: f64,
    pub corner_radius: f64,
    pub grid_spacing: f64,
}

impl Default for FlowCanvasSettings {
    fn default() -> Self {
        Self {
            default_node_width: 150.0,
            default_node_height: 80.0,
            port_size: 12.0,
            edge_hit_width: 10.0,
            endpoint_handle_size: 10.0,
            endpoint_handle_padding: 4.0,
            resize_handle_size: 8.0,
            lod_zoom_threshold: 0.4,
            port_lod_zoom_threshold: 0.6,
            show_ports: true,
            show_labels: true,
            min_clickable_screen_size: 60.0,
            min_click_ratio: 0.4,
            viewport_cull_margin: 100.0,
            bezier_curvature: 0.5,
            bezier_min_offset: 50.0,
            group_header_height: 32.0,
            collapse_button_size: 16.0,
            group_header_padding: 8.0,
            group_label_gap: 6.0,
            arrow_size: 10.0,
            corner_radius: 6.0,
            grid_spacing: 24.0,
        }
    }
}

impl FlowCanvasSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from JSON, filling missing fields with defaults, then validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every size is finite and positive and that ratios are in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("default_node_width", self.default_node_width),
            ("default_node_height", self.default_node_height),
            ("port_size", self.port_size),
            ("edge_hit_width", self.edge_hit_width),
            ("endpoint_handle_size", self.endpoint_handle_size),
            ("resize_handle_size", self.resize_handle_size),
            ("min_clickable_screen_size", self.min_clickable_screen_size),
            ("group_header_height", self.group_header_height),
            ("collapse_button_size", self.collapse_button_size),
            ("arrow_size", self.arrow_size),
            ("grid_spacing", self.grid_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CanvasError::InvalidSetting { name, value });
            }
        }

        let non_negative = [
            ("endpoint_handle_padding", self.endpoint_handle_padding),
            ("lod_zoom_threshold", self.lod_zoom_threshold),
            ("port_lod_zoom_threshold", self.port_lod_zoom_threshold),
            ("viewport_cull_margin", self.viewport_cull_margin),
            ("bezier_curvature", self.bezier_curvature),
            ("bezier_min_offset", self.bezier_min_offset),
            ("group_header_padding", self.group_header_padding),
            ("group_label_gap", self.group_label_gap),
            ("corner_radius", self.corner_radius),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CanvasError::InvalidSetting { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.min_click_ratio) {
            return Err(CanvasError::InvalidSetting {
                name: "min_click_ratio",
                value: self.min_click_ratio,
            });
        }

        Ok(())
    }
}
