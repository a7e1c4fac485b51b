use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanvasError>;

/// Errors raised when constructing or updating canvas state.
///
/// Queries never fail: hit tests and geometry lookups degrade to `None`.
/// Only values that would make every later conversion meaningless are
/// rejected, and they are rejected where they enter the system.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("zoom must be finite and greater than zero, got {0}")]
    InvalidZoom(f64),

    #[error("viewport size must be finite, got {width}x{height}")]
    InvalidViewportSize { width: f64, height: f64 },

    #[error("invalid setting `{name}`: {value}")]
    InvalidSetting { name: &'static str, value: f64 },

    #[error("settings document could not be parsed: {0}")]
    Config(#[from] serde_json::Error),
}
