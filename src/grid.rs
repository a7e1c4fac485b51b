use std::fmt::Write;

use crate::transform::Viewport;

/// On-screen spacing below which the grid is not drawn at all.
pub const MIN_GRID_SCREEN_SPACING: f64 = 4.0;

/// Background grid as screen-space path commands.
///
/// `spacing` is in canvas units and scales with `zoom`; the pattern repeats
/// every `spacing * zoom` pixels so panning only shifts its phase. Lines
/// cover a `width` x `height` screen area, one cell past each edge.
///
/// Returns an empty string when lines would sit closer than
/// [`MIN_GRID_SCREEN_SPACING`] pixels, or when the area is not finite.
pub fn generate_grid_commands(
    width: f64,
    height: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    spacing: f64,
) -> String {
    let step = spacing * zoom;
    if step.is_nan() || step < MIN_GRID_SCREEN_SPACING {
        return String::new();
    }
    if !width.is_finite() || !height.is_finite() {
        return String::new();
    }

    let columns = (width / step).ceil() as usize + 1;
    let rows = (height / step).ceil() as usize + 1;
    let mut commands = String::with_capacity((columns + rows) * 24);

    let mut x = pan_x.rem_euclid(step);
    while x < width + step {
        if !commands.is_empty() {
            commands.push(' ');
        }
        let _ = write!(commands, "M {} 0 L {} {}", x, x, height);
        x += step;
    }

    let mut y = pan_y.rem_euclid(step);
    while y < height + step {
        commands.push(' ');
        let _ = write!(commands, "M 0 {} L {} {}", y, width, y);
        y += step;
    }

    commands
}

/// Grid for the current viewport.
pub fn grid_for_viewport(viewport: &Viewport, spacing: f64) -> String {
    let (width, height) = viewport.size();
    let (pan_x, pan_y) = viewport.offset();
    generate_grid_commands(width, height, viewport.zoom(), pan_x, pan_y, spacing)
}
