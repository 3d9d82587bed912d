//! 2D rendering
//!
//! The scene is drawn in playfield coordinates onto any `Surface`. The
//! browser backend wraps a Canvas 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{FloatingNumbers, draw_scene};

use glam::Vec2;

/// Linear RGBA, 0-1 per channel
pub type Color = [f32; 4];

/// CSS `rgba()` string for a color
pub fn css(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({},{},{},{:.3})",
        (r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        a.clamp(0.0, 1.0)
    )
}

/// A 2D drawing target
pub trait Surface {
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    /// Centered text
    fn text(&mut self, pos: Vec2, text: &str, size_px: f32, color: Color);
}
