//! The opaque drawing-surface capability.

use sketchwire_core::{Point, Rgba};

/// Dimensions of the drawing surface, in surface-local units.
///
/// The value recorded immediately before a resize is what scale factors
/// are computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDimensions {
    pub width: f64,
    pub height: f64,
}

impl SurfaceDimensions {
    /// Default surface size used when no layout has been observed yet.
    pub const DEFAULT: Self = Self::new(800.0, 600.0);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A surface with a zero or negative extent cannot anchor scale
    /// factors; such dimensions are treated as absent.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for SurfaceDimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A surface that can paint the three stroke primitives.
///
/// Implementations may be pixel buffers, GPU scenes, or test recorders;
/// the replay engine neither knows nor cares. Coordinates arrive already
/// scaled.
pub trait DrawSurface {
    /// Paint a line segment of the given width.
    fn draw_line(&mut self, from: Point, to: Point, color: Rgba, width: f64);

    /// Paint an axis-aligned rectangle outline between two corners
    /// (in any corner order).
    fn draw_rect(&mut self, a: Point, b: Point, color: Rgba, width: f64);

    /// Paint a circle outline.
    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64);

    /// Reset the surface to blank.
    fn clear(&mut self);

    /// Flood the surface with a solid color.
    fn fill(&mut self, color: Rgba);
}
