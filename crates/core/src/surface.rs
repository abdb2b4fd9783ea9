//! The drawing surface the renderer issues paths to.
//!
//! Hosts implement [`Surface`] over whatever they draw on: a browser canvas,
//! a CPU pixel buffer. The command set mirrors a 2-D canvas context.

use crate::color::Srgb;

/// Stroke parameters for one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Srgb,
    /// Alpha in [0, 1].
    pub opacity: f64,
    pub width: f64,
}

impl StrokeStyle {
    /// CSS color string for canvas `strokeStyle`.
    pub fn css(&self) -> String {
        self.color.to_css_rgba(self.opacity)
    }
}

/// A 2-D drawing target sized to the visible area.
pub trait Surface {
    /// Visible size in surface units.
    fn size(&self) -> (f64, f64);

    /// Whether the surface can be drawn on at all. A loop built over an
    /// invalid surface never starts.
    fn is_valid(&self) -> bool {
        let (w, h) = self.size();
        w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0
    }

    /// Erases the whole surface.
    fn clear(&mut self);

    /// Starts a new, empty path.
    fn begin_path(&mut self);

    /// Starts a new subpath at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);

    /// Extends the current subpath to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64);

    /// Strokes every subpath of the current path.
    fn stroke(&mut self, style: &StrokeStyle);
}
