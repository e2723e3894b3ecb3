use crate::error::AppError;

/// Pixel dimensions of the render target.
///
/// Detected once at startup; the demo does not track terminal resizes. Each
/// terminal cell holds a 1x2 column of pixels (half-block rendering), so the
/// pixel height is twice the terminal row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Viewport { width, height }
    }

    /// Detects the viewport from the terminal, honoring CLI overrides.
    ///
    /// `termsize` is asked first, then crossterm. Fails only when neither
    /// reports a size and no full override was given.
    pub fn detect(width: Option<usize>, height: Option<usize>) -> Result<Self, AppError> {
        if let (Some(w), Some(h)) = (width, height) {
            return Ok(Viewport::new(w, h));
        }
        let (cols, rows) = match termsize::get() {
            Some(size) => (size.cols as usize, size.rows as usize),
            None => {
                let (cols, rows) =
                    crossterm::terminal::size().map_err(|_| AppError::ViewportDetection)?;
                (cols as usize, rows as usize)
            }
        };
        Ok(Viewport::new(
            width.unwrap_or(cols),
            height.unwrap_or(rows * 2),
        ))
    }
}

/// Weak-perspective camera: model-space positions are scaled and centered on
/// the viewport.
pub struct Camera {
    pub viewport: Viewport,
    pub zoom: f64,
}

impl Camera {
    pub fn new(viewport: Viewport, zoom: f64) -> Self {
        Camera { viewport, zoom }
    }

    fn scale(&self) -> f64 {
        (self.viewport.width.min(self.viewport.height) as f64 / 4.0) * self.zoom
    }

    /// Projects a world position onto the viewport.
    pub fn project(&self, position: &[f64; 3]) -> [f64; 2] {
        let scale = self.scale();
        [
            position[0] * scale + self.viewport.width as f64 / 2.0,
            position[1] * scale + self.viewport.height as f64 / 2.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn origin_projects_to_viewport_center() {
        let camera = Camera::new(Viewport::new(80, 48), 1.0);
        let projected = camera.project(&[0.0, 0.0, 0.0]);
        assert_relative_eq!(projected[0], 40.0);
        assert_relative_eq!(projected[1], 24.0);
    }

    #[test]
    fn zoom_scales_distance_from_center() {
        let viewport = Viewport::new(100, 100);
        let near = Camera::new(viewport, 1.0).project(&[1.0, 0.0, 0.0]);
        let far = Camera::new(viewport, 2.0).project(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(far[0] - 50.0, (near[0] - 50.0) * 2.0);
    }

    #[test]
    fn scale_uses_smaller_viewport_dimension() {
        let camera = Camera::new(Viewport::new(200, 40), 1.0);
        // min(200, 40) / 4 = 10, so x = 1 lands 10 pixels right of center.
        let projected = camera.project(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(projected[0], 110.0);
    }

    #[test]
    fn full_override_skips_terminal_detection() {
        let viewport = Viewport::detect(Some(120), Some(90)).unwrap();
        assert_eq!(viewport, Viewport::new(120, 90));
    }
}
