use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};

use crate::camera::Viewport;
use crate::math::{apply_lighting, calculate_light_intensity, edge_function, normalize};
use crate::vertex::Vertex;

/// 24-bit pixel color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }
}

/// Software rasterization target with a z-buffer, presented to the terminal
/// as half-block cells (two pixel rows per text row).
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    depth: Vec<f64>,
}

impl Framebuffer {
    pub fn new(viewport: Viewport) -> Self {
        Framebuffer {
            width: viewport.width,
            height: viewport.height,
            pixels: vec![Rgb::BLACK; viewport.width * viewport.height],
            depth: vec![f64::INFINITY; viewport.width * viewport.height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Resets every pixel to `color` and every depth to infinity.
    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color);
        self.depth.fill(f64::INFINITY);
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        self.pixels[y * self.width + x] = color;
    }

    /// Draws a line between two points using Bresenham's algorithm. Portions
    /// outside the buffer are discarded.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        let (mut x0, mut y0, x1, y1) = (
            x0.round() as isize,
            y0.round() as isize,
            x1.round() as isize,
            y1.round() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy

        loop {
            if x0 >= 0 && x0 < self.width as isize && y0 >= 0 && y0 < self.height as isize {
                self.set_pixel(x0 as usize, y0 as usize, color);
            }

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Rasterizes a triangle with per-pixel lighting.
    ///
    /// Fragments are generated only for front-facing windings (all three edge
    /// functions non-negative) and written only when strictly nearer than the
    /// stored depth.
    pub fn draw_triangle(
        &mut self,
        v0: &Vertex,
        v1: &Vertex,
        v2: &Vertex,
        light_pos_world: &[f64; 3],
        base_color: Rgb,
    ) {
        // Compute bounding box of the triangle
        let min_x = v0.screen_position[0]
            .min(v1.screen_position[0])
            .min(v2.screen_position[0])
            .floor()
            .max(0.0) as usize;
        let max_x = v0.screen_position[0]
            .max(v1.screen_position[0])
            .max(v2.screen_position[0])
            .ceil()
            .min(self.width as f64 - 1.0) as usize;
        let min_y = v0.screen_position[1]
            .min(v1.screen_position[1])
            .min(v2.screen_position[1])
            .floor()
            .max(0.0) as usize;
        let max_y = v0.screen_position[1]
            .max(v1.screen_position[1])
            .max(v2.screen_position[1])
            .ceil()
            .min(self.height as f64 - 1.0) as usize;

        // Degenerate triangles produce no fragments
        let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
        if area == 0.0 {
            return;
        }

        // For each pixel in the bounding box
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];

                let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p);
                let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p);
                let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p);

                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    // Inside triangle; normalize barycentric coordinates
                    let w0 = w0 / area;
                    let w1 = w1 / area;
                    let w2 = w2 / area;

                    // Interpolate position
                    let px3d = v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2;
                    let py3d = v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2;
                    let pz3d = v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2;

                    // Depth test
                    let offset = y * self.width + x;
                    if pz3d < self.depth[offset] {
                        self.depth[offset] = pz3d;

                        // Interpolate normal
                        let interpolated_normal = normalize(&[
                            v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2,
                            v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2,
                            v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2,
                        ]);

                        let light_intensity = calculate_light_intensity(
                            &interpolated_normal,
                            &[px3d, py3d, pz3d],
                            light_pos_world,
                        );

                        self.pixels[offset] = apply_lighting(base_color, light_intensity);
                    }
                }
            }
        }
    }

    /// Writes the pixel grid to `out` as upper-half-block cells: the
    /// foreground colors the top pixel of each cell, the background the
    /// bottom one. Color codes are only emitted when they change.
    pub fn present<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        for (row, y) in (0..self.height).step_by(2).enumerate() {
            queue!(out, MoveTo(0, row as u16))?;
            for x in 0..self.width {
                let top = self.pixel(x, y);
                let bottom = if y + 1 < self.height {
                    self.pixel(x, y + 1)
                } else {
                    Rgb::BLACK
                };
                if last_fg != Some(top) {
                    queue!(out, SetForegroundColor(top.into()))?;
                    last_fg = Some(top);
                }
                if last_bg != Some(bottom) {
                    queue!(out, SetBackgroundColor(bottom.into()))?;
                    last_bg = Some(bottom);
                }
                queue!(out, Print('\u{2580}'))?;
            }
        }
        queue!(out, ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> Framebuffer {
        Framebuffer::new(Viewport::new(16, 16))
    }

    fn vertex(x: f64, y: f64, z: f64) -> Vertex {
        Vertex {
            position: [0.0, 0.0, z],
            screen_position: [x, y],
            normal: [0.0, 0.0, -1.0],
        }
    }

    #[test]
    fn clear_resets_pixels() {
        let mut fb = buffer();
        fb.draw_line(0.0, 0.0, 15.0, 0.0, Rgb::WHITE);
        fb.clear(Rgb::BLACK);
        assert_eq!(fb.pixel(5, 0), Rgb::BLACK);
    }

    #[test]
    fn line_sets_its_endpoints() {
        let mut fb = buffer();
        fb.draw_line(1.0, 2.0, 10.0, 12.0, Rgb::WHITE);
        assert_eq!(fb.pixel(1, 2), Rgb::WHITE);
        assert_eq!(fb.pixel(10, 12), Rgb::WHITE);
    }

    #[test]
    fn line_outside_the_buffer_is_clipped() {
        let mut fb = buffer();
        fb.draw_line(-20.0, -5.0, 40.0, 5.0, Rgb::WHITE);
        // Must not panic; pixels inside the buffer along the line are set.
        assert!((0..16).any(|x| (0..16).any(|y| fb.pixel(x, y) == Rgb::WHITE)));
    }

    #[test]
    fn triangle_fills_interior_pixels() {
        let mut fb = buffer();
        let v0 = vertex(1.0, 1.0, 0.0);
        let v1 = vertex(1.0, 14.0, 0.0);
        let v2 = vertex(14.0, 1.0, 0.0);
        fb.draw_triangle(&v0, &v1, &v2, &[0.0, 0.0, -5.0], Rgb::new(200, 200, 200));
        assert_ne!(fb.pixel(4, 4), Rgb::BLACK);
    }

    #[test]
    fn nearer_fragment_wins_the_depth_test() {
        let mut fb = buffer();
        let near = [vertex(1.0, 1.0, -1.0), vertex(1.0, 14.0, -1.0), vertex(14.0, 1.0, -1.0)];
        let far = [vertex(1.0, 1.0, 1.0), vertex(1.0, 14.0, 1.0), vertex(14.0, 1.0, 1.0)];
        fb.draw_triangle(&near[0], &near[1], &near[2], &[0.0, 0.0, -5.0], Rgb::new(255, 0, 0));
        let before = fb.pixel(4, 4);
        fb.draw_triangle(&far[0], &far[1], &far[2], &[0.0, 0.0, -5.0], Rgb::new(0, 0, 255));
        assert_eq!(fb.pixel(4, 4), before);
    }

    #[test]
    fn triangle_partially_outside_is_clipped() {
        let mut fb = buffer();
        let v0 = vertex(-6.0, -6.0, 0.0);
        let v1 = vertex(-6.0, 10.0, 0.0);
        let v2 = vertex(10.0, -6.0, 0.0);
        fb.draw_triangle(&v0, &v1, &v2, &[0.0, 0.0, -5.0], Rgb::WHITE);
        // The in-bounds corner of the triangle is filled.
        assert_eq!(fb.pixel(0, 0), Rgb::WHITE);
        assert_eq!(fb.pixel(2, 0), Rgb::WHITE);
        // Pixels past the hypotenuse (x + y > 4) stay untouched.
        assert_eq!(fb.pixel(10, 10), Rgb::BLACK);
    }

    #[test]
    fn triangle_fully_outside_draws_nothing() {
        let mut fb = buffer();
        // One triangle past the top-left corner, one past the bottom-right.
        let above = [
            vertex(-12.0, -12.0, 0.0),
            vertex(-12.0, -2.0, 0.0),
            vertex(-2.0, -12.0, 0.0),
        ];
        let below = [
            vertex(20.0, 20.0, 0.0),
            vertex(20.0, 30.0, 0.0),
            vertex(30.0, 20.0, 0.0),
        ];
        fb.draw_triangle(&above[0], &above[1], &above[2], &[0.0, 0.0, -5.0], Rgb::WHITE);
        fb.draw_triangle(&below[0], &below[1], &below[2], &[0.0, 0.0, -5.0], Rgb::WHITE);
        assert!((0..16).all(|x| (0..16).all(|y| fb.pixel(x, y) == Rgb::BLACK)));
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let mut fb = buffer();
        let v0 = vertex(2.0, 2.0, 0.0);
        let v1 = vertex(8.0, 8.0, 0.0);
        let v2 = vertex(5.0, 5.0, 0.0);
        fb.draw_triangle(&v0, &v1, &v2, &[0.0, 0.0, -5.0], Rgb::WHITE);
        assert!((0..16).all(|x| (0..16).all(|y| fb.pixel(x, y) == Rgb::BLACK)));
    }

    #[test]
    fn present_emits_half_block_cells() {
        let fb = buffer();
        let mut out: Vec<u8> = Vec::new();
        fb.present(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\u{2580}').count(), 16 * 8);
    }
}
