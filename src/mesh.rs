use crate::framebuffer::Rgb;

/// Basic material: a flat color, drawn either as edges or as lit faces.
#[derive(Clone, Copy)]
pub struct Material {
    pub color: Rgb,
    pub wireframe: bool,
}

/// An indexed triangle-quad mesh.
///
/// Faces are quads split into two triangles at rasterization time. Each face
/// has a flat base color for the solid path; the material color is used for
/// the wireframe path.
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub edges: Vec<(usize, usize)>,
    pub faces: Vec<(usize, usize, usize, usize)>,
    pub face_colors: Vec<Rgb>,
    pub material: Material,
}

impl Mesh {
    /// A unit cube centered on the origin, side length 2.
    pub fn cube(material: Material) -> Self {
        let vertices = vec![
            [-1.0, -1.0, -1.0], // 0
            [1.0, -1.0, -1.0],  // 1
            [1.0, 1.0, -1.0],   // 2
            [-1.0, 1.0, -1.0],  // 3
            [-1.0, -1.0, 1.0],  // 4
            [1.0, -1.0, 1.0],   // 5
            [1.0, 1.0, 1.0],    // 6
            [-1.0, 1.0, 1.0],   // 7
        ];

        let edges = vec![
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0), // Front face
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4), // Back face
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7), // Connecting edges
        ];

        let faces = vec![
            (0, 1, 2, 3),
            (5, 4, 7, 6),
            (4, 0, 3, 7),
            (1, 5, 6, 2),
            (4, 5, 1, 0),
            (3, 2, 6, 7),
        ];

        let face_colors = vec![
            Rgb::new(255, 0, 0),   // Red
            Rgb::new(0, 255, 0),   // Green
            Rgb::new(0, 0, 255),   // Blue
            Rgb::new(255, 255, 0), // Yellow
            Rgb::new(255, 0, 255), // Magenta
            Rgb::new(0, 255, 255), // Cyan
        ];

        Mesh {
            vertices,
            edges,
            faces,
            face_colors,
            material,
        }
    }
}
