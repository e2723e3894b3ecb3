use crate::mesh::Mesh;

/// Scene root: the meshes to draw and a single point light.
pub struct Scene {
    pub meshes: Vec<Mesh>,
    /// Light position in world space
    pub light_position: [f64; 3],
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            meshes: Vec::new(),
            light_position: [2.0, 2.0, -5.0],
        }
    }

    /// Adds a mesh to the scene. Meshes are drawn in insertion order; depth
    /// ordering is resolved by the z-buffer, not by this list.
    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
