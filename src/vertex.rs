/// Transformed vertex ready for rasterization: world position, projected
/// screen position, and unit normal.
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    pub normal: [f64; 3],
}
