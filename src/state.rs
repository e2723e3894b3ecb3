/// Animation state: the cube's two rotation angles and their fixed per-frame
/// increments.
pub struct AppState {
    /// Current rotation angle around the X-axis
    pub angle_x: f64,
    /// Current rotation angle around the Y-axis
    pub angle_y: f64,
    speed_x: f64,
    speed_y: f64,
}

impl AppState {
    pub fn new(speed_x: f64, speed_y: f64) -> Self {
        AppState {
            angle_x: 0.0,
            angle_y: 0.0,
            speed_x,
            speed_y,
        }
    }

    /// Advances both angles by their fixed increments. Angles grow without
    /// bound; the rotation matrices are periodic anyway.
    pub fn update(&mut self) {
        self.angle_x += self.speed_x;
        self.angle_y += self.speed_y;
    }
}
