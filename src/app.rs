use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{Color, Print, SetBackgroundColor, SetForegroundColor};

use crate::camera::Camera;
use crate::error::AppError;
use crate::framebuffer::{Framebuffer, Rgb};
use crate::math::{
    calculate_normal, multiply_matrices, multiply_matrix_vector, normalize, rotation_x, rotation_y,
};
use crate::mesh::Mesh;
use crate::scene::Scene;
use crate::state::AppState;
use crate::vertex::Vertex;

/// The per-frame render loop: advance the animation, rasterize the scene,
/// present it, and pace toward the target frame rate.
pub struct App {
    camera: Camera,
    scene: Scene,
    framebuffer: Framebuffer,
    state: AppState,
    target_frame: Duration,
    debug: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl App {
    pub fn new(camera: Camera, scene: Scene, state: AppState, target_fps: u32, debug: bool) -> Self {
        let framebuffer = Framebuffer::new(camera.viewport);
        App {
            camera,
            scene,
            framebuffer,
            state,
            target_frame: Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))),
            debug,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    /// Runs until a quit key is seen or presenting a frame fails.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), AppError> {
        loop {
            let frame_start = Instant::now();

            self.state.update();
            self.render();
            self.framebuffer.present(out)?;
            if self.debug {
                self.draw_status(out)?;
            }
            out.flush()?;
            self.track_fps();

            // Spend the rest of the frame budget waiting for a quit key.
            let timeout = self.target_frame.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if is_quit(&key) {
                        log::debug!("quit requested");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Rasterizes the scene into the framebuffer.
    fn render(&mut self) {
        self.framebuffer.clear(Rgb::BLACK);
        for mesh in &self.scene.meshes {
            let vertices = transform_mesh(&self.camera, &self.state, mesh);
            if mesh.material.wireframe {
                for &(start, end) in &mesh.edges {
                    let v0 = &vertices[start];
                    let v1 = &vertices[end];
                    self.framebuffer.draw_line(
                        v0.screen_position[0],
                        v0.screen_position[1],
                        v1.screen_position[0],
                        v1.screen_position[1],
                        mesh.material.color,
                    );
                }
            } else {
                for (face_index, &(a, b, c, d)) in mesh.faces.iter().enumerate() {
                    let color = mesh.face_colors[face_index];
                    self.framebuffer.draw_triangle(
                        &vertices[a],
                        &vertices[b],
                        &vertices[c],
                        &self.scene.light_position,
                        color,
                    );
                    self.framebuffer.draw_triangle(
                        &vertices[a],
                        &vertices[c],
                        &vertices[d],
                        &self.scene.light_position,
                        color,
                    );
                }
            }
        }
    }

    fn track_fps(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    fn draw_status<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let status = format!(
            "{} {} | {:.1} fps | angle x {:.2} y {:.2}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.fps,
            self.state.angle_x,
            self.state.angle_y,
        );
        queue!(
            out,
            MoveTo(0, 0),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Black),
            Print(status),
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

/// Rotates a mesh by the current animation angles, computes smoothed vertex
/// normals, and projects everything onto the viewport.
fn transform_mesh(camera: &Camera, state: &AppState, mesh: &Mesh) -> Vec<Vertex> {
    let rotation = multiply_matrices(&rotation_y(state.angle_y), &rotation_x(state.angle_x));

    let transformed: Vec<[f64; 3]> = mesh
        .vertices
        .iter()
        .map(|vertex| multiply_matrix_vector(&rotation, vertex))
        .collect();

    // Vertex normals are the normalized sum of adjacent face normals.
    let mut vertex_normals = vec![[0.0; 3]; transformed.len()];
    for &(a, b, c, d) in &mesh.faces {
        let normal = calculate_normal(&transformed[a], &transformed[b], &transformed[c]);
        for &index in &[a, b, c, d] {
            vertex_normals[index][0] += normal[0];
            vertex_normals[index][1] += normal[1];
            vertex_normals[index][2] += normal[2];
        }
    }

    transformed
        .iter()
        .zip(vertex_normals.iter())
        .map(|(&position, normal)| Vertex {
            position,
            screen_position: camera.project(&position),
            normal: normalize(normal),
        })
        .collect()
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::mesh::Material;
    use approx::assert_relative_eq;

    fn test_app(wireframe: bool) -> App {
        let camera = Camera::new(Viewport::new(40, 40), 1.0);
        let mut scene = Scene::new();
        scene.add(Mesh::cube(Material {
            color: Rgb::new(0, 255, 0),
            wireframe,
        }));
        App::new(camera, scene, AppState::new(0.01, 0.02), 60, false)
    }

    #[test]
    fn unrotated_cube_projects_symmetrically_around_center() {
        let camera = Camera::new(Viewport::new(40, 40), 1.0);
        let mesh = Mesh::cube(Material {
            color: Rgb::WHITE,
            wireframe: true,
        });
        let state = AppState::new(0.01, 0.02);
        let vertices = transform_mesh(&camera, &state, &mesh);

        // scale = 40 / 4 = 10, center = (20, 20)
        assert_relative_eq!(vertices[0].screen_position[0], 10.0);
        assert_relative_eq!(vertices[0].screen_position[1], 10.0);
        assert_relative_eq!(vertices[6].screen_position[0], 30.0);
        assert_relative_eq!(vertices[6].screen_position[1], 30.0);
    }

    #[test]
    fn transformed_vertices_carry_unit_normals() {
        let camera = Camera::new(Viewport::new(40, 40), 1.0);
        let mesh = Mesh::cube(Material {
            color: Rgb::WHITE,
            wireframe: false,
        });
        let mut state = AppState::new(0.01, 0.02);
        state.update();
        for vertex in transform_mesh(&camera, &state, &mesh) {
            let n = vertex.normal;
            let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_relative_eq!(length, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn wireframe_render_marks_pixels() {
        let mut app = test_app(true);
        app.render();
        let fb = app.framebuffer();
        let lit = (0..fb.width())
            .flat_map(|x| (0..fb.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) != Rgb::BLACK)
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn solid_render_marks_pixels() {
        let mut app = test_app(false);
        app.state.update();
        app.render();
        let fb = app.framebuffer();
        let lit = (0..fb.width())
            .flat_map(|x| (0..fb.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) != Rgb::BLACK)
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn quit_keys_are_recognized() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(is_quit(&press(KeyCode::Char('q'))));
        assert!(is_quit(&press(KeyCode::Esc)));
        assert!(is_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit(&press(KeyCode::Char('x'))));
    }
}
