mod app;
mod camera;
mod error;
mod framebuffer;
mod math;
mod mesh;
mod scene;
mod state;
mod vertex;

use std::io::{self, Write};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};

use crate::app::App;
use crate::camera::{Camera, Viewport};
use crate::error::AppError;
use crate::framebuffer::Rgb;
use crate::mesh::{Material, Mesh};
use crate::scene::Scene;
use crate::state::AppState;

/// A terminal-based spinning 3D cube demo
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Render filled, lit faces instead of wireframe edges
    #[arg(long)]
    solid: bool,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Per-frame X rotation increment in radians
    #[arg(long, default_value_t = 0.01)]
    speed_x: f64,

    /// Per-frame Y rotation increment in radians
    #[arg(long, default_value_t = 0.02)]
    speed_y: f64,

    /// Zoom factor applied to the projection
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Viewport width in pixels (defaults to the terminal column count)
    #[arg(long)]
    width: Option<usize>,

    /// Viewport height in pixels (defaults to twice the terminal row count)
    #[arg(long)]
    height: Option<usize>,

    /// Show an FPS and rotation status line
    #[arg(long)]
    debug: bool,
}

/// Puts the terminal into raw mode on an alternate screen with the cursor
/// hidden, and restores it on drop so every exit path leaves a usable shell.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = Args::parse();

    let viewport = Viewport::detect(args.width, args.height)?;
    log::info!("viewport {}x{} pixels", viewport.width, viewport.height);

    let mut scene = Scene::new();
    scene.add(Mesh::cube(Material {
        color: Rgb::new(0, 255, 0),
        wireframe: !args.solid,
    }));

    let camera = Camera::new(viewport, args.zoom);
    let state = AppState::new(args.speed_x, args.speed_y);
    let mut app = App::new(camera, scene, state, args.fps, args.debug);

    let guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();
    let result = app.run(&mut stdout);
    stdout.flush()?;
    drop(guard);

    log::info!("exiting");
    result
}
