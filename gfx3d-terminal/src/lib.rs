/// Terminal front-end: drives a gfx3d viewport and rasterizes it as ASCII
use anyhow::{bail, Context};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal,
};
use gfx3d_core::{
    Ambient, Color, CubeDescriptor, CylinderDescriptor, Drawer, Error, Finish, Light, Material,
    Matrix3D, OrbitDescriptor, Scheduler, Viewport, ViewportConfig,
};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod rotation;

pub use renderer::AsciiRenderer;
pub use rotation::RotationState;

/// Command-line options of the demo.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppOptions {
    pub config: ViewportConfig,
    /// Disables the automatic spin; the scene only turns on key presses.
    pub still: bool,
}

impl AppOptions {
    /// Parses `--bsp`, `--incremental`, `--still` and `--samples N`.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bsp" => options.config = options.config.with_scheduler(Scheduler::Bsp),
                "--incremental" => options.config = options.config.with_drawer(Drawer::Incremental),
                "--still" => options.still = true,
                "--samples" => {
                    let value = args.next().context("--samples needs a value")?;
                    let samples: usize = value
                        .parse()
                        .with_context(|| format!("invalid sample count {value:?}"))?;
                    options.config = options.config.with_gradient_samples(samples);
                }
                other => bail!("unknown argument {other:?}"),
            }
        }
        Ok(options)
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewport: Viewport<AsciiRenderer>,
    rotation: RotationState,
    still: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f64,
}

impl TerminalApp {
    pub fn new(options: AppOptions) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        let config = options.config.with_size(u32::from(width), u32::from(height));
        let renderer = AsciiRenderer::new(usize::from(width), usize::from(height));
        let mut viewport = Viewport::with_config(renderer, config);
        build_demo_scene(&mut viewport)?;

        let mut app = Self {
            viewport,
            rotation: RotationState::new(0.4, 0.6, 0.0),
            still: options.still,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.update_camera();
        Ok(app)
    }

    pub fn viewport(&self) -> &Viewport<AsciiRenderer> {
        &self.viewport
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            if !self.still {
                self.rotation.rotate(0.01, 0.015, 0.0);
                self.update_camera();
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = f64::from(self.frame_count) / (now - self.last_frame).as_secs_f64();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Resize(width, height) => {
                debug!("terminal resized to {width}x{height}");
                self.viewport
                    .surface_mut()
                    .resize(usize::from(width), usize::from(height));
                self.viewport.set_dimensions(u32::from(width), u32::from(height));
                self.update_camera();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(0.1, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-0.1, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -0.1, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, 0.1, 0.0),
            KeyCode::Char('e') => self.rotation.rotate(0.0, 0.0, 0.1),
            KeyCode::Char('r') => self.rotation.rotate(0.0, 0.0, -0.1),
            KeyCode::Char('b') => {
                let scheduler = self.viewport.config().scheduler.toggled();
                info!("switching to {scheduler:?} scheduling");
                self.viewport.set_scheduler(scheduler);
            }
            KeyCode::Char('i') => {
                let drawer = self.viewport.config().drawer.toggled();
                info!("switching to {drawer:?} drawer");
                self.viewport.set_drawer(drawer);
            }
            _ => return,
        }
        self.update_camera();
    }

    fn update_camera(&mut self) {
        let config = self.viewport.config();
        let (width, height) = (f64::from(config.width), f64::from(config.height));
        // Terminal cells are about twice as tall as they are wide
        let scale = width.min(2.0 * height) / 400.0;
        let camera = Matrix3D::multiply(&[
            Matrix3D::translate(width / 2.0, height / 2.0, 0.0),
            Matrix3D::scale(scale, 0.5 * scale, scale),
            self.rotation.matrix(),
        ]);
        self.viewport.set_camera_transform(camera);
    }

    /// Runs a viewport frame, dropping back to depth sorting when the
    /// partition tree cannot place the current faces.
    fn render_frame(&mut self) -> anyhow::Result<()> {
        match self.viewport.render() {
            Err(err @ (Error::InvalidGeometry { .. } | Error::MissingOutline)) => {
                warn!("BSP scheduling failed ({err}), falling back to z-order");
                self.viewport.set_scheduler(Scheduler::ZOrder);
                self.viewport.render()?;
            }
            other => other?,
        }
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.render_frame()?;
        let renderer = self.viewport.surface_mut();
        renderer.rasterize();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.viewport.surface().draw(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(TermColor::Yellow),
            Print(format!(
                "gfx3d | FPS: {:.1} | {:?}/{:?} | WASD=Rotate E/R=Roll B/I=Strategy Q=Quit",
                self.fps,
                self.viewport.config().scheduler,
                self.viewport.config().drawer,
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Populates `viewport` with a cube, a cylinder standing next to it and an
/// orbit ring around both, lit from the upper left.
pub fn build_demo_scene<S: gfx3d_core::Surface>(viewport: &mut Viewport<S>) -> anyhow::Result<()> {
    let cube = viewport.create_cube(CubeDescriptor::new(
        Point3::new(-120.0, -50.0, -50.0),
        Point3::new(-20.0, 50.0, 50.0),
    ));
    viewport
        .object_mut(cube)?
        .set_fill(Material::new(Finish::Matte, Color::CYAN));

    let cylinder = viewport.create_cylinder(CylinderDescriptor::new(
        Point3::new(80.0, -60.0, 0.0),
        40.0,
        120.0,
    ))?;
    viewport
        .object_mut(cylinder)?
        .set_fill(Material::new(Finish::Plastic, Color::YELLOW))
        .set_transform(Matrix3D::rotate_x_deg(-90.0));

    let orbit = viewport.create_orbit(OrbitDescriptor::new(Point3::origin(), 170.0))?;
    viewport
        .object_mut(orbit)?
        .clear_fill()
        .set_stroke(Some(gfx3d_core::Stroke::new(Color::MAGENTA)));

    viewport.set_lights(
        vec![
            Light::new(Vector3::new(1.0, -1.0, 1.0), Color::WHITE),
            Light::new(Vector3::new(-1.0, 0.0, 1.0), Color::WHITE).with_intensity(0.3),
        ],
        Ambient {
            color: Color::WHITE,
            intensity: 0.4,
        },
        Color::WHITE,
    );
    debug!("demo scene ready with {} objects", viewport.len());
    Ok(())
}
