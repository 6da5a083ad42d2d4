/// gfx3d terminal demo: a cube, a cylinder and an orbit ring
///
/// Controls:
///   - WASD / Arrow Keys: Rotate the camera
///   - E/R: Roll rotation
///   - B: Toggle z-order / BSP scheduling
///   - I: Toggle conservative / incremental drawing
///   - Q/ESC: Quit
///
/// Flags: `--bsp`, `--incremental`, `--still`, `--samples N`.
/// Set `RUST_LOG=debug` (with stderr redirected) to trace frames.
use gfx3d_terminal::{AppOptions, TerminalApp};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options = AppOptions::from_args(std::env::args().skip(1))?;
    log::info!("starting with {:?}", options.config);

    let mut app = TerminalApp::new(options)?;
    app.run()
}
