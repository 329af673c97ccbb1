/// Example: render the transformed cube once and list its vertices
///
/// Usage: cargo run --example dump_cube -- [angle-y-degrees] [angle-x-degrees]

use crossterm::{cursor, execute, terminal};
use orthobox_core::{
    transform_cube, Config, CubeModel, Renderer, Scene, SceneKind, Sketch, WorldWindow,
};
use orthobox_terminal::CellRenderer;
use std::env;
use std::io::{self, stdout};

const COLUMNS: u16 = 64;
const ROWS: u16 = 32;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let angle = |i: usize| match args.get(i) {
        Some(arg) => arg.parse::<f64>().unwrap_or(45.0),
        None => 45.0,
    };
    let (angle_y, angle_x) = (angle(1).to_radians(), angle(2).to_radians());

    execute!(stdout(), terminal::Clear(terminal::ClearType::All))?;

    let mut renderer = CellRenderer::new(COLUMNS, ROWS, stdout());
    let (width, height) = renderer.window_size();
    let mut ctx = Config::default().render_context(width, height);
    // Zoom in so the unit cube fills the frame
    ctx.world = WorldWindow::new(-0.5, 2.0, -1.0, 1.5);

    Scene::new(SceneKind::Cube, (angle_y, angle_x))
        .render(&mut renderer, &ctx, &Sketch::new())
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    execute!(stdout(), cursor::MoveTo(0, ROWS))?;
    let cube = transform_cube(&CubeModel::colored(), angle_y, angle_x);
    for (i, v) in cube.vertices.iter().enumerate() {
        println!("{i}: ({:>8.4}, {:>8.4}, {:>8.4})", v.x, v.y, v.z);
    }
    println!("faces: {:?}", cube.faces);
    Ok(())
}
