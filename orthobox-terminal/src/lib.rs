/// Terminal front end for the orthobox sandbox
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use orthobox_core::config::WindowConfig;
use orthobox_core::scene::{copy_area, draw_sketch};
use orthobox_core::{
    ButtonState, Config, PointerButton, RenderContext, RenderError, Renderer, Rgba, Scene,
    SceneKind, Sketch, SketchAction, Viewport,
};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::io::{self, stdout, Stdout, Write};
use std::panic;

pub mod logging;
pub mod renderer;

pub use renderer::CellRenderer;

/// Main application struct for the terminal sandbox
pub struct TerminalApp {
    config: Config,
    scene: Scene,
    sketch: Sketch,
    ctx: RenderContext,
    renderer: CellRenderer<Stdout>,
    /// Last pointer position, window pixels from the top-left
    pointer: [i32; 2],
    rng: ThreadRng,
    running: bool,
}

impl TerminalApp {
    pub fn new(config: Config) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let (columns, rows) = fit_window(&config.window, columns, rows);
        let renderer = CellRenderer::new(columns, rows, stdout());
        let (width, height) = renderer.window_size();

        let mut rng = rand::thread_rng();
        let mut scene = Scene::new(config.scene, config.cube_angles());
        scene.pixmap_rgb = rng.gen();

        Ok(Self {
            ctx: config.render_context(width, height),
            scene,
            sketch: Sketch::new(),
            renderer,
            pointer: [0, 0],
            rng,
            running: true,
            config,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        install_panic_hook();
        terminal::enable_raw_mode()?;
        let setup = execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::SetTitle(&self.config.window.title),
            cursor::Hide,
            EnableMouseCapture
        );
        if let Err(err) = setup {
            let _ = restore_terminal(&mut stdout());
            return Err(err);
        }
        log::info!(
            "window \"{}\" requested {}x{} at ({}, {}), using {}x{} pixels",
            self.config.window.title,
            self.config.window.width,
            self.config.window.height,
            self.config.window.x,
            self.config.window.y,
            self.renderer.window_size().0,
            self.renderer.window_size().1,
        );

        let result = self.main_loop();

        // Cleanup
        let restored = restore_terminal(&mut stdout());
        result.and(restored)
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.redraw()?;

        while self.running {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key)?,
                Event::Mouse(mouse) => self.handle_mouse(mouse)?,
                Event::Resize(columns, rows) => {
                    let (columns, rows) = fit_window(&self.config.window, columns, rows);
                    self.renderer.resize(columns, rows);
                    log::debug!("resized to {}x{} cells", columns, rows);
                    self.redraw()?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.running = false;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Tab => {
                let next = SceneKind::ALL
                    .iter()
                    .position(|&kind| kind == self.scene.kind)
                    .map_or(0, |i| (i + 1) % SceneKind::ALL.len());
                self.select_scene(SceneKind::ALL[next])?;
            }
            KeyCode::Insert => self.copy_quadrant()?,
            KeyCode::Char(c) => match SceneKind::from_digit(c) {
                Some(kind) => self.select_scene(kind)?,
                None => self.draw_glyph(c)?,
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        self.pointer = self.renderer.cell_to_screen(mouse.column, mouse.row);

        let (button, state) = match mouse.kind {
            MouseEventKind::Down(button) => (pointer_button(button), ButtonState::Pressed),
            MouseEventKind::Up(button) => (pointer_button(button), ButtonState::Released),
            _ => return Ok(()),
        };

        let window = self.renderer.window_size();
        let action = self
            .sketch
            .handle_pointer(button, state, self.pointer, window, &self.ctx.world);

        let result = match action {
            SketchAction::Extended(_) => {
                // Drawn over the current frame without clearing it
                let color = self.random_color();
                let ctx = self.frame_context().with_color(color);
                draw_sketch(&mut self.renderer, &ctx, &self.sketch)
                    .and_then(|_| self.renderer.flush())
            }
            SketchAction::Cleared => {
                self.renderer.clear(&self.ctx);
                self.renderer.flush()
            }
            SketchAction::Ignored => return Ok(()),
        };
        self.report(result);
        self.draw_status()
    }

    fn select_scene(&mut self, kind: SceneKind) -> io::Result<()> {
        if kind == SceneKind::Pixmap {
            self.scene.pixmap_rgb = self.rng.gen();
        }
        self.scene.kind = kind;
        log::info!("scene: {}", kind);
        self.redraw()
    }

    /// Draw a character at the pointer in a random color
    fn draw_glyph(&mut self, glyph: char) -> io::Result<()> {
        let (width, height) = self.renderer.window_size();
        let [column, row] = self.pointer;
        let [x, y] = self.ctx.world.screen_to_world(column, row, width, height);
        let color = self.random_color();
        let ctx = self.frame_context().with_color(color);
        let position = ctx.raster_position(x, y);

        self.renderer.glyph(&ctx, position, glyph);
        let result = self.renderer.flush();
        self.report(result);
        self.draw_status()
    }

    /// Duplicate the bottom-left quarter of the window onto its center
    fn copy_quadrant(&mut self) -> io::Result<()> {
        let (width, height) = self.renderer.window_size();
        let source = Viewport::new(0, 0, width / 2, height / 2);
        let destination = [(width / 2) as i32, (height / 2) as i32];
        let result = copy_area(&mut self.renderer, source, destination);
        self.report(result);
        self.draw_status()
    }

    fn redraw(&mut self) -> io::Result<()> {
        let ctx = self.frame_context();
        let result = self.scene.render(&mut self.renderer, &ctx, &self.sketch);
        self.report(result);
        self.draw_status()
    }

    fn frame_context(&self) -> RenderContext {
        let (width, height) = self.renderer.window_size();
        self.ctx.with_viewport(Viewport::full(width, height))
    }

    fn random_color(&mut self) -> Rgba {
        [self.rng.gen(), self.rng.gen(), self.rng.gen(), 1.0]
    }

    /// Log a failed frame and keep going
    fn report(&self, result: Result<(), RenderError>) {
        if let Err(err) = result {
            log::error!("render error: {}", err);
        }
    }

    fn draw_status(&mut self) -> io::Result<()> {
        let status = status_line(self.scene.kind, self.sketch.len());
        let writer = self.renderer.writer_mut();
        queue!(
            writer,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;
        writer.flush()
    }
}

/// Leave raw mode and the alternate screen. Both steps run even when one
/// fails; the first error is returned.
pub fn restore_terminal<W: Write>(writer: &mut W) -> io::Result<()> {
    let raw_mode = terminal::disable_raw_mode();
    let screen = execute!(
        writer,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show
    );
    raw_mode.and(screen)
}

/// Restore the terminal before the panic message is printed
fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal(&mut stdout());
        default_hook(info);
    }));
}

/// Terminal area used for drawing: the terminal, capped at the configured window
pub fn fit_window(window: &WindowConfig, columns: u16, rows: u16) -> (u16, u16) {
    let max_columns = window.width.min(u16::MAX as u32) as u16;
    let max_rows = window.height.div_ceil(2).min(u16::MAX as u32) as u16;
    (columns.min(max_columns), rows.min(max_rows))
}

pub fn status_line(kind: SceneKind, points: usize) -> String {
    format!(
        "Orthobox | {} | sketch points: {} | 1-7/Tab=Scene Click=Sketch RightClick=Clear Ins=Copy Q=Quit",
        kind, points
    )
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
    }
}
