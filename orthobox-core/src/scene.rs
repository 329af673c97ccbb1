/// The hand-authored figures of the sandbox
use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::draw::{
    rgb_u8, submit_indexed_quads, DrawBatch, Primitive, RenderContext, RenderError, Renderer, Rgba,
};
use crate::geometry::CubeModel;
use crate::input::Sketch;
use crate::projection::Viewport;
use crate::raster::{arrow_bitmap, Bitmap, Pixmap};
use crate::transform::transform_cube;

const LINE_GREEN: Rgba = [0.0, 0.4, 0.2, 0.8];

pub const PIXMAP_SIZE: u32 = 128;

/// Which figure a redraw produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Lines,
    QuadStrip,
    Hexagon,
    Cube,
    Bitmap,
    Pixmap,
    Sketch,
}

impl SceneKind {
    pub const ALL: [SceneKind; 7] = [
        SceneKind::Lines,
        SceneKind::QuadStrip,
        SceneKind::Hexagon,
        SceneKind::Cube,
        SceneKind::Bitmap,
        SceneKind::Pixmap,
        SceneKind::Sketch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Lines => "lines",
            SceneKind::QuadStrip => "quad-strip",
            SceneKind::Hexagon => "hexagon",
            SceneKind::Cube => "cube",
            SceneKind::Bitmap => "bitmap",
            SceneKind::Pixmap => "pixmap",
            SceneKind::Sketch => "sketch",
        }
    }

    /// Scene bound to the digit keys `1`..`7`
    pub fn from_digit(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScene(pub String);

impl fmt::Display for UnknownScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scene `{}`", self.0)
    }
}

impl std::error::Error for UnknownScene {}

impl FromStr for SceneKind {
    type Err = UnknownScene;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact = s.trim().to_ascii_lowercase().replace(['_', '-'], "");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().replace('-', "") == compact)
            .ok_or_else(|| UnknownScene(s.to_string()))
    }
}

/// A scene and the parameters its figures need
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub kind: SceneKind,
    /// Cube rotation (about Y, about X) in radians
    pub cube_angles: (f64, f64),
    pub pixmap_rgb: [u8; 3],
}

impl Scene {
    pub fn new(kind: SceneKind, cube_angles: (f64, f64)) -> Self {
        Self {
            kind,
            cube_angles,
            pixmap_rgb: [128, 128, 128],
        }
    }

    /// Clear, draw the selected figure over the whole window and flush
    pub fn render<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        ctx: &RenderContext,
        sketch: &Sketch,
    ) -> Result<(), RenderError> {
        let (width, height) = renderer.window_size();
        let ctx = ctx.with_viewport(Viewport::full(width, height));
        log::debug!("rendering {} scene at {}x{}", self.kind, width, height);

        renderer.clear(&ctx);
        match self.kind {
            SceneKind::Lines => draw_lines(renderer, &ctx)?,
            SceneKind::QuadStrip => draw_quad_strip(renderer, &ctx)?,
            SceneKind::Hexagon => draw_hexagon(renderer, &ctx)?,
            SceneKind::Cube => draw_cube(renderer, &ctx, self.cube_angles)?,
            SceneKind::Bitmap => draw_arrows(renderer, &ctx),
            SceneKind::Pixmap => draw_pixmap(renderer, &ctx, self.pixmap_rgb),
            SceneKind::Sketch => draw_sketch(renderer, &ctx, sketch)?,
        }
        renderer.flush()
    }
}

/// Three lines through the origin with per-vertex colors
pub fn draw_lines<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let slate = rgb_u8(82, 109, 133);
    let plum = rgb_u8(78, 68, 102);

    let mut batch = DrawBatch::begin(renderer, ctx, Primitive::Lines);
    batch
        .color(LINE_GREEN)
        .vertex2(-1.0, -1.0)
        .vertex2(1.0, 1.0)
        .color(slate)
        .vertex2(-1.0, 0.0)
        .color(plum)
        .vertex2(1.0, 0.0)
        .vertex2(-1.0, 1.0)
        .color(LINE_GREEN)
        .vertex2(1.0, -1.0);
    batch.end()
}

/// Quad strip approximating a hexagonal band
pub fn draw_quad_strip<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    // Side length of an equilateral triangle of height 2
    let side = 2.0 / 3f32.sqrt();

    let mut batch = DrawBatch::begin(renderer, ctx, Primitive::QuadStrip);
    batch
        .vertex2(-2.0, 0.0)
        .vertex2(-2.0 + side, -2.0)
        .vertex2(0.0, -2.5)
        .vertex2(-2.0 + 3.0 * side, -2.0)
        .vertex2(-2.0 + 4.0 * side, 0.0)
        .vertex2(-2.0 + 3.0 * side, 2.0)
        .vertex2(0.0, 2.3)
        .vertex2(-2.0 + side, 2.0);
    batch.end()
}

/// Filled regular hexagon of radius 1
pub fn draw_hexagon<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
) -> Result<(), RenderError> {
    let mut batch = DrawBatch::begin(renderer, ctx, Primitive::Polygon);
    for i in 0..6 {
        let theta = TAU * i as f32 / 6.0;
        batch.vertex2(theta.cos(), theta.sin());
    }
    batch.end()
}

/// Rotate the colored unit cube and submit its faces in the centered square viewport
pub fn draw_cube<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
    (angle_y, angle_x): (f64, f64),
) -> Result<(), RenderError> {
    let (width, height) = renderer.window_size();
    let ctx = ctx.with_viewport(Viewport::centered_square(width, height));

    let cube = transform_cube(&CubeModel::colored(), angle_y, angle_x);
    let positions = cube.positions();
    let colors = cube.colors.as_ref().map(|colors| &colors[..]);

    submit_indexed_quads(renderer, &ctx, &positions, colors, &cube.faces)
}

/// Blit `bitmaps` one after another starting at `start`, following each
/// bitmap's advance. Returns the final raster position.
pub fn blit_bitmaps<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
    start: [i32; 2],
    bitmaps: &[Bitmap],
) -> [f32; 2] {
    let mut position = [start[0] as f32, start[1] as f32];
    for bitmap in bitmaps {
        let origin = [
            (position[0] - bitmap.x_orig).floor() as i32,
            (position[1] - bitmap.y_orig).floor() as i32,
        ];
        renderer.bitmap(ctx, origin, bitmap);
        position[0] += bitmap.x_move;
        position[1] += bitmap.y_move;
    }
    position
}

/// Two arrows from the world origin, stepping left-up then right-up
pub fn draw_arrows<R: Renderer + ?Sized>(renderer: &mut R, ctx: &RenderContext) {
    let arrow = arrow_bitmap();
    let bitmaps = [
        arrow.clone().with_advance(-40.0, 15.0),
        arrow.with_advance(20.0, 15.0),
    ];
    let start = ctx.raster_position(0.0, 0.0);
    blit_bitmaps(renderer, ctx, start, &bitmaps);
}

/// Solid square pixmap anchored at the world's bottom-left corner
pub fn draw_pixmap<R: Renderer + ?Sized>(renderer: &mut R, ctx: &RenderContext, rgb: [u8; 3]) {
    let position = ctx.raster_position(ctx.world.min_x, ctx.world.min_y);
    renderer.draw_pixels(position, &Pixmap::solid(PIXMAP_SIZE, PIXMAP_SIZE, rgb));
}

/// Line strip through every sketched point
pub fn draw_sketch<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
    sketch: &Sketch,
) -> Result<(), RenderError> {
    let mut batch = DrawBatch::begin(renderer, ctx, Primitive::LineStrip);
    for &[x, y] in sketch.points() {
        batch.vertex2(x, y);
    }
    batch.end()
}

/// Copy a window rectangle to `destination`, both in window pixels
pub fn copy_area<R: Renderer + ?Sized>(
    renderer: &mut R,
    source: Viewport,
    destination: [i32; 2],
) -> Result<(), RenderError> {
    let pixels = renderer.read_pixels(source.x, source.y, source.width, source.height)?;
    renderer.draw_pixels(destination, &pixels);
    renderer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::recording::{Call, RecordingRenderer};
    use crate::draw::BLACK;
    use crate::geometry::CUBE_FACE_INDICES;
    use crate::projection::WorldWindow;
    use nalgebra::Point3;
    use std::f64::consts::FRAC_PI_4;

    fn ctx() -> RenderContext {
        RenderContext::new(WorldWindow::default(), Viewport::full(1, 1))
    }

    fn render(kind: SceneKind, width: u32, height: u32) -> RecordingRenderer {
        let mut renderer = RecordingRenderer::new(width, height);
        Scene::new(kind, (FRAC_PI_4, FRAC_PI_4))
            .render(&mut renderer, &ctx(), &Sketch::new())
            .unwrap();
        renderer
    }

    fn parse(name: &str) -> Option<SceneKind> {
        name.parse().ok()
    }

    fn arrow_blit(position: [i32; 2]) -> Call {
        Call::Bitmap {
            position,
            width: 9,
            height: 10,
        }
    }

    #[test]
    fn test_scene_names_round_trip() {
        for kind in SceneKind::ALL {
            assert_eq!(kind.name().parse::<SceneKind>(), Ok(kind));
        }
        assert_eq!(parse("QuadStrip"), Some(SceneKind::QuadStrip));
        assert_eq!(parse("quad_strip"), Some(SceneKind::QuadStrip));
        assert_eq!(parse(" Pixmap "), Some(SceneKind::Pixmap));
        assert_eq!(parse("teapot"), None);
    }

    #[test]
    fn test_digit_selection() {
        assert_eq!(SceneKind::from_digit('1'), Some(SceneKind::Lines));
        assert_eq!(SceneKind::from_digit('4'), Some(SceneKind::Cube));
        assert_eq!(SceneKind::from_digit('7'), Some(SceneKind::Sketch));
        assert_eq!(SceneKind::from_digit('0'), None);
        assert_eq!(SceneKind::from_digit('8'), None);
        assert_eq!(SceneKind::from_digit('x'), None);
    }

    #[test]
    fn test_render_clears_then_flushes() {
        for kind in SceneKind::ALL {
            let renderer = render(kind, 200, 100);
            assert!(matches!(renderer.calls.first(), Some(Call::Clear(_))));
            assert_eq!(renderer.calls.last(), Some(&Call::Flush));
        }
    }

    #[test]
    fn test_lines_scene() {
        let renderer = render(SceneKind::Lines, 100, 100);
        let draws = renderer.draws();
        assert_eq!(draws.len(), 1);
        let (primitive, viewport, vertices) = &draws[0];
        assert_eq!(*primitive, Primitive::Lines);
        assert_eq!(*viewport, Viewport::full(100, 100));
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].color, LINE_GREEN);
        assert_eq!(vertices[2].color, rgb_u8(82, 109, 133));
        assert_eq!(vertices[4].color, rgb_u8(78, 68, 102));
        assert_eq!(vertices[5].color, LINE_GREEN);
    }

    #[test]
    fn test_quad_strip_scene() {
        let renderer = render(SceneKind::QuadStrip, 100, 100);
        let (primitive, _, vertices) = &renderer.draws()[0];
        assert_eq!(*primitive, Primitive::QuadStrip);
        assert_eq!(vertices.len(), 8);
        assert!((vertices[1].position.x - -0.845_299_4).abs() < 1e-5);
        assert!((vertices[4].position.x - 2.618_802).abs() < 1e-5);
        assert!(vertices.iter().all(|v| v.color == BLACK));
    }

    #[test]
    fn test_hexagon_scene() {
        let renderer = render(SceneKind::Hexagon, 100, 100);
        let (primitive, _, vertices) = &renderer.draws()[0];
        assert_eq!(*primitive, Primitive::Polygon);
        assert_eq!(vertices.len(), 6);
        for v in vertices {
            let radius = (v.position.x.powi(2) + v.position.y.powi(2)).sqrt();
            assert!((radius - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_scene() {
        let renderer = render(SceneKind::Cube, 300, 200);
        let draws = renderer.draws();
        assert_eq!(draws.len(), 1);
        let (primitive, viewport, vertices) = &draws[0];
        assert_eq!(*primitive, Primitive::Quads);
        assert_eq!(*viewport, Viewport::new(50, 0, 200, 200));
        assert_eq!(vertices.len(), CUBE_FACE_INDICES.len());

        let cube = transform_cube(&CubeModel::colored(), FRAC_PI_4, FRAC_PI_4);
        let positions = cube.positions();
        let colors = cube.colors.unwrap();
        for (vertex, &index) in vertices.iter().zip(CUBE_FACE_INDICES.iter()) {
            let expected = Point3::from(positions[index as usize]);
            assert_eq!(vertex.position, expected);
            assert_eq!(vertex.color, colors[index as usize]);
        }
        let deepest = vertices
            .iter()
            .map(|v| v.position.z)
            .fold(f32::MIN, f32::max);
        assert!(deepest.abs() < 1e-6);
    }

    #[test]
    fn test_bitmap_scene() {
        let renderer = render(SceneKind::Bitmap, 100, 100);
        let blits: Vec<Call> = renderer
            .calls
            .into_iter()
            .filter(|call| matches!(call, Call::Bitmap { .. }))
            .collect();
        assert_eq!(blits, vec![arrow_blit([50, 50]), arrow_blit([10, 65])]);
    }

    #[test]
    fn test_blit_respects_origin() {
        let mut renderer = RecordingRenderer::new(10, 10);
        let bitmap = arrow_bitmap().with_origin(4.0, 0.0);
        let bitmap = bitmap.with_advance(3.0, -1.0);
        let end = blit_bitmaps(&mut renderer, &ctx(), [5, 5], &[bitmap]);
        assert_eq!(end, [8.0, 4.0]);
        assert_eq!(renderer.calls[0], arrow_blit([1, 5]));
    }

    #[test]
    fn test_pixmap_scene() {
        let renderer = render(SceneKind::Pixmap, 400, 400);
        let expected = Call::DrawPixels {
            position: [0, 0],
            width: PIXMAP_SIZE,
            height: PIXMAP_SIZE,
        };
        assert!(renderer.calls.contains(&expected));
    }

    #[test]
    fn test_sketch_scene() {
        let mut renderer = RecordingRenderer::new(100, 100);
        let mut sketch = Sketch::new();
        sketch.push([0.0, 0.0]);
        sketch.push([1.0, 2.0]);
        sketch.push([-3.0, 1.0]);
        Scene::new(SceneKind::Sketch, (0.0, 0.0))
            .render(&mut renderer, &ctx(), &sketch)
            .unwrap();
        let (primitive, _, vertices) = &renderer.draws()[0];
        assert_eq!(*primitive, Primitive::LineStrip);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[2].position.x, -3.0);
    }

    #[test]
    fn test_copy_area() {
        let mut renderer = RecordingRenderer::new(100, 100);
        copy_area(&mut renderer, Viewport::new(0, 0, 10, 20), [50, 60]).unwrap();
        let copied = Call::DrawPixels {
            position: [50, 60],
            width: 10,
            height: 20,
        };
        assert_eq!(renderer.calls, vec![copied, Call::Flush]);
    }

    #[test]
    fn test_draw_failure_propagates() {
        let mut renderer = RecordingRenderer::new(100, 100);
        renderer.fail_draws = true;
        let scene = Scene::new(SceneKind::Cube, (0.0, 0.0));
        let result = scene.render(&mut renderer, &ctx(), &Sketch::new());
        assert!(matches!(result, Err(RenderError::Surface(_))));
        assert!(!renderer.calls.contains(&Call::Flush));
    }
}
