/// Render submission boundary: primitives, render context and the renderer trait
use std::fmt;

use nalgebra::Point3;

use crate::projection::{Viewport, WorldWindow};
use crate::raster::{Bitmap, Pixmap};

/// RGBA color with components in [0, 1]
pub type Rgba = [f32; 4];

pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Opaque color from 8-bit channels
pub fn rgb_u8(r: u8, g: u8, b: u8) -> Rgba {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Quantize a color to 8-bit RGB, dropping alpha
pub fn to_rgb_u8(color: Rgba) -> [u8; 3] {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color[0]), channel(color[1]), channel(color[2])]
}

/// How a primitive consumes its vertex list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexPolicy {
    /// Independent groups of `n`; a trailing partial group is dropped
    Groups(usize),
    /// One connected run of at least `min` vertices, growing `step` at a time
    Strip { min: usize, step: usize },
}

/// Primitive kinds a draw batch can assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    Quads,
    QuadStrip,
    Polygon,
}

impl Primitive {
    pub fn policy(self) -> VertexPolicy {
        match self {
            Primitive::Points => VertexPolicy::Groups(1),
            Primitive::Lines => VertexPolicy::Groups(2),
            Primitive::Triangles => VertexPolicy::Groups(3),
            Primitive::Quads => VertexPolicy::Groups(4),
            Primitive::LineStrip | Primitive::LineLoop => VertexPolicy::Strip { min: 2, step: 1 },
            Primitive::QuadStrip => VertexPolicy::Strip { min: 4, step: 2 },
            Primitive::Polygon => VertexPolicy::Strip { min: 3, step: 1 },
        }
    }

    /// Number of leading vertices that form complete primitives
    pub fn usable_vertices(self, count: usize) -> usize {
        match self.policy() {
            VertexPolicy::Groups(n) => count - count % n,
            VertexPolicy::Strip { min, .. } if count < min => 0,
            VertexPolicy::Strip { min, step } => min + (count - min) / step * step,
        }
    }
}

/// A vertex as submitted to a renderer, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawVertex {
    pub position: Point3<f32>,
    pub color: Rgba,
}

impl DrawVertex {
    pub fn new(position: [f32; 3], color: Rgba) -> Self {
        Self {
            position: Point3::new(position[0], position[1], position[2]),
            color,
        }
    }
}

/// Drawing state passed explicitly to every submission call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub world: WorldWindow,
    pub viewport: Viewport,
    pub color: Rgba,
    pub clear_color: Rgba,
    pub point_size: f32,
    pub line_width: f32,
    /// Interpolate vertex colors across a primitive instead of using the last one
    pub smooth: bool,
    pub depth_test: bool,
}

impl RenderContext {
    pub fn new(world: WorldWindow, viewport: Viewport) -> Self {
        Self {
            world,
            viewport,
            color: BLACK,
            clear_color: WHITE,
            point_size: 1.0,
            line_width: 1.0,
            smooth: true,
            depth_test: false,
        }
    }

    pub fn with_viewport(&self, viewport: Viewport) -> Self {
        Self {
            viewport,
            ..self.clone()
        }
    }

    pub fn with_color(&self, color: Rgba) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    /// Window pixel nearest to a world-space raster position
    pub fn raster_position(&self, x: f32, y: f32) -> [i32; 2] {
        let [wx, wy] = self.world.world_to_window_2d(x, y, &self.viewport);
        [wx.round() as i32, wy.round() as i32]
    }
}

/// Failures reported by a renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    IndexOutOfRange { index: u32, vertices: usize },
    ColorCountMismatch { vertices: usize, colors: usize },
    RegionOutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Surface(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::IndexOutOfRange { index, vertices } => {
                write!(f, "index {index} out of range for {vertices} vertices")
            }
            RenderError::ColorCountMismatch { vertices, colors } => {
                write!(f, "{colors} colors supplied for {vertices} vertices")
            }
            RenderError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "region {width}x{height} at ({x}, {y}) lies outside the window"
            ),
            RenderError::Surface(message) => write!(f, "surface error: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Surface(err.to_string())
    }
}

/// Output device the sandbox draws into.
///
/// Vertex positions are world coordinates, mapped through the context's
/// world window and viewport. Raster operations take window pixels with the
/// origin at the bottom-left.
pub trait Renderer {
    /// Window size in pixels
    fn window_size(&self) -> (u32, u32);

    fn clear(&mut self, ctx: &RenderContext);

    fn draw(
        &mut self,
        ctx: &RenderContext,
        primitive: Primitive,
        vertices: &[DrawVertex],
    ) -> Result<(), RenderError>;

    /// Draw `indices` resolved against `vertices`
    fn draw_indexed(
        &mut self,
        ctx: &RenderContext,
        primitive: Primitive,
        vertices: &[DrawVertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        let resolved = resolve_indices(vertices, indices)?;
        self.draw(ctx, primitive, &resolved)
    }

    /// Blit a bitmap with its origin at `position`, set bits in the context color
    fn bitmap(&mut self, ctx: &RenderContext, position: [i32; 2], bitmap: &Bitmap);

    fn draw_pixels(&mut self, position: [i32; 2], pixmap: &Pixmap);

    fn read_pixels(&self, x: i32, y: i32, width: u32, height: u32) -> Result<Pixmap, RenderError>;

    /// Draw a single text character at `position`
    fn glyph(&mut self, ctx: &RenderContext, position: [i32; 2], glyph: char);

    /// Present everything drawn so far
    fn flush(&mut self) -> Result<(), RenderError>;
}

/// Look up every index in `vertices`, preserving order
pub fn resolve_indices(
    vertices: &[DrawVertex],
    indices: &[u32],
) -> Result<Vec<DrawVertex>, RenderError> {
    indices
        .iter()
        .map(|&index| {
            vertices
                .get(index as usize)
                .copied()
                .ok_or(RenderError::IndexOutOfRange {
                    index,
                    vertices: vertices.len(),
                })
        })
        .collect()
}

/// Submit indexed quads: index `i` names the `i`-th position (and color).
///
/// Without colors every vertex takes the context color.
pub fn submit_indexed_quads<R: Renderer + ?Sized>(
    renderer: &mut R,
    ctx: &RenderContext,
    positions: &[[f32; 3]],
    colors: Option<&[Rgba]>,
    indices: &[u32],
) -> Result<(), RenderError> {
    if let Some(colors) = colors {
        if colors.len() != positions.len() {
            return Err(RenderError::ColorCountMismatch {
                vertices: positions.len(),
                colors: colors.len(),
            });
        }
    }

    let vertices: Vec<DrawVertex> = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let color = colors.map_or(ctx.color, |colors| colors[i]);
            DrawVertex::new(position, color)
        })
        .collect();

    renderer.draw_indexed(ctx, Primitive::Quads, &vertices, indices)
}

/// Scoped draw batch: vertices collected between `begin` and the end of the
/// scope are submitted exactly once, on `end` or on drop.
pub struct DrawBatch<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
    ctx: &'a RenderContext,
    primitive: Primitive,
    color: Rgba,
    vertices: Vec<DrawVertex>,
    closed: bool,
}

impl<'a, R: Renderer + ?Sized> DrawBatch<'a, R> {
    pub fn begin(renderer: &'a mut R, ctx: &'a RenderContext, primitive: Primitive) -> Self {
        Self {
            renderer,
            ctx,
            primitive,
            color: ctx.color,
            vertices: Vec::new(),
            closed: false,
        }
    }

    /// Set the color used by subsequent vertices
    pub fn color(&mut self, color: Rgba) -> &mut Self {
        self.color = color;
        self
    }

    pub fn vertex2(&mut self, x: f32, y: f32) -> &mut Self {
        self.vertex3(x, y, 0.0)
    }

    pub fn vertex3(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.vertices.push(DrawVertex::new([x, y, z], self.color));
        self
    }

    /// Close the batch and report the submission result
    pub fn end(mut self) -> Result<(), RenderError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), RenderError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let vertices = std::mem::take(&mut self.vertices);
        self.renderer.draw(self.ctx, self.primitive, &vertices)
    }
}

impl<R: Renderer + ?Sized> Drop for DrawBatch<'_, R> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("draw batch closed with error: {}", err);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::recording::{Call, RecordingRenderer};
    use super::*;

    fn ctx() -> RenderContext {
        RenderContext::new(WorldWindow::default(), Viewport::full(100, 100))
    }

    #[test]
    fn test_usable_vertices() {
        assert_eq!(Primitive::Points.usable_vertices(5), 5);
        assert_eq!(Primitive::Lines.usable_vertices(5), 4);
        assert_eq!(Primitive::Quads.usable_vertices(24), 24);
        assert_eq!(Primitive::Quads.usable_vertices(7), 4);
        assert_eq!(Primitive::LineStrip.usable_vertices(1), 0);
        assert_eq!(Primitive::QuadStrip.usable_vertices(8), 8);
        assert_eq!(Primitive::QuadStrip.usable_vertices(7), 6);
        assert_eq!(Primitive::QuadStrip.usable_vertices(3), 0);
        assert_eq!(Primitive::Polygon.usable_vertices(6), 6);
        assert_eq!(Primitive::Polygon.usable_vertices(2), 0);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_rgb_u8(rgb_u8(82, 109, 133)), [82, 109, 133]);
        assert_eq!(to_rgb_u8([2.0, -1.0, 0.5, 0.3]), [255, 0, 128]);
    }

    #[test]
    fn test_batch_submits_on_drop() {
        let ctx = ctx();
        let mut renderer = RecordingRenderer::new(100, 100);
        {
            let mut batch = DrawBatch::begin(&mut renderer, &ctx, Primitive::LineStrip);
            batch.vertex2(0.0, 0.0).color(WHITE).vertex2(1.0, 1.0);
        }
        let draws = renderer.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].2.len(), 2);
        assert_eq!(draws[0].0, Primitive::LineStrip);
        assert_eq!(draws[0].2[0].color, BLACK);
        assert_eq!(draws[0].2[1].color, WHITE);
    }

    #[test]
    fn test_batch_submits_once_on_early_exit() {
        fn draw_until(
            renderer: &mut RecordingRenderer,
            ctx: &RenderContext,
            stop: usize,
        ) -> Option<()> {
            let mut batch = DrawBatch::begin(renderer, ctx, Primitive::Points);
            for i in 0..10 {
                if i == stop {
                    return None;
                }
                batch.vertex2(i as f32, 0.0);
            }
            batch.end().ok()
        }

        let ctx = ctx();
        let mut renderer = RecordingRenderer::new(100, 100);
        assert!(draw_until(&mut renderer, &ctx, 3).is_none());
        assert!(draw_until(&mut renderer, &ctx, 20).is_some());

        let draws = renderer.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].2.len(), 3);
        assert_eq!(draws[1].2.len(), 10);
    }

    #[test]
    fn test_batch_end_reports_error() {
        let ctx = ctx();
        let mut renderer = RecordingRenderer::new(100, 100);
        renderer.fail_draws = true;
        let mut batch = DrawBatch::begin(&mut renderer, &ctx, Primitive::Points);
        batch.vertex2(0.0, 0.0);
        assert!(matches!(batch.end(), Err(RenderError::Surface(_))));
    }

    #[test]
    fn test_indexed_quads_preserve_order() {
        let ctx = ctx();
        let mut renderer = RecordingRenderer::new(100, 100);
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let colors = Some(&[BLACK, WHITE, BLACK, WHITE][..]);
        let indices = [3, 2, 1, 0];
        submit_indexed_quads(&mut renderer, &ctx, &positions, colors, &indices).unwrap();

        let draws = renderer.draws();
        let vertices = &draws[0].2;
        assert_eq!(draws[0].0, Primitive::Quads);
        assert_eq!(vertices[0].position, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(vertices[0].color, WHITE);
        assert_eq!(vertices[3].position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_indexed_quads_reject_bad_input() {
        let ctx = ctx();
        let mut renderer = RecordingRenderer::new(100, 100);
        let positions = [[0.0; 3]; 4];

        let result = submit_indexed_quads(&mut renderer, &ctx, &positions, None, &[0, 1, 2, 9]);
        let expected = RenderError::IndexOutOfRange {
            index: 9,
            vertices: 4,
        };
        assert_eq!(result, Err(expected));

        let colors = [BLACK];
        let result = submit_indexed_quads(
            &mut renderer,
            &ctx,
            &positions,
            Some(&colors[..]),
            &[0, 1, 2, 3],
        );
        let expected = RenderError::ColorCountMismatch {
            vertices: 4,
            colors: 1,
        };
        assert_eq!(result, Err(expected));
        let drawn = |call: &Call| matches!(call, Call::Draw { .. });
        assert!(!renderer.calls.iter().any(drawn));
    }

    #[test]
    fn test_raster_position() {
        let ctx = ctx();
        assert_eq!(ctx.raster_position(0.0, 0.0), [50, 50]);
        assert_eq!(ctx.raster_position(-5.0, -5.0), [0, 0]);
    }
}
