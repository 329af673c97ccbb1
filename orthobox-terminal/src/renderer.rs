/// Half-block cell rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use orthobox_core::draw::{
    to_rgb_u8, DrawVertex, Primitive, RenderContext, RenderError, Renderer, Rgba,
};
use orthobox_core::{Bitmap, Pixmap, Viewport};
use std::io::{self, Write};

/// Window pixels stacked in one terminal cell
const PIXELS_PER_ROW: usize = 2;

/// Line widths and point sizes are divided by this to get a brush in pixels
const SIZE_PER_PIXEL: f32 = 4.0;

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';

/// A vertex after projection into window pixels
#[derive(Debug, Clone, Copy)]
struct Projected {
    x: f32,
    y: f32,
    z: f32,
    color: Rgba,
}

impl Projected {
    fn lerp(&self, other: &Projected, t: f64) -> Projected {
        let mix = |a: f32, b: f32| (a as f64 + (b as f64 - a as f64) * t) as f32;
        Projected {
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
            z: mix(self.z, other.z),
            color: lerp_color(self.color, other.color, t as f32),
        }
    }
}

/// Software renderer drawing into a pixel grid shown as terminal cells.
///
/// Every cell holds two pixels, so one column is one pixel wide and one row
/// two pixels tall. Pixel rows are stored bottom-up.
pub struct CellRenderer<W: Write> {
    writer: W,
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
    depth_buffer: Vec<f32>,
    glyphs: Vec<Option<(char, [u8; 3])>>,
}

impl<W: Write> CellRenderer<W> {
    pub fn new(columns: u16, rows: u16, writer: W) -> Self {
        let mut renderer = Self {
            writer,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            depth_buffer: Vec::new(),
            glyphs: Vec::new(),
        };
        renderer.resize(columns, rows);
        renderer
    }

    /// Resize to a terminal area; the contents are reset to black
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.width = columns as usize;
        self.height = rows as usize * PIXELS_PER_ROW;
        let size = self.width * self.height;
        self.pixels = vec![[0, 0, 0]; size];
        self.depth_buffer = vec![f32::INFINITY; size];
        self.glyphs = vec![None; self.width * rows as usize];
    }

    pub fn rows(&self) -> usize {
        self.height / PIXELS_PER_ROW
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Window position (origin top-left, y down) of the middle of a cell
    pub fn cell_to_screen(&self, column: u16, row: u16) -> [i32; 2] {
        [column as i32, (row as usize * PIXELS_PER_ROW + 1) as i32]
    }

    /// Pixel color, origin bottom-left
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn glyph_at(&self, column: usize, row: usize) -> Option<char> {
        if column < self.width && row < self.rows() {
            self.glyphs[row * self.width + column].map(|(glyph, _)| glyph)
        } else {
            None
        }
    }

    fn project(&self, ctx: &RenderContext, vertex: &DrawVertex) -> Projected {
        let [x, y, z] = ctx.world.world_to_window(&vertex.position, &ctx.viewport);
        Projected {
            x,
            y,
            z,
            color: vertex.color,
        }
    }

    /// Pixels a primitive may touch: the viewport, clipped to the window
    fn clip_rect(&self, viewport: &Viewport) -> (i32, i32, i32, i32) {
        let min_x = viewport.x.max(0);
        let min_y = viewport.y.max(0);
        let max_x = (viewport.x + viewport.width as i32).min(self.width as i32) - 1;
        let max_y = (viewport.y + viewport.height as i32).min(self.height as i32) - 1;
        (min_x, min_y, max_x, max_y)
    }

    fn plot(&mut self, ctx: &RenderContext, x: i32, y: i32, z: f32, color: Rgba) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if !ctx.viewport.contains(x, y) {
            return;
        }

        if ctx.depth_test {
            if z >= self.depth_buffer[idx] {
                return;
            }
            self.depth_buffer[idx] = z;
        }
        self.pixels[idx] = to_rgb_u8(color);
    }

    /// Framebuffer index of a window pixel, `None` outside the window
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let inside = x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height;
        inside.then(|| y as usize * self.width + x as usize)
    }

    /// Plot without viewport clipping or depth, as raster images do
    fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color;
        }
    }

    fn stamp(&mut self, ctx: &RenderContext, x: i32, y: i32, z: f32, color: Rgba, size: f32) {
        let brush = brush_pixels(size);
        let start = -(brush - 1) / 2;
        for dy in start..start + brush {
            for dx in start..start + brush {
                self.plot(ctx, x + dx, y + dy, z, color);
            }
        }
    }

    fn rasterize_point(&mut self, ctx: &RenderContext, p: Projected) {
        let brush = brush_pixels(ctx.point_size);
        let (min_x, min_y, max_x, max_y) = self.clip_rect(&ctx.viewport);
        let (x, y) = (p.x.floor(), p.y.floor());
        let inside = x >= (min_x - brush) as f32
            && x <= (max_x + brush) as f32
            && y >= (min_y - brush) as f32
            && y <= (max_y + brush) as f32;
        if inside {
            self.stamp(ctx, x as i32, y as i32, p.z, p.color, ctx.point_size);
        }
    }

    fn rasterize_line(&mut self, ctx: &RenderContext, a: Projected, b: Projected) {
        // Only the part of the segment the brush can reach is stepped
        let brush = brush_pixels(ctx.line_width);
        let (min_x, min_y, max_x, max_y) = self.clip_rect(&ctx.viewport);
        if max_x < min_x || max_y < min_y {
            return;
        }
        let rect = (
            (min_x - brush) as f64,
            (min_y - brush) as f64,
            (max_x + brush + 1) as f64,
            (max_y + brush + 1) as f64,
        );
        let Some((t0, t1)) = clip_segment((a.x, a.y), (b.x, b.y), rect) else {
            return;
        };
        // Far endpoints lose precision in the lerp, keep them inside the rectangle
        let clamp = |p: Projected| Projected {
            x: p.x.clamp(rect.0 as f32, rect.2 as f32),
            y: p.y.clamp(rect.1 as f32, rect.3 as f32),
            ..p
        };
        let (start, end) = (clamp(a.lerp(&b, t0)), clamp(a.lerp(&b, t1)));

        let (x0, y0) = (start.x.floor() as i32, start.y.floor() as i32);
        let (x1, y1) = (end.x.floor() as i32, end.y.floor() as i32);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + ((x1 - x0) as f32 * t).round() as i32;
            let y = y0 + ((y1 - y0) as f32 * t).round() as i32;
            let z = start.z + (end.z - start.z) * t;
            let color = if ctx.smooth {
                lerp_color(start.color, end.color, t)
            } else {
                b.color
            };
            self.stamp(ctx, x, y, z, color, ctx.line_width);
        }
    }

    fn rasterize_triangle(
        &mut self,
        ctx: &RenderContext,
        v0: Projected,
        v1: Projected,
        v2: Projected,
        flat: Rgba,
    ) {
        let (clip_min_x, clip_min_y, clip_max_x, clip_max_y) = self.clip_rect(&ctx.viewport);

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to viewport bounds
        let min_x = min_x.max(clip_min_x);
        let max_x = max_x.min(clip_max_x);
        let min_y = min_y.max(clip_min_y);
        let max_y = max_y.min(clip_max_y);

        let (a, b, c) = ((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y));
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(a, b, c, (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.z + w1 * v1.z + w2 * v2.z;
                        let color = if ctx.smooth {
                            blend_color(&[(v0.color, w0), (v1.color, w1), (v2.color, w2)])
                        } else {
                            flat
                        };
                        self.plot(ctx, x, y, depth, color);
                    }
                }
            }
        }
    }

    fn rasterize_quad(
        &mut self,
        ctx: &RenderContext,
        a: Projected,
        b: Projected,
        c: Projected,
        d: Projected,
    ) {
        self.rasterize_triangle(ctx, a, b, c, d.color);
        self.rasterize_triangle(ctx, a, c, d, d.color);
    }

    /// Write the framebuffer to the terminal, one cell per pixel pair
    pub fn present(&mut self) -> io::Result<()> {
        let rows = self.rows();
        let mut last: Option<([u8; 3], [u8; 3])> = None;

        for row in 0..rows {
            self.writer.queue(cursor::MoveTo(0, row as u16))?;
            let top_y = self.height - 1 - row * PIXELS_PER_ROW;
            let bottom_y = top_y - 1;

            for column in 0..self.width {
                let top = self.pixels[top_y * self.width + column];
                let bottom = self.pixels[bottom_y * self.width + column];
                let (glyph, foreground, background) = match self.glyphs[row * self.width + column] {
                    Some((glyph, color)) => (glyph, color, top),
                    None => (HALF_BLOCK, top, bottom),
                };

                if last != Some((foreground, background)) {
                    self.writer.queue(SetForegroundColor(rgb(foreground)))?;
                    self.writer.queue(SetBackgroundColor(rgb(background)))?;
                    last = Some((foreground, background));
                }
                self.writer.queue(Print(glyph))?;
            }
        }
        self.writer.queue(ResetColor)?;
        self.writer.flush()
    }
}

impl<W: Write> Renderer for CellRenderer<W> {
    fn window_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn clear(&mut self, ctx: &RenderContext) {
        let color = to_rgb_u8(ctx.clear_color);
        self.pixels.fill(color);
        self.depth_buffer.fill(f32::INFINITY);
        self.glyphs.fill(None);
    }

    fn draw(
        &mut self,
        ctx: &RenderContext,
        primitive: Primitive,
        vertices: &[DrawVertex],
    ) -> Result<(), RenderError> {
        let usable = primitive.usable_vertices(vertices.len());
        let projected: Vec<Projected> = vertices[..usable]
            .iter()
            .map(|v| self.project(ctx, v))
            .collect();
        let p = &projected;

        match primitive {
            Primitive::Points => {
                for &v in p {
                    self.rasterize_point(ctx, v);
                }
            }
            Primitive::Lines => {
                for pair in p.chunks_exact(2) {
                    self.rasterize_line(ctx, pair[0], pair[1]);
                }
            }
            Primitive::LineStrip => {
                for pair in p.windows(2) {
                    self.rasterize_line(ctx, pair[0], pair[1]);
                }
            }
            Primitive::LineLoop => {
                for pair in p.windows(2) {
                    self.rasterize_line(ctx, pair[0], pair[1]);
                }
                if let (Some(&first), Some(&last)) = (p.first(), p.last()) {
                    if p.len() > 1 {
                        self.rasterize_line(ctx, last, first);
                    }
                }
            }
            Primitive::Triangles => {
                for tri in p.chunks_exact(3) {
                    self.rasterize_triangle(ctx, tri[0], tri[1], tri[2], tri[2].color);
                }
            }
            Primitive::Quads => {
                for quad in p.chunks_exact(4) {
                    self.rasterize_quad(ctx, quad[0], quad[1], quad[2], quad[3]);
                }
            }
            Primitive::QuadStrip => {
                // Each step of two vertices closes the quad v0 v1 v3 v2
                for i in (0..usable.saturating_sub(2)).step_by(2) {
                    self.rasterize_quad(ctx, p[i], p[i + 1], p[i + 3], p[i + 2]);
                }
            }
            Primitive::Polygon => {
                if let Some((&first, rest)) = p.split_first() {
                    for pair in rest.windows(2) {
                        self.rasterize_triangle(ctx, first, pair[0], pair[1], first.color);
                    }
                }
            }
        }
        Ok(())
    }

    fn bitmap(&mut self, ctx: &RenderContext, position: [i32; 2], bitmap: &Bitmap) {
        let color = to_rgb_u8(ctx.color);
        for (x, y) in bitmap.set_pixels() {
            self.put_pixel(
                position[0].saturating_add(x as i32),
                position[1].saturating_add(y as i32),
                color,
            );
        }
    }

    fn draw_pixels(&mut self, position: [i32; 2], pixmap: &Pixmap) {
        for y in 0..pixmap.height {
            for x in 0..pixmap.width {
                if let Some(rgb) = pixmap.get(x, y) {
                    self.put_pixel(
                        position[0].saturating_add(x as i32),
                        position[1].saturating_add(y as i32),
                        rgb,
                    );
                }
            }
        }
    }

    fn read_pixels(&self, x: i32, y: i32, width: u32, height: u32) -> Result<Pixmap, RenderError> {
        let fits = x >= 0
            && y >= 0
            && x as usize + width as usize <= self.width
            && y as usize + height as usize <= self.height;
        if !fits {
            return Err(RenderError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }

        let mut pixmap = Pixmap::solid(width, height, [0, 0, 0]);
        for dy in 0..height {
            for dx in 0..width {
                let idx = (y as usize + dy as usize) * self.width + x as usize + dx as usize;
                pixmap.set(dx, dy, self.pixels[idx]);
            }
        }
        Ok(pixmap)
    }

    fn glyph(&mut self, ctx: &RenderContext, position: [i32; 2], glyph: char) {
        let [x, y] = position;
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let row = (self.height - 1 - y as usize) / PIXELS_PER_ROW;
        self.glyphs[row * self.width + x as usize] = Some((glyph, to_rgb_u8(ctx.color)));
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.present()?;
        Ok(())
    }
}

fn rgb(color: [u8; 3]) -> Color {
    Color::Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
    }
}

/// Side of the square brush for a line width or point size
fn brush_pixels(size: f32) -> i32 {
    ((size / SIZE_PER_PIXEL).round() as i32).max(1)
}

/// Parameter range of the segment `a`..`b` inside `rect` (Liang-Barsky).
///
/// `rect` is `(min_x, min_y, max_x, max_y)`. Returns `None` when the segment
/// misses the rectangle or has a non-finite end.
fn clip_segment(a: (f32, f32), b: (f32, f32), rect: (f64, f64, f64, f64)) -> Option<(f64, f64)> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (min_x, min_y, max_x, max_y) = rect;
    let (ax, ay) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = (b.0 as f64 - ax, b.1 as f64 - ay);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, ax - min_x),
        (dx, max_x - ax),
        (-dy, ay - min_y),
        (dy, max_y - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
    }
    (t0 <= t1).then_some((t0, t1))
}

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}

fn blend_color(weighted: &[(Rgba, f32)]) -> Rgba {
    std::array::from_fn(|i| weighted.iter().map(|(color, w)| color[i] * w).sum())
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
