/// Orthographic world window and viewport mapping
use nalgebra::{Matrix4, Point3};

/// Axis-aligned window rectangle in pixels, origin at the bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole window
    pub fn full(window_width: u32, window_height: u32) -> Self {
        Self::new(0, 0, window_width, window_height)
    }

    /// Largest square that fits the window, centered
    pub fn centered_square(window_width: u32, window_height: u32) -> Self {
        let side = window_width.min(window_height);
        Self::new(
            ((window_width - side) / 2) as i32,
            ((window_height - side) / 2) as i32,
            side,
            side,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width as i32
            && (y - self.y) < self.height as i32
    }
}

/// World-space rectangle mapped onto the viewport (a 2D orthographic projection)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldWindow {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl WorldWindow {
    pub const NEAR: f32 = -1.0;
    pub const FAR: f32 = 1.0;

    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0.0
            && self.height() > 0.0
            && self.width().is_finite()
            && self.height().is_finite()
    }

    /// Orthographic projection matrix from world space to normalized device coordinates
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_orthographic(
            self.min_x,
            self.max_x,
            self.min_y,
            self.max_y,
            Self::NEAR,
            Self::FAR,
        )
    }

    /// Convert a window position (origin top-left, y down) to world coordinates
    pub fn screen_to_world(
        &self,
        x: i32,
        y: i32,
        window_width: u32,
        window_height: u32,
    ) -> [f32; 2] {
        let width = window_width.max(1) as f32;
        let height = window_height.max(1) as f32;
        let world_x = (x as f32 / width) * self.width() + self.min_x;
        let world_y = ((height - y as f32) / height) * self.height() + self.min_y;
        [world_x, world_y]
    }

    /// Project a world point into window pixels (origin bottom-left).
    ///
    /// The third component is the normalized depth; smaller is nearer.
    pub fn world_to_window(&self, point: &Point3<f32>, viewport: &Viewport) -> [f32; 3] {
        let ndc = self.projection_matrix().transform_point(point);
        let x = viewport.x as f32 + (ndc.x + 1.0) * 0.5 * viewport.width as f32;
        let y = viewport.y as f32 + (ndc.y + 1.0) * 0.5 * viewport.height as f32;
        [x, y, ndc.z]
    }

    /// Project a 2D world position into window pixels
    pub fn world_to_window_2d(&self, x: f32, y: f32, viewport: &Viewport) -> [f32; 2] {
        let [wx, wy, _] = self.world_to_window(&Point3::new(x, y, 0.0), viewport);
        [wx, wy]
    }
}

impl Default for WorldWindow {
    fn default() -> Self {
        Self::new(-5.0, 5.0, -5.0, 5.0)
    }
}
