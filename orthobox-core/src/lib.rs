/// Orthobox Core - geometry, transforms and the render submission boundary
///
/// Everything here is free of I/O: the cube transform pipeline is a pure
/// function, and drawing goes through the `Renderer` trait so any output
/// device (terminal, GPU, test recorder) can consume the same submissions.

pub mod config;
pub mod draw;
pub mod geometry;
pub mod input;
pub mod math;
pub mod projection;
pub mod raster;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use draw::{DrawBatch, DrawVertex, Primitive, RenderContext, RenderError, Renderer, Rgba};
pub use geometry::CubeModel;
pub use input::{ButtonState, PointerButton, Sketch, SketchAction};
pub use math::{rotate_x, rotate_y, subtract, Axis, Rotation, Vertex3D};
pub use projection::{Viewport, WorldWindow};
pub use raster::{Bitmap, Pixmap};
pub use scene::{Scene, SceneKind};
pub use transform::{transform_cube, RotationSequence, TransformedCube};
