/// Pointer input and the click-to-sketch line strip
use crate::projection::WorldWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// What a pointer event did to the sketch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SketchAction {
    /// A world-space point was appended
    Extended([f32; 2]),
    Cleared,
    Ignored,
}

/// Points clicked so far, drawn as one line strip
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sketch {
    points: Vec<[f32; 2]>,
}

impl Sketch {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    pub fn push(&mut self, point: [f32; 2]) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Left press appends the pointer's world position, right release clears.
    ///
    /// `screen` is in window pixels with the origin at the top-left.
    pub fn handle_pointer(
        &mut self,
        button: PointerButton,
        state: ButtonState,
        screen: [i32; 2],
        window: (u32, u32),
        world: &WorldWindow,
    ) -> SketchAction {
        match (button, state) {
            (PointerButton::Left, ButtonState::Pressed) => {
                let point = world.screen_to_world(screen[0], screen[1], window.0, window.1);
                self.push(point);
                log::debug!("sketch point {:?} ({} total)", point, self.len());
                SketchAction::Extended(point)
            }
            (PointerButton::Right, ButtonState::Released) => {
                self.clear();
                SketchAction::Cleared
            }
            _ => SketchAction::Ignored,
        }
    }
}
