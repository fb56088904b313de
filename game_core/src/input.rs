//! Pointer/touch drag handling for the player paddle

use crate::{GameConfig, Paddle};

/// Turns horizontal drag deltas into paddle target updates
#[derive(Debug, Clone)]
pub struct InputController {
    sensitivity: f32,
    last_x: Option<f32>,
}

impl InputController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            sensitivity: config.input_sensitivity,
            last_x: None,
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn is_dragging(&self) -> bool {
        self.last_x.is_some()
    }

    /// Begin a drag at screen X (pixels)
    pub fn pointer_down(&mut self, x: f32) {
        self.last_x = Some(x);
    }

    /// Shift the paddle target by the drag delta since the last event.
    ///
    /// A move without a preceding down (mouse hover) is ignored. Returns the
    /// new target X when the paddle was steered.
    pub fn pointer_move(
        &mut self,
        x: f32,
        paddle: &mut Paddle,
        config: &GameConfig,
    ) -> Option<f32> {
        let last = self.last_x?;
        self.last_x = Some(x);
        let target = config.clamp_paddle_x(paddle.target_x() + (x - last) * self.sensitivity);
        paddle.set_target_x(target);
        Some(target)
    }

    pub fn pointer_up(&mut self) {
        self.last_x = None;
    }
}
