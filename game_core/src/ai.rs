//! Computer opponent.
//!
//! The AI does not track the ball perfectly. It re-samples a straight-line
//! interception estimate at most once per reaction interval and blurs it
//! with noise scaled by `1 - accuracy`. Side-wall bounces are not
//! predicted, which gives the easier presets their occasional misreads.

use tracing::trace;

use crate::{AiConfig, Ball, BallState, GameConfig, GameRng, Paddle, Side};

#[derive(Debug, Clone)]
pub struct AiController {
    config: AiConfig,
    side: Side,
    error_spread: f32,
    reaction_delay: f32,
    target_x: f32,
}

impl AiController {
    pub fn new(config: AiConfig, game: &GameConfig) -> Self {
        Self {
            config,
            side: Side::Ai,
            error_spread: game.ai_error_spread,
            reaction_delay: 0.0,
            target_x: 0.0,
        }
    }

    pub fn config(&self) -> AiConfig {
        self.config
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn reset(&mut self) {
        self.reaction_delay = 0.0;
        self.target_x = 0.0;
    }

    /// Steer `paddle`: chase the predicted interception while the ball
    /// approaches, drift back to center while it recedes.
    pub fn update(&mut self, ball: &Ball, paddle: &mut Paddle, dt: f32, rng: &mut GameRng) {
        self.reaction_delay += dt;

        if ball.state.is_moving_toward(self.side) {
            if self.reaction_delay > self.config.reaction_time {
                if let Some(x) = self.predict_ball_x(&ball.state, rng) {
                    self.reaction_delay = 0.0;
                    self.target_x = x;
                    trace!(target_x = x, "AI re-sampled interception");
                }
            }
            paddle.set_target_x(self.target_x);
        } else {
            paddle.set_target_x(0.0);
        }
    }

    /// Linear extrapolation of the ball's X when it reaches z = 0, plus noise.
    ///
    /// Returns `None` when the ball has no Z velocity to extrapolate along.
    pub fn predict_ball_x(&self, ball: &BallState, rng: &mut GameRng) -> Option<f32> {
        if ball.velocity.z == 0.0 {
            return None;
        }
        let time_to_reach = (ball.position.z / ball.velocity.z).abs();
        let predicted = ball.position.x + ball.velocity.x * time_to_reach;
        let error = (rng.unit() - 0.5) * (1.0 - self.config.accuracy) * self.error_spread;
        Some(predicted + error)
    }
}
