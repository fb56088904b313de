use serde::{Deserialize, Serialize};

use crate::Side;

/// Simulated time for the current tick
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Delta time for this tick (already clamped)
    pub now: f32, // Total simulated seconds while playing
}

impl Time {
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.now += dt;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt: 0.016,
            now: 0.0,
        }
    }
}

/// Match score, serve turn and play flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub player_score: u32,
    pub ai_score: u32,
    pub is_playing: bool,
    pub serving: Side,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_score: 0,
            ai_score: 0,
            is_playing: false,
            serving: Side::Player,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a point; the scorer takes the next serve.
    pub fn award_point(&mut self, scorer: Side) {
        match scorer {
            Side::Player => self.player_score += 1,
            Side::Ai => self.ai_score += 1,
        }
        self.serving = scorer;
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_score,
            Side::Ai => self.ai_score,
        }
    }

    pub fn has_winner(&self, win_score: u32) -> Option<Side> {
        if self.player_score >= win_score {
            Some(Side::Player)
        } else if self.ai_score >= win_score {
            Some(Side::Ai)
        } else {
            None
        }
    }

    /// Zero the scores and give the serve back to the player.
    pub fn reset_scores(&mut self) {
        self.player_score = 0;
        self.ai_score = 0;
        self.serving = Side::Player;
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Uniform sample in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        use rand::Rng;
        self.0.gen::<f32>()
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// One-shot countdown to the next serve, counted in simulated seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeTimer {
    remaining: Option<f32>,
}

impl ServeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, delay: f32) {
        self.remaining = Some(delay.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advance the countdown; returns true exactly once, on the tick it expires.
    pub fn update(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(t) if t - dt <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(t) => {
                self.remaining = Some(t - dt);
                false
            }
            None => false,
        }
    }
}
